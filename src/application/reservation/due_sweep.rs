use chrono::Utc;

use crate::domain::reservation::{due_cutoff, due_expired_notice, has_due_loans};

use super::errors::{ReservationServiceError, Result};
use super::reservation_service::ServiceDependencies;

/// CheckDue スイープ
///
/// 定期的に実行され、返却期限を過ぎた未返却明細を持つ予約を検出して
/// 期限切れ通知イベントを発行する。
///
/// ビジネスルール：
/// - 境界は「現在時刻の翌日 00:00（UTC）」。期限がそれより厳密に前の
///   明細、つまり今日以前が期日の明細だけが候補になる
/// - 候補の明細が複数あっても、通知は予約ごとに1件
/// - スイープ自体はステータスを変更しない。通知は独立した Expire
///   メッセージとしてこのエンジン自身または下流が消費する
///
/// 前回のスイープ完了前に再起動されても安全（重複通知は下流の
/// Expire ハンドラが冪等に吸収する）。
///
/// # 戻り値
/// 通知を発行した予約の件数
pub async fn check_due(deps: &ServiceDependencies) -> Result<usize> {
    let cutoff = due_cutoff(Utc::now());

    let candidates = deps
        .repository
        .find_due_before(cutoff)
        .await
        .map_err(ReservationServiceError::RepositoryError)?;

    let mut notified = 0;

    for reservation in candidates {
        // リポジトリの絞り込みに依存せず、境界はドメインの判定で確定する
        if !has_due_loans(&reservation, cutoff) {
            continue;
        }

        deps.bus
            .publish_due_expired(due_expired_notice(&reservation))
            .await
            .map_err(ReservationServiceError::BusError)?;

        notified += 1;
    }

    if notified > 0 {
        tracing::info!(count = notified, "due sweep published expiration notices");
    }

    Ok(notified)
}
