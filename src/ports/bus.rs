use crate::domain::events::{ReservationConfirmed, ReservationDueExpired};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// メッセージバス発行ポート
///
/// 実際のトランスポートは外部の関心事で、at-least-once 配信を仮定する。
/// 発行は永続化が成功した後にのみ行われる（未コミットの状態を
/// 下流に告知しないため）。
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// 予約確定イベントを発行する
    ///
    /// リクエスト処理の成功時に呼ばれる。
    async fn publish_confirmed(&self, event: ReservationConfirmed) -> Result<()>;

    /// 期限切れ通知イベントを発行する
    ///
    /// CheckDue スイープが予約ごとに1件発行する。重複発行は
    /// 下流の Expire ハンドラが冪等に吸収する。
    async fn publish_due_expired(&self, event: ReservationDueExpired) -> Result<()>;
}
