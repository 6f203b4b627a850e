use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::reservation::{self, Reservation, ResolvedItem};
use crate::domain::{
    MemberId, MemberSnapshot, ReservationConfirmed, ReservationExpire, ReservationNumber,
    ReservationRequest, ReservationReturn,
};
use crate::ports::{
    InventoryResolver, MessagePublisher, PagedRequest, PagedResponse, ReservationFilter,
    ReservationRepository,
};

use super::errors::{ReservationServiceError, Result};
use super::locks::NumberLocks;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// リポジトリ・在庫・バスはポート経由で注入され、状態遷移の
/// 決定ロジック自体はドメイン層の純粋関数が担う。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub repository: Arc<dyn ReservationRepository>,
    pub inventory: Arc<dyn InventoryResolver>,
    pub bus: Arc<dyn MessagePublisher>,
    pub locks: Arc<NumberLocks>,
}

/// 受信メッセージから予約番号を検証・抽出するヘルパー関数
///
/// 番号はすべてのメッセージ種別に共通の必須識別子。欠落は
/// `InvalidMessage` となり、メッセージはトランスポートに差し戻される。
fn parse_number(number: &str) -> Result<ReservationNumber> {
    if number.trim().is_empty() {
        return Err(ReservationServiceError::InvalidMessage(
            "reservation number is missing".to_string(),
        ));
    }
    Ok(ReservationNumber::new(number))
}

/// リクエストメッセージから会員スナップショットを検証・構築するヘルパー関数
fn parse_member(message: &ReservationRequest) -> Result<MemberSnapshot> {
    let member_id = Uuid::parse_str(&message.member_id).map_err(|_| {
        ReservationServiceError::InvalidMessage(format!(
            "member id is not a valid uuid: {}",
            message.member_id
        ))
    })?;

    if message.member_name.trim().is_empty() {
        return Err(ReservationServiceError::InvalidMessage(
            "member name is missing".to_string(),
        ));
    }

    Ok(MemberSnapshot {
        id: MemberId::from_uuid(member_id),
        document_id: message.member_document_id.clone(),
        name: message.member_name.clone(),
    })
}

/// 予約リクエストを処理する
///
/// フロー：検証 → 番号ロック → 集約の load-or-create → 明細ごとの
/// 在庫解決 → 純粋な状態遷移 → 原子的な保存 → 確定イベント発行。
///
/// 冪等性：予約番号が冪等キー。同じ番号の再配信は既存集約の
/// 更新として安全に吸収される（会員スナップショットは保持）。
///
/// 在庫ミスはエラーにならず、参照が空の明細に劣化する。
/// 発行は保存が成功した後にのみ行われる。
pub async fn request(
    deps: &ServiceDependencies,
    message: ReservationRequest,
) -> Result<ReservationConfirmed> {
    let number = parse_number(&message.number)?;
    let member = parse_member(&message)?;

    let _guard = deps.locks.acquire(&number).await;

    let existing = deps
        .repository
        .find_by_number(&number)
        .await
        .map_err(ReservationServiceError::RepositoryError)?;

    // 明細ごとに在庫を照合する。解決の成否は明細に記録されるだけで、
    // リクエスト全体を失敗させることはない。
    let mut items = Vec::with_capacity(message.items.len());
    for item in &message.items {
        let resolution = deps
            .inventory
            .resolve(&item.title, item.copy_number.as_deref())
            .await
            .map_err(ReservationServiceError::InventoryError)?;

        items.push(ResolvedItem {
            title: item.title.clone(),
            copy_number: item.copy_number.clone(),
            book: resolution.book,
            copy: resolution.copy,
        });
    }

    let (reservation, event) =
        reservation::request_reservation(existing, number, member, items, Utc::now());

    deps.repository
        .save(reservation)
        .await
        .map_err(ReservationServiceError::RepositoryError)?;

    deps.bus
        .publish_confirmed(event.clone())
        .await
        .map_err(ReservationServiceError::BusError)?;

    Ok(event)
}

/// 返却メッセージを処理する
///
/// 各明細の返却日を未設定の場合のみ記録し、ステータスを事前状態に
/// 関わらず `Delivered` に上書きする。下流イベントは発行しない。
///
/// 未知の番号は警告ログを残して破棄する（変更すべき集約がなく、
/// エンジンの障害でもないため）。
pub async fn process_return(
    deps: &ServiceDependencies,
    message: ReservationReturn,
) -> Result<()> {
    let number = parse_number(&message.number)?;

    let _guard = deps.locks.acquire(&number).await;

    let Some(existing) = deps
        .repository
        .find_by_number(&number)
        .await
        .map_err(ReservationServiceError::RepositoryError)?
    else {
        tracing::warn!(number = %number, "return for unknown reservation, dropping");
        return Ok(());
    };

    let returned = reservation::return_reservation(existing, message.return_date);

    deps.repository
        .save(returned)
        .await
        .map_err(ReservationServiceError::RepositoryError)?;

    Ok(())
}

/// 期限切れメッセージを処理する
///
/// ステータスを事前状態に関わらず `Expired` に上書きする。
/// 既に `Expired` なら no-op（at-least-once の再配信を吸収）。
/// 下流イベントは発行しない。未知の番号は警告ログを残して破棄する。
pub async fn expire(deps: &ServiceDependencies, message: ReservationExpire) -> Result<()> {
    let number = parse_number(&message.number)?;

    let _guard = deps.locks.acquire(&number).await;

    let Some(existing) = deps
        .repository
        .find_by_number(&number)
        .await
        .map_err(ReservationServiceError::RepositoryError)?
    else {
        tracing::warn!(number = %number, "expire for unknown reservation, dropping");
        return Ok(());
    };

    let expired = reservation::expire_reservation(existing, Utc::now());

    deps.repository
        .save(expired)
        .await
        .map_err(ReservationServiceError::RepositoryError)?;

    Ok(())
}

/// フィルタとページ指定で予約を検索する
///
/// 照合とページングはリポジトリ（ページネーション協力者）に委譲する。
/// フィルタは少なくとも予約番号の完全一致を含む。
pub async fn get_by_filter(
    deps: &ServiceDependencies,
    request: &PagedRequest<ReservationFilter>,
) -> Result<PagedResponse<Reservation>> {
    deps.repository
        .find_by_filter(request)
        .await
        .map_err(ReservationServiceError::RepositoryError)
}

/// 予約番号で1件取得する
///
/// クエリAPI用。見つからなければ `ReservationNotFound`。
pub async fn get_by_number(deps: &ServiceDependencies, number: &str) -> Result<Reservation> {
    let number = parse_number(number)?;

    deps.repository
        .find_by_number(&number)
        .await
        .map_err(ReservationServiceError::RepositoryError)?
        .ok_or(ReservationServiceError::ReservationNotFound)
}
