use crate::domain::reservation::Reservation;
use crate::domain::value_objects::ReservationNumber;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::pagination::{PagedRequest, PagedResponse, ReservationFilter};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約リポジトリポート
///
/// 予約集約の永続化を抽象化する。ストレージエンジンは実装側の関心事。
/// 集約は素の値として出入りし、ORMのチェンジトラッカーのような
/// 隠れたセッション状態には依存しない。
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// 予約番号で集約を取得する
    ///
    /// 番号は完全一致。存在しなければ `None`。
    async fn find_by_number(&self, number: &ReservationNumber) -> Result<Option<Reservation>>;

    /// 集約を保存する（集約IDによる insert-or-update）
    ///
    /// 予約本体と所有する貸出明細はひとつの単位として原子的に
    /// 書き込まれなければならない。予約行だけ更新されて明細が
    /// 取り残される部分書き込みは正当性違反。
    async fn save(&self, reservation: Reservation) -> Result<Reservation>;

    /// 返却期限が境界より前の未返却明細を持つ予約を列挙する
    ///
    /// CheckDue スイープに使用される。境界は排他（due_date < cutoff）。
    async fn find_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reservation>>;

    /// フィルタとページ指定で予約を検索する
    ///
    /// 照合とページングは永続化側に委譲される。
    async fn find_by_filter(
        &self,
        request: &PagedRequest<ReservationFilter>,
    ) -> Result<PagedResponse<Reservation>>;
}
