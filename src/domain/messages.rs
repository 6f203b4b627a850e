use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 受信メッセージ：予約リクエスト
///
/// バスから at-least-once 配信で届く。予約番号が冪等キーとなり、
/// 同じ番号の2通目は新規作成ではなく既存集約の更新として扱われる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub number: String,
    pub member_id: String,
    pub member_document_id: String,
    pub member_name: String,
    pub items: Vec<RequestedItem>,
}

/// 予約リクエストの明細行
///
/// `title` は書籍の自然キーとして在庫照合に使われ、解決の成否に
/// 関わらず明細にテキストのまま保存される。`copy_number` は省略可。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedItem {
    pub title: String,
    pub copy_number: Option<String>,
}

/// 受信メッセージ：予約返却
///
/// 物理的に本が返却された事実を表す。事前のステータスに関わらず
/// 集約を Delivered に上書きする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationReturn {
    pub number: String,
    pub return_date: DateTime<Utc>,
}

/// 受信メッセージ：予約期限切れ
///
/// CheckDue スイープが発行した通知を下流で消費したもの。
/// 事前のステータスに関わらず集約を Expired に上書きする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationExpire {
    pub number: String,
}
