use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LoanId, MemberSnapshot, ReservationId};

/// イベント：予約が確定した
///
/// リクエスト処理の成功時（新規・更新とも）に発行される。
/// 明細ごとに在庫解決の結果を運ぶ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    pub reservation_id: ReservationId,
    pub number: String,
    pub member: MemberSnapshot,
    pub loans: Vec<ConfirmedLoan>,
}

/// 確定イベント内の明細行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedLoan {
    pub loan_id: LoanId,
    pub title: String,
    pub copy_number: Option<String>,
    pub due_date: DateTime<Utc>,
    pub book_resolved: bool,
    pub copy_resolved: bool,
}

/// イベント：予約の期限切れを検知した
///
/// CheckDue スイープが、期限を過ぎた未返却明細を持つ予約ごとに
/// 1件だけ発行する。スイープ自体はステータスを変更しない。
/// この通知を Expire メッセージとして消費するハンドラは冪等。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDueExpired {
    pub reservation_id: ReservationId,
    pub number: String,
}
