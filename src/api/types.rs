use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::ReservationConfirmed;
use crate::domain::messages::{RequestedItem, ReservationRequest};
use crate::domain::reservation::{Loan, Reservation};

/// 予約リクエストのボディ
///
/// 外部バスのトランスポートが無いローカル構成では、この POST が
/// 受信メッセージのスタンドインになる。
#[derive(Debug, Deserialize)]
pub struct RequestReservationBody {
    pub number: String,
    pub member_id: String,
    pub member_document_id: String,
    pub member_name: String,
    pub items: Vec<RequestItemBody>,
}

#[derive(Debug, Deserialize)]
pub struct RequestItemBody {
    pub title: String,
    pub copy_number: Option<String>,
}

impl RequestReservationBody {
    pub fn into_message(self) -> ReservationRequest {
        ReservationRequest {
            number: self.number,
            member_id: self.member_id,
            member_document_id: self.member_document_id,
            member_name: self.member_name,
            items: self
                .items
                .into_iter()
                .map(|item| RequestedItem {
                    title: item.title,
                    copy_number: item.copy_number,
                })
                .collect(),
        }
    }
}

/// 返却リクエストのボディ
#[derive(Debug, Deserialize)]
pub struct ReturnReservationBody {
    pub return_date: DateTime<Utc>,
}

/// 予約一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    /// 予約番号の完全一致でフィルタリング
    pub number: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// 予約確定レスポンス（POST /reservations/request）
#[derive(Debug, Serialize)]
pub struct ReservationConfirmedResponse {
    pub reservation_id: Uuid,
    pub number: String,
    pub loans: Vec<ConfirmedLoanResponse>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmedLoanResponse {
    pub loan_id: Uuid,
    pub title: String,
    pub copy_number: Option<String>,
    pub due_date: DateTime<Utc>,
    pub book_resolved: bool,
    pub copy_resolved: bool,
}

impl From<ReservationConfirmed> for ReservationConfirmedResponse {
    fn from(event: ReservationConfirmed) -> Self {
        Self {
            reservation_id: event.reservation_id.value(),
            number: event.number,
            loans: event
                .loans
                .into_iter()
                .map(|loan| ConfirmedLoanResponse {
                    loan_id: loan.loan_id.value(),
                    title: loan.title,
                    copy_number: loan.copy_number,
                    due_date: loan.due_date,
                    book_resolved: loan.book_resolved,
                    copy_resolved: loan.copy_resolved,
                })
                .collect(),
        }
    }
}

/// 予約レスポンス（GET /reservations と GET /reservations/:number）
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub reservation_id: Uuid,
    pub number: String,
    pub member_id: Uuid,
    pub member_document_id: String,
    pub member_name: String,
    pub status: String,
    pub request_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub loans: Vec<LoanResponse>,
}

#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub title: String,
    pub copy_number: Option<String>,
    pub book_id: Option<Uuid>,
    pub copy_id: Option<Uuid>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            title: loan.title,
            copy_number: loan.copy_number,
            book_id: loan.book.map(|book| book.book_id.value()),
            copy_id: loan.copy.map(|copy| copy.copy_id.value()),
            due_date: loan.due_date,
            return_date: loan.return_date,
        }
    }
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            reservation_id: reservation.reservation_id.value(),
            number: reservation.number.as_str().to_string(),
            member_id: reservation.member.id.value(),
            member_document_id: reservation.member.document_id,
            member_name: reservation.member.name,
            status: reservation.status.as_str().to_string(),
            request_date: reservation.request_date,
            updated_at: reservation.updated_at,
            loans: reservation.loans.into_iter().map(LoanResponse::from).collect(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
