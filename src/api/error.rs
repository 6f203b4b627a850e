use crate::application::reservation::ReservationServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ReservationServiceError);

impl From<ReservationServiceError> for ApiError {
    fn from(err: ReservationServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 400 Bad Request - 必須識別子の欠落したメッセージ
            ReservationServiceError::InvalidMessage(ref msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_MESSAGE", msg.clone())
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            ReservationServiceError::ReservationNotFound => (
                StatusCode::NOT_FOUND,
                "RESERVATION_NOT_FOUND",
                "Reservation not found".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ReservationServiceError::RepositoryError(ref e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "Failed to persist reservation".to_string(),
                )
            }
            ReservationServiceError::InventoryError(ref e) => {
                tracing::error!("Inventory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVENTORY_ERROR",
                    "Inventory lookup failed".to_string(),
                )
            }
            ReservationServiceError::BusError(ref e) => {
                tracing::error!("Bus error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BUS_ERROR",
                    "Failed to publish event".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
