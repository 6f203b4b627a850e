use crate::application::reservation::{
    ServiceDependencies, expire as execute_expire, get_by_filter, get_by_number,
    process_return, request as execute_request,
};
use crate::domain::messages::{ReservationExpire, ReservationReturn};
use crate::ports::pagination::{PagedRequest, PagedResponse, ReservationFilter};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        ListReservationsQuery, RequestReservationBody, ReservationConfirmedResponse,
        ReservationResponse, ReturnReservationBody,
    },
};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /reservations/request - 予約リクエストを受け付ける
///
/// バス経由の ReservationRequest メッセージと同じ処理を通る。
/// 同じ番号の再送は既存予約の更新として吸収される（冪等）。
pub async fn request_reservation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestReservationBody>,
) -> Result<(StatusCode, Json<ReservationConfirmedResponse>), ApiError> {
    let event = execute_request(&state.service_deps, body.into_message()).await?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// POST /reservations/:number/return - 返却を記録する
///
/// 事前のステータスに関わらず Delivered に上書きする。
/// 未知の番号は破棄されるため、このエンドポイントも 204 を返す。
pub async fn return_reservation(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
    Json(body): Json<ReturnReservationBody>,
) -> Result<StatusCode, ApiError> {
    let message = ReservationReturn {
        number,
        return_date: body.return_date,
    };

    process_return(&state.service_deps, message).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /reservations/:number/expire - 期限切れを記録する
///
/// 事前のステータスに関わらず Expired に上書きする（冪等）。
pub async fn expire_reservation(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<StatusCode, ApiError> {
    let message = ReservationExpire { number };

    execute_expire(&state.service_deps, message).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /reservations - フィルタとページ指定で予約を検索する
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<PagedResponse<ReservationResponse>>, ApiError> {
    let request = PagedRequest::new(
        query.page.unwrap_or(1),
        query
            .size
            .unwrap_or(PagedRequest::<ReservationFilter>::DEFAULT_PAGE_SIZE),
        Some(ReservationFilter {
            number: query.number,
        }),
    );

    let page = get_by_filter(&state.service_deps, &request).await?;

    let response = PagedResponse::new(
        page.items.into_iter().map(ReservationResponse::from).collect(),
        page.total,
        page.page,
        page.size,
    );

    Ok(Json(response))
}

/// GET /reservations/:number - 予約番号で1件取得する
pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = get_by_number(&state.service_deps, &number).await?;

    Ok(Json(reservation.into()))
}
