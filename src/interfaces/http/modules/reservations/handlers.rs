//! Reservation API handlers
//!
//! Creating and extending go through checkout; these endpoints read and
//! end reservations.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{to_dtos, ReservationDto};
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reservations, newest start first", body = ApiResponse<Vec<ReservationDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_my_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.services.reservations.all_for(user.id).await?;
    Ok(Json(ApiResponse::success(to_dtos(reservations))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/active",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's current reservation, or null", body = ApiResponse<Option<ReservationDto>>)
    )
)]
pub async fn get_active_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Option<ReservationDto>> {
    let active = state.services.reservations.active_for(user.id).await?;
    Ok(Json(ApiResponse::success(active.map(ReservationDto::from))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/all",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every reservation (staff)", body = ApiResponse<Vec<ReservationDto>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_all_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.services.reservations.list_all(Some(&user)).await?;
    Ok(Json(ApiResponse::success(to_dtos(reservations))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("reservation_id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(reservation_id): Path<Uuid>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .services
        .reservations
        .get(Some(&user), reservation_id)
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations/{reservation_id}/end",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("reservation_id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation completed and slot released", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Reservation is not active")
    )
)]
pub async fn end_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(reservation_id): Path<Uuid>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .services
        .reservations
        .end(Some(&user), reservation_id)
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}
