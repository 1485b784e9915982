//! Slot API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{SetStatusRequest, SlotDto, SlotRequest, SlotSearchParams};
use crate::domain::slot::SlotFilter;
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, EmptyData, ValidatedJson,
};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/slots",
    tag = "Slots",
    params(SlotSearchParams),
    responses(
        (status = 200, description = "Slots matching the filters, by name", body = ApiResponse<Vec<SlotDto>>)
    )
)]
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotSearchParams>,
) -> ApiResult<Vec<SlotDto>> {
    let filter = SlotFilter::from(params);
    let slots = state.services.slots.search(&filter).await?;
    Ok(Json(ApiResponse::success(
        slots.into_iter().map(SlotDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/slots/{slot_id}",
    tag = "Slots",
    params(("slot_id" = Uuid, Path, description = "Slot ID")),
    responses(
        (status = 200, description = "Slot details", body = ApiResponse<SlotDto>),
        (status = 404, description = "Slot not found")
    )
)]
pub async fn get_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<Uuid>,
) -> ApiResult<SlotDto> {
    let slot = state.services.slots.get(slot_id).await?;
    Ok(Json(ApiResponse::success(slot.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/slots",
    tag = "Slots",
    security(("bearer_auth" = [])),
    request_body = SlotRequest,
    responses(
        (status = 201, description = "Slot created", body = ApiResponse<SlotDto>),
        (status = 403, description = "Staff only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_slot(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<SlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SlotDto>>), ApiError> {
    let slot = state.services.slots.add(Some(&user), request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(slot.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/slots/{slot_id}",
    tag = "Slots",
    security(("bearer_auth" = [])),
    params(("slot_id" = Uuid, Path, description = "Slot ID")),
    request_body = SlotRequest,
    responses(
        (status = 200, description = "Slot updated", body = ApiResponse<SlotDto>),
        (status = 404, description = "Slot not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_slot(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slot_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SlotRequest>,
) -> ApiResult<SlotDto> {
    let slot = state
        .services
        .slots
        .update(Some(&user), slot_id, request.into())
        .await?;
    Ok(Json(ApiResponse::success(slot.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/slots/{slot_id}",
    tag = "Slots",
    security(("bearer_auth" = [])),
    params(("slot_id" = Uuid, Path, description = "Slot ID")),
    responses(
        (status = 200, description = "Slot removed", body = ApiResponse<EmptyData>),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot has an active reservation")
    )
)]
pub async fn delete_slot(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slot_id): Path<Uuid>,
) -> ApiResult<EmptyData> {
    state.services.slots.remove(Some(&user), slot_id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    put,
    path = "/api/v1/slots/{slot_id}/status",
    tag = "Slots",
    security(("bearer_auth" = [])),
    params(("slot_id" = Uuid, Path, description = "Slot ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<SlotDto>),
        (status = 404, description = "Slot not found")
    )
)]
pub async fn set_slot_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<SlotDto> {
    let slot = state
        .services
        .slots
        .set_status(Some(&user), slot_id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(slot.into())))
}
