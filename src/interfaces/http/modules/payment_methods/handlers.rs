//! Payment method API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::dto::PaymentMethodDto;
use crate::domain::payment_method::PaymentInput;
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, EmptyData};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/payment-methods",
    tag = "Payment Methods",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's saved methods, oldest first", body = ApiResponse<Vec<PaymentMethodDto>>)
    )
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<PaymentMethodDto>> {
    let methods = state.services.vault.list(user.id).await?;
    Ok(Json(ApiResponse::success(
        methods.into_iter().map(PaymentMethodDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/payment-methods",
    tag = "Payment Methods",
    security(("bearer_auth" = [])),
    request_body = PaymentInput,
    responses(
        (status = 201, description = "Method saved", body = ApiResponse<PaymentMethodDto>),
        (status = 409, description = "An equivalent method is already saved"),
        (status = 422, description = "Invalid card or wallet details")
    )
)]
pub async fn add_payment_method(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<PaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentMethodDto>>), ApiError> {
    let method = state.services.vault.add_input(Some(&user), &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(method.into())),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payment-methods/{method_id}",
    tag = "Payment Methods",
    security(("bearer_auth" = [])),
    params(("method_id" = Uuid, Path, description = "Saved method ID")),
    responses(
        (status = 200, description = "Removed, or was already gone", body = ApiResponse<EmptyData>)
    )
)]
pub async fn remove_payment_method(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(method_id): Path<Uuid>,
) -> ApiResult<EmptyData> {
    state.services.vault.remove(Some(&user), method_id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
