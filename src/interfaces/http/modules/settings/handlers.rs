//! Settings API handlers

use axum::{extract::State, Extension, Json};

use super::dto::SetCurrencyRequest;
use crate::domain::settings::CurrencySettings;
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/settings/currency",
    tag = "Settings",
    responses(
        (status = 200, description = "Display currency", body = ApiResponse<CurrencySettings>)
    )
)]
pub async fn get_currency(State(state): State<AppState>) -> ApiResult<CurrencySettings> {
    let settings = state.services.currency.get().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/currency",
    tag = "Settings",
    security(("bearer_auth" = [])),
    request_body = SetCurrencyRequest,
    responses(
        (status = 200, description = "Currency updated", body = ApiResponse<CurrencySettings>),
        (status = 403, description = "Super-admin only"),
        (status = 422, description = "Invalid code or symbol")
    )
)]
pub async fn set_currency(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<SetCurrencyRequest>,
) -> ApiResult<CurrencySettings> {
    let settings = state
        .services
        .currency
        .set(Some(&user), &request.code, &request.symbol)
        .await?;
    Ok(Json(ApiResponse::success(settings)))
}
