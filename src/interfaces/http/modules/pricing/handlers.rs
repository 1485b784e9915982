//! Pricing API handlers

use axum::{extract::State, Extension, Json};

use super::dto::{BookingQuoteRequest, ExtensionQuoteRequest, QuoteResponse};
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/pricing/quote",
    tag = "Pricing",
    request_body = BookingQuoteRequest,
    responses(
        (status = 200, description = "Cost of the booking window", body = ApiResponse<QuoteResponse>),
        (status = 404, description = "Slot not found"),
        (status = 422, description = "End time is not after start time")
    )
)]
pub async fn quote_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingQuoteRequest>,
) -> ApiResult<QuoteResponse> {
    let (_, quote) = state
        .services
        .reservations
        .quote_booking(request.slot_id, request.start_time, request.end_time)
        .await?;
    let currency = state.services.currency.get().await?;

    Ok(Json(ApiResponse::success(QuoteResponse {
        hours: Some(quote.hours),
        display_total: currency.format(quote.total),
        total: quote.total,
        currency: currency.code,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/pricing/extension-quote",
    tag = "Pricing",
    security(("bearer_auth" = [])),
    request_body = ExtensionQuoteRequest,
    responses(
        (status = 200, description = "Added cost of the extension", body = ApiResponse<QuoteResponse>),
        (status = 409, description = "Reservation is not active"),
        (status = 422, description = "Hours must be positive")
    )
)]
pub async fn quote_extension(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ExtensionQuoteRequest>,
) -> ApiResult<QuoteResponse> {
    let added = state
        .services
        .reservations
        .quote_extension(Some(&user), request.reservation_id, request.hours_to_add)
        .await?;
    let currency = state.services.currency.get().await?;

    Ok(Json(ApiResponse::success(QuoteResponse {
        hours: None,
        display_total: currency.format(added),
        total: added,
        currency: currency.code,
    })))
}
