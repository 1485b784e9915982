//! Checkout API handlers
//!
//! Clients should send an `Idempotency-Key` header; retrying with the same
//! key replays the first outcome instead of charging again.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};

use super::dto::{BookingCheckoutRequest, CheckoutReceiptDto, ExtensionCheckoutRequest};
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiError, ApiResponse};
use crate::interfaces::http::state::AppState;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// 201 for a fresh checkout, 200 for a replay.
fn receipt_status(dto: &CheckoutReceiptDto) -> StatusCode {
    if dto.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout/bookings",
    tag = "Checkout",
    security(("bearer_auth" = [])),
    params(("Idempotency-Key" = Option<String>, Header, description = "Replay key for retries")),
    request_body = BookingCheckoutRequest,
    responses(
        (status = 201, description = "Paid and booked", body = ApiResponse<CheckoutReceiptDto>),
        (status = 200, description = "Replay of an earlier request", body = ApiResponse<CheckoutReceiptDto>),
        (status = 404, description = "Slot or saved method not found"),
        (status = 409, description = "Slot unavailable or duplicate payment method"),
        (status = 422, description = "Invalid window or payment details")
    )
)]
pub async fn checkout_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(request): Json<BookingCheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutReceiptDto>>), ApiError> {
    let request = request.into_request(idempotency_key(&headers));
    let receipt = state.services.checkout.book(Some(&user), request).await?;
    let dto = CheckoutReceiptDto::from(receipt);
    Ok((receipt_status(&dto), Json(ApiResponse::success(dto))))
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout/extensions",
    tag = "Checkout",
    security(("bearer_auth" = [])),
    params(("Idempotency-Key" = Option<String>, Header, description = "Replay key for retries")),
    request_body = ExtensionCheckoutRequest,
    responses(
        (status = 201, description = "Paid and extended", body = ApiResponse<CheckoutReceiptDto>),
        (status = 200, description = "Replay of an earlier request", body = ApiResponse<CheckoutReceiptDto>),
        (status = 409, description = "Reservation is not active"),
        (status = 422, description = "Invalid hours or payment details")
    )
)]
pub async fn checkout_extension(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(request): Json<ExtensionCheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutReceiptDto>>), ApiError> {
    let request = request.into_request(idempotency_key(&headers));
    let receipt = state.services.checkout.extend(Some(&user), request).await?;
    let dto = CheckoutReceiptDto::from(receipt);
    Ok((receipt_status(&dto), Json(ApiResponse::success(dto))))
}
