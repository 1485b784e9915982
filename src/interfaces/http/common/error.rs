//! Mapping from domain failures to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// A domain error on its way out as a JSON envelope.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::InvalidDuration(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::ReservationNotFound(_)
            | DomainError::SlotNotFound(_)
            | DomainError::UserNotFound(_)
            | DomainError::PaymentMethodNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::DuplicateMethod
            | DomainError::SlotUnavailable(_)
            | DomainError::SlotInUse(_)
            | DomainError::ReservationNotActive(_)
            | DomainError::ReservationChanged(_)
            | DomainError::IdempotencyKeyReused(_) => StatusCode::CONFLICT,
            DomainError::UserNotAuthenticated => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::StoreTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::Settlement(_) | DomainError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        let message = match &self.0 {
            DomainError::Validation(fields) => fields.to_string(),
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (DomainError::validation("name", "required"), 422),
            (DomainError::InvalidDuration("x".into()), 422),
            (DomainError::SlotNotFound(Uuid::nil()), 404),
            (DomainError::DuplicateMethod, 409),
            (DomainError::SlotUnavailable(Uuid::nil()), 409),
            (DomainError::ReservationChanged(Uuid::nil()), 409),
            (DomainError::IdempotencyKeyReused("k".into()), 409),
            (DomainError::UserNotAuthenticated, 401),
            (DomainError::Forbidden("no".into()), 403),
            (DomainError::StoreTimeout("write"), 504),
            (DomainError::Settlement("declined".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError(err).status().as_u16(), code);
        }
    }
}
