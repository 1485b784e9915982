//! Authentication middleware for Axum
//!
//! Sessions are bearer JWTs issued by the external auth provider. A valid
//! token becomes a [`CurrentUser`] in the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::ApiResponse;
use crate::domain::user::CurrentUser;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    MalformedClaims,
}

/// State the auth layers need
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

pub(crate) fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

/// Decode a bearer token into the session user.
pub fn authenticate(token: &str, config: &JwtConfig) -> Result<CurrentUser, AuthError> {
    let claims = verify_token(token, config).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;
    claims.to_current_user().ok_or(AuthError::MalformedClaims)
}

fn bearer(request: &Request<Body>) -> Option<Result<&str, AuthError>> {
    let value = request.headers().get(header::AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(extract_token)
            .ok_or(AuthError::InvalidToken),
    )
}

/// Rejects requests without a valid session.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match bearer(&request) {
        None => return auth_error_response(AuthError::MissingToken),
        Some(Err(e)) => return auth_error_response(e),
        Some(Ok(token)) => authenticate(token, &auth_state.jwt_config),
    };

    match user {
        Ok(user) => {
            debug!(user_id = %user.id, role = %user.role, "Authenticated request");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

/// Attaches the session when one is presented; anonymous requests pass.
/// A token that is present but invalid is still rejected.
pub async fn optional_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match bearer(&request) {
        None => None,
        Some(Err(e)) => return auth_error_response(e),
        Some(Ok(token)) => match authenticate(token, &auth_state.jwt_config) {
            Ok(user) => Some(user),
            Err(e) => return auth_error_response(e),
        },
    };

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

pub(crate) fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
        AuthError::MalformedClaims => "Token does not describe a user",
    };

    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
