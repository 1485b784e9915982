//! Session handlers
//!
//! Tokens are issued by the external auth provider; these endpoints only
//! mirror the session into the user directory and the audit log.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::{CurrentUser, UserRole};
use crate::interfaces::http::common::{ApiResponse, ApiResult, EmptyData};
use crate::interfaces::http::modules::users::UserProfileDto;
use crate::interfaces::http::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<CurrentUser> for SessionDto {
    fn from(u: CurrentUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller as seen by this service", body = ApiResponse<SessionDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn current_session(Extension(user): Extension<CurrentUser>) -> ApiResult<SessionDto> {
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/session",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sign-in recorded, profile refreshed", body = ApiResponse<UserProfileDto>)
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<UserProfileDto> {
    let profile = state.services.users.touch(Some(&user)).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/session",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sign-out recorded", body = ApiResponse<EmptyData>)
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<EmptyData> {
    state.services.users.sign_out(Some(&user)).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
