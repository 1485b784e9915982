//! User directory handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{SetRoleRequest, UserProfileDto};
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All known users", body = ApiResponse<Vec<UserProfileDto>>),
        (status = 403, description = "Super-admin only")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<UserProfileDto>> {
    let users = state.services.users.list(Some(&user)).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserProfileDto::from).collect(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<UserProfileDto>),
        (status = 403, description = "Super-admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> ApiResult<UserProfileDto> {
    let profile = state
        .services
        .users
        .set_role(Some(&user), user_id, request.role)
        .await?;
    Ok(Json(ApiResponse::success(profile.into())))
}
