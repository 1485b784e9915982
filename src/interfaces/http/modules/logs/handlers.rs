//! Audit log API handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::dto::{LogQuery, SystemLogDto};
use crate::domain::user::CurrentUser;
use crate::interfaces::http::common::{ApiResponse, ApiResult, PaginatedResponse};
use crate::interfaces::http::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/logs",
    tag = "Logs",
    security(("bearer_auth" = [])),
    params(LogQuery),
    responses(
        (status = 200, description = "Newest-first page of audit logs", body = ApiResponse<PaginatedResponse<SystemLogDto>>),
        (status = 403, description = "Super-admin only")
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LogQuery>,
) -> ApiResult<PaginatedResponse<SystemLogDto>> {
    let page = state
        .services
        .audit
        .list(Some(&user), query.filter(), query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        SystemLogDto::from,
    ))))
}
