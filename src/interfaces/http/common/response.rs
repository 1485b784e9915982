//! Response envelope shared by every REST endpoint

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::types::{PaginatedResult, PaginationParams};

/// `{"success": true, "data": {...}}` on success,
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body for operations that return nothing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// `?page=&limit=` query parameters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PaginationQuery {
    /// 1-based page number. Default: 1
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (1-100). Default: 50
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl From<&PaginationQuery> for PaginationParams {
    fn from(q: &PaginationQuery) -> Self {
        PaginationParams::new(q.page, q.limit)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Convert a domain page, mapping each item to its DTO.
    pub fn from_result<D>(result: PaginatedResult<D>, map: impl FnMut(D) -> T) -> Self {
        Self {
            items: result.items.into_iter().map(map).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}
