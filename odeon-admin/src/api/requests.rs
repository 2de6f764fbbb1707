//! Book request listing and metadata preview
//!
//! The listing resolves every outstanding request against the metadata
//! fetcher, silently dropping rows the catalog cannot resolve, ranks
//! descending by request count (stable, ties keep backlog order) and
//! paginates in fixed pages of 10.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::BookMetadata;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Query parameters for the request listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// One ranked row of the request listing
#[derive(Debug, Clone, Serialize)]
pub struct RankedRequest {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub request_count: i64,
}

/// Request listing response
#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_requests: i64,
    pub requests: Vec<RankedRequest>,
}

/// GET /api/requests?page=N
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<RequestListResponse>> {
    let backlog = db::requests::list_requests(&state.db).await?;

    let mut resolved = Vec::with_capacity(backlog.len());
    for request in backlog {
        // Rows without resolvable metadata are dropped, not reported.
        let Some(metadata) = state.metadata.fetch(&request.isbn).await? else {
            continue;
        };
        resolved.push(RankedRequest {
            isbn: request.isbn,
            title: metadata.title,
            author: metadata.author,
            publisher: metadata.publisher,
            request_count: request.request_count,
        });
    }

    resolved.sort_by(|a, b| b.request_count.cmp(&a.request_count));

    let total_requests = resolved.len() as i64;
    let pagination = calculate_pagination(total_requests, query.page);

    let requests = resolved
        .into_iter()
        .skip(pagination.offset as usize)
        .take(PAGE_SIZE as usize)
        .collect();

    Ok(Json(RequestListResponse {
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        total_requests,
        requests,
    }))
}

/// GET /api/requests/:isbn/preview
///
/// Metadata preview for a single ISBN ahead of registration.
pub async fn preview_request(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> ApiResult<Json<BookMetadata>> {
    match state.metadata.fetch(&isbn).await? {
        Some(metadata) => Ok(Json(metadata)),
        None => Err(ApiError::NotFound(format!(
            "No catalog metadata for ISBN {}",
            isbn
        ))),
    }
}
