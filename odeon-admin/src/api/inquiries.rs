//! Inquiry triage endpoints (read-only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::db;
use crate::db::inquiries::{AnsweredFilter, Inquiry};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for the inquiry listing
#[derive(Debug, Deserialize)]
pub struct InquiryQuery {
    /// Filter: "all" (default), "answered", or "not_answered"
    #[serde(default = "default_answered")]
    pub answered: String,
}

fn default_answered() -> String {
    "all".to_string()
}

/// GET /api/inquiries?answered=all|answered|not_answered
pub async fn list_inquiries(
    State(state): State<AppState>,
    Query(query): Query<InquiryQuery>,
) -> ApiResult<Json<Vec<Inquiry>>> {
    let filter = AnsweredFilter::from_query(&query.answered);
    let inquiries = db::inquiries::list_inquiries(&state.db, filter).await?;
    Ok(Json(inquiries))
}

/// GET /api/inquiries/:id
pub async fn inquiry_detail(
    State(state): State<AppState>,
    Path(inquiry_id): Path<i64>,
) -> ApiResult<Json<Inquiry>> {
    match db::inquiries::get_inquiry(&state.db, inquiry_id).await? {
        Some(inquiry) => Ok(Json(inquiry)),
        None => Err(ApiError::NotFound(format!("Inquiry {} not found", inquiry_id))),
    }
}
