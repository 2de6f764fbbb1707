//! Subscription revenue reporting

use axum::{extract::State, Json};
use chrono::Utc;

use crate::db;
use crate::db::subscriptions::MonthlyCounts;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/subscriptions/monthly
///
/// Membership counts for the trailing 12 calendar months, most recent
/// last.
pub async fn monthly_counts(State(state): State<AppState>) -> ApiResult<Json<MonthlyCounts>> {
    let today = Utc::now().date_naive();
    let counts = db::subscriptions::monthly_counts(&state.db, today).await?;
    Ok(Json(counts))
}
