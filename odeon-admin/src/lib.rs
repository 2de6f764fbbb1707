//! odeon-admin library interface
//!
//! Administrative back-office for the Odeon audiobook platform: staff
//! review book requests, register new audiobooks against the remote
//! catalog, triage inquiries, and view subscription counts.

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::catalog::BookCatalog;
use crate::services::mailer::MailerHandle;
use crate::services::metadata::MetadataService;
use crate::services::registrar::Registrar;
use odeon_common::TtlCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Cache-aside metadata fetcher
    pub metadata: Arc<MetadataService>,
    /// Book registration workflow
    pub registrar: Arc<Registrar>,
    /// Admin token; empty disables gating
    pub admin_token: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        cache: Arc<dyn TtlCache>,
        catalog: Arc<dyn BookCatalog>,
        mailer: MailerHandle,
        assets_dir: PathBuf,
        admin_token: String,
    ) -> Self {
        let metadata = Arc::new(MetadataService::new(cache, catalog.clone()));
        let registrar = Arc::new(Registrar::new(
            db.clone(),
            metadata.clone(),
            catalog,
            mailer,
            assets_dir,
        ));

        Self {
            db,
            metadata,
            registrar,
            admin_token,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Admin routes sit behind the token middleware; health and the
/// placeholder acknowledgments are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/requests", get(api::requests::list_requests))
        .route("/api/requests/:isbn/preview", get(api::requests::preview_request))
        .route("/api/books", post(api::books::register_book))
        .route("/api/inquiries", get(api::inquiries::list_inquiries))
        .route("/api/inquiries/:id", get(api::inquiries::inquiry_detail))
        .route("/api/subscriptions/monthly", get(api::subscriptions::monthly_counts))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::admin_middleware,
        ));

    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::misc_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
