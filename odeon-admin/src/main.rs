//! odeon-admin - Audiobook back-office service
//!
//! Staff-facing JSON API: book request review and ranking, registration of
//! new audiobook entries against the remote catalog, inquiry triage, and
//! subscription membership reporting.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use odeon_admin::catalog::CatalogClient;
use odeon_admin::services::mailer::{spawn_mailer, SmtpMailer};
use odeon_admin::AppState;
use odeon_common::{MemoryCache, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting odeon-admin (audiobook back-office)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    info!("Database: {}", settings.database_path.display());
    info!("Assets: {}", settings.assets_dir.display());
    if !settings.admin_gating_enabled() {
        info!("Admin gating disabled (no admin token configured)");
    }

    let db_pool = odeon_admin::db::init_database_pool(&settings.database_path).await?;
    info!("Database connection established");

    let catalog = Arc::new(CatalogClient::new(
        settings.catalog_base_url.clone(),
        settings.catalog_client_id.clone(),
        settings.catalog_client_secret.clone(),
    )?);

    let transport = Arc::new(SmtpMailer::new(&settings.smtp_url, &settings.mail_from)?);
    let mailer = spawn_mailer(transport);
    info!("Mailer actor started");

    let state = AppState::new(
        db_pool,
        Arc::new(MemoryCache::new()),
        catalog,
        mailer,
        settings.assets_dir.clone(),
        settings.admin_token.clone(),
    );

    let app = odeon_admin::build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Listening on http://{}", settings.bind_addr);
    info!("Health check: http://{}/health", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
