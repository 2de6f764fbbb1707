//! Shared test fixtures: in-memory database, stub catalog, recording mail
//! transport, and multipart form builders.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

use odeon_admin::catalog::{BookCatalog, BookMetadata, CatalogError};
use odeon_admin::services::mailer::{spawn_mailer, MailMessage, MailTransport};
use odeon_admin::services::registrar::Registrar;
use odeon_admin::{build_router, AppState};
use odeon_common::MemoryCache;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// Catalog stub with per-ISBN fixtures and call counting
#[derive(Default)]
pub struct StubCatalog {
    pub books: HashMap<String, BookMetadata>,
    pub search_calls: AtomicUsize,
    pub fail_search: bool,
    pub fail_image: bool,
}

impl StubCatalog {
    pub fn with_books(books: Vec<BookMetadata>) -> Self {
        Self {
            books: books.into_iter().map(|b| (b.isbn.clone(), b)).collect(),
            ..Self::default()
        }
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookCatalog for StubCatalog {
    async fn search_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(CatalogError::Api(503, "unavailable".into()));
        }
        Ok(self.books.get(isbn).cloned())
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        if self.fail_image {
            return Err(CatalogError::Api(404, url.to_string()));
        }
        Ok(b"jpeg-bytes".to_vec())
    }
}

/// Mail transport that records instead of sending
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &MailMessage) -> anyhow::Result<()> {
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

/// Everything a test needs to drive the service
pub struct TestApp {
    pub app: axum::Router,
    pub db: SqlitePool,
    pub catalog: Arc<StubCatalog>,
    pub transport: Arc<RecordingTransport>,
    pub registrar: Arc<Registrar>,
    pub assets_dir: std::path::PathBuf,
    // Held so the assets directory outlives the test
    _assets: TempDir,
}

/// Build the service against an in-memory database and the given stub
/// catalog. Admin gating uses TEST_ADMIN_TOKEN.
pub async fn setup_app(catalog: StubCatalog) -> TestApp {
    let db = setup_pool().await;
    let catalog = Arc::new(catalog);
    let transport = Arc::new(RecordingTransport::default());
    let mailer = spawn_mailer(transport.clone());

    let assets = TempDir::new().expect("tempdir");
    let assets_dir = assets.path().to_path_buf();

    let state = AppState::new(
        db.clone(),
        Arc::new(MemoryCache::new()),
        catalog.clone(),
        mailer,
        assets_dir.clone(),
        TEST_ADMIN_TOKEN.to_string(),
    );

    let registrar = state.registrar.clone();

    TestApp {
        app: build_router(state),
        db,
        catalog,
        transport,
        registrar,
        assets_dir,
        _assets: assets,
    }
}

/// Single-connection in-memory pool (each connection would otherwise get
/// its own private :memory: database)
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    odeon_admin::db::init_tables(&pool).await.expect("init tables");
    pool
}

pub fn sample_metadata(isbn: &str, title: &str) -> BookMetadata {
    BookMetadata {
        author: "Test Author".to_string(),
        title: title.to_string(),
        publisher: "Test House".to_string(),
        image: format!("https://img.example/{}.jpg", isbn),
        isbn: isbn.to_string(),
        description: "A test book.".to_string(),
    }
}

/// GET request with the admin token attached
pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-admin-token", TEST_ADMIN_TOKEN)
        .body(Body::empty())
        .unwrap()
}

/// GET request without credentials
pub fn anon_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

const BOUNDARY: &str = "odeon-test-boundary";

/// Build the admin registration form as a multipart POST
pub fn register_request(
    isbn: &str,
    genre: &str,
    content: Option<(&str, &[u8])>,
) -> Request<Body> {
    register_request_as(isbn, genre, Some("staff-1"), content)
}

/// Registration form with an explicit (or omitted) staff identity
pub fn register_request_as(
    isbn: &str,
    genre: &str,
    staff_user_id: Option<&str>,
    content: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    push_text_part(&mut body, "book_isbn", isbn);
    push_text_part(&mut body, "book_genre", genre);
    if let Some(staff) = staff_user_id {
        push_text_part(&mut body, "staff_user_id", staff);
    }

    if let Some((filename, bytes)) = content {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"book_content\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/books")
        .header("x-admin-token", TEST_ADMIN_TOKEN)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn push_text_part(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

/// Extract JSON body from a response
pub async fn extract_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Seed a user row
pub async fn seed_user(pool: &SqlitePool, user_id: &str, email: Option<&str>) {
    odeon_admin::db::users::upsert_user(
        pool,
        &odeon_admin::db::users::User {
            user_id: user_id.to_string(),
            nickname: format!("nick-{}", user_id),
            email: email.map(|e| e.to_string()),
            is_admin: false,
        },
    )
    .await
    .expect("seed user");
}

/// Seed a book request with an explicit aggregate count
pub async fn seed_request(pool: &SqlitePool, isbn: &str, count: i64) {
    sqlx::query("INSERT INTO book_requests (isbn, request_count) VALUES (?, ?)")
        .bind(isbn)
        .bind(count)
        .execute(pool)
        .await
        .expect("seed request");
}

/// Record a user's request through the production path (creates the
/// aggregate row and the join row, bumping the count)
pub async fn seed_user_request(pool: &SqlitePool, user_id: &str, isbn: &str) {
    odeon_admin::db::requests::upsert_request(pool, isbn, user_id)
        .await
        .expect("seed user request");
}
