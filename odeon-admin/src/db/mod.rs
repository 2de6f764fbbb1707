//! Database access for odeon-admin
//!
//! SQLite via sqlx; tables are created at startup if missing.

pub mod books;
pub mod inquiries;
pub mod requests;
pub mod subscriptions;
pub mod users;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create odeon-admin tables if they don't exist
///
/// The UNIQUE constraint on books.isbn is the authoritative duplicate
/// signal: concurrent registrations for one ISBN resolve at insert time,
/// not at the racy pre-check.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            nickname TEXT NOT NULL,
            email TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_requests (
            isbn TEXT PRIMARY KEY,
            request_count INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_request_books (
            user_id TEXT NOT NULL,
            isbn TEXT NOT NULL REFERENCES book_requests(isbn),
            PRIMARY KEY (user_id, isbn)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            book_id TEXT PRIMARY KEY,
            isbn TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT,
            genre TEXT NOT NULL,
            description TEXT,
            publication_date TEXT NOT NULL,
            likes INTEGER NOT NULL DEFAULT 0,
            user_id TEXT,
            image_path TEXT NOT NULL,
            content_path TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inquiries (
            inquiry_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            is_answered INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            sub_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (users, book_requests, user_request_books, books, inquiries, subscriptions)"
    );

    Ok(())
}
