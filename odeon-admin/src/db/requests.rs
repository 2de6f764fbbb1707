//! Book request backlog persistence
//!
//! A BookRequest aggregates demand for an ISBN not yet in the catalog;
//! user_request_books joins each requesting user to it. Both are deleted
//! together once the book is registered.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

/// Aggregate demand signal for one ISBN
#[derive(Debug, Clone)]
pub struct BookRequest {
    pub isbn: String,
    pub request_count: i64,
}

/// A requesting user resolved through the users table
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: String,
    pub nickname: String,
    pub email: Option<String>,
}

/// Load all outstanding book requests in insertion order
pub async fn list_requests(pool: &SqlitePool) -> Result<Vec<BookRequest>> {
    let rows = sqlx::query("SELECT isbn, request_count FROM book_requests ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| BookRequest {
            isbn: row.get("isbn"),
            request_count: row.get("request_count"),
        })
        .collect())
}

/// Load all distinct requesters of an ISBN with their contact details
pub async fn requesters_for_isbn(pool: &SqlitePool, isbn: &str) -> Result<Vec<Requester>> {
    let rows = sqlx::query(
        r#"
        SELECT u.user_id, u.nickname, u.email
        FROM user_request_books urb
        JOIN users u ON u.user_id = urb.user_id
        WHERE urb.isbn = ?
        ORDER BY u.user_id
        "#,
    )
    .bind(isbn)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Requester {
            user_id: row.get("user_id"),
            nickname: row.get("nickname"),
            email: row.get("email"),
        })
        .collect())
}

/// Record one user's request for an ISBN, bumping the aggregate count
pub async fn upsert_request(pool: &SqlitePool, isbn: &str, user_id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO book_requests (isbn, request_count) VALUES (?, 1)
        ON CONFLICT(isbn) DO UPDATE SET request_count = request_count + 1
        "#,
    )
    .bind(isbn)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO user_request_books (user_id, isbn) VALUES (?, ?)")
        .bind(user_id)
        .bind(isbn)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Delete the request backlog for an ISBN (join rows first, then the request)
pub async fn delete_for_isbn(pool: &SqlitePool, isbn: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_request_books WHERE isbn = ?")
        .bind(isbn)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM book_requests WHERE isbn = ?")
        .bind(isbn)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Count outstanding requests for an ISBN (test and diagnostics helper)
pub async fn request_count_for_isbn(pool: &SqlitePool, isbn: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM book_requests WHERE isbn = ?")
        .bind(isbn)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
