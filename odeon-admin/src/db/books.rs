//! Book catalog persistence

use sqlx::SqlitePool;
use uuid::Uuid;

/// Canonical catalog entry
///
/// Both asset paths are written exactly once, at registration time.
#[derive(Debug, Clone)]
pub struct Book {
    pub book_id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub genre: String,
    pub description: String,
    /// Registration date, `YYYY-MM-DD`
    pub publication_date: String,
    pub likes: i64,
    /// Owning staff user
    pub user_id: String,
    pub image_path: String,
    pub content_path: String,
}

/// Check whether a book with this ISBN is already in the catalog
pub async fn isbn_exists(pool: &SqlitePool, isbn: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Insert a book row (single-phase write, id pre-generated by the caller)
///
/// Returns the raw sqlx error so callers can map a UNIQUE-constraint
/// violation on isbn to the duplicate-book signal.
pub async fn insert_book(pool: &SqlitePool, book: &Book) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO books (
            book_id, isbn, title, author, publisher, genre, description,
            publication_date, likes, user_id, image_path, content_path
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.book_id.to_string())
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.publisher)
    .bind(&book.genre)
    .bind(&book.description)
    .bind(&book.publication_date)
    .bind(book.likes)
    .bind(&book.user_id)
    .bind(&book.image_path)
    .bind(&book.content_path)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count catalog entries (test and diagnostics helper)
pub async fn count_books(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
}
