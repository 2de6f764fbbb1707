//! Book registration workflow
//!
//! Validates uniqueness, fetches metadata, downloads cover art, persists
//! the book in a single write with a pre-generated id, queues a
//! notification per pending requester, and clears the request backlog.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{BookCatalog, BookMetadata};
use crate::db;
use crate::services::mailer::{render_registration_mail, MailerHandle};
use crate::services::metadata::MetadataService;

/// A field-level validation failure surfaced to the caller
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Registration failure taxonomy
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("A book with this ISBN already exists")]
    DuplicateBook,

    #[error("Book metadata not found")]
    MetadataNotFound,

    #[error("Failed to download book cover image")]
    ImageDownloadFailed,

    #[error("No content file provided")]
    MissingContent,

    #[error("Registration failed validation")]
    ValidationFailed { errors: Vec<FieldError> },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Uploaded content asset (audio/text payload)
#[derive(Debug, Clone)]
pub struct ContentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Successful registration outcome
#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub book_id: Uuid,
    pub isbn: String,
    pub title: String,
    /// Notification mails handed to the dispatch queue
    pub notifications_queued: usize,
}

/// Book registration workflow service
pub struct Registrar {
    db: SqlitePool,
    metadata: Arc<MetadataService>,
    catalog: Arc<dyn BookCatalog>,
    mailer: MailerHandle,
    assets_dir: PathBuf,
}

impl Registrar {
    pub fn new(
        db: SqlitePool,
        metadata: Arc<MetadataService>,
        catalog: Arc<dyn BookCatalog>,
        mailer: MailerHandle,
        assets_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            metadata,
            catalog,
            mailer,
            assets_dir,
        }
    }

    /// Register a book, short-circuiting on the first failed precondition.
    ///
    /// Persistence is all-or-nothing: a failed insert removes any asset
    /// files written for it. Notification dispatch is queued after the
    /// insert and never affects the result; backlog cleanup happens
    /// unconditionally once persistence succeeds.
    pub async fn register(
        &self,
        isbn: &str,
        genre: &str,
        content: Option<ContentUpload>,
        staff_user_id: &str,
    ) -> Result<Registered, RegisterError> {
        // Fast-path duplicate check. The UNIQUE constraint at insert time
        // is the authoritative signal under concurrency.
        let exists = db::books::isbn_exists(&self.db, isbn)
            .await
            .context("duplicate pre-check failed")?;
        if exists {
            return Err(RegisterError::DuplicateBook);
        }

        let metadata = self
            .metadata
            .fetch(isbn)
            .await
            .context("metadata fetch failed")?
            .ok_or(RegisterError::MetadataNotFound)?;

        let image_bytes = match self.catalog.download_image(&metadata.image).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(isbn = %isbn, url = %metadata.image, error = %e, "Cover download failed");
                return Err(RegisterError::ImageDownloadFailed);
            }
        };

        let content = content.ok_or(RegisterError::MissingContent)?;

        let errors = validate(isbn, genre, &metadata, &content);
        if !errors.is_empty() {
            return Err(RegisterError::ValidationFailed { errors });
        }

        // Pre-generated id lets asset names embed it and keeps the write
        // single-phase.
        let book_id = Uuid::new_v4();
        let image_path = self.assets_dir.join(format!("{}_image.jpg", isbn));
        let content_path = self
            .assets_dir
            .join(format!("{}_{}", book_id, sanitize_filename(&content.filename)));

        self.write_assets(&image_path, &image_bytes, &content_path, &content.bytes)
            .await?;

        let book = db::books::Book {
            book_id,
            isbn: isbn.to_string(),
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            publisher: metadata.publisher.clone(),
            genre: genre.to_string(),
            description: metadata.description.clone(),
            publication_date: chrono::Utc::now().date_naive().to_string(),
            likes: 0,
            user_id: staff_user_id.to_string(),
            image_path: image_path.display().to_string(),
            content_path: content_path.display().to_string(),
        };

        self.persist_book(&book, &image_path, &content_path).await?;

        info!(isbn = %isbn, book_id = %book_id, title = %book.title, "Book registered");

        let notifications_queued = self.notify_requesters(isbn, &book.title).await;

        // The result was decided at persistence: a failed cleanup leaves
        // stale backlog rows behind but never fails the registration.
        if let Err(e) = db::requests::delete_for_isbn(&self.db, isbn).await {
            warn!(isbn = %isbn, error = %e, "Request backlog cleanup failed");
        }

        Ok(Registered {
            book_id,
            isbn: isbn.to_string(),
            title: book.title,
            notifications_queued,
        })
    }

    /// Insert the book row, mapping a failure to the workflow taxonomy.
    ///
    /// All-or-nothing: a failed insert removes the asset files written for
    /// it. The ISBN UNIQUE constraint is the authoritative duplicate
    /// signal under concurrency; on a violation the image path (keyed by
    /// ISBN) now belongs to the row that won the insert, so only the
    /// content file (keyed by our book_id) is removed.
    pub async fn persist_book(
        &self,
        book: &db::books::Book,
        image_path: &Path,
        content_path: &Path,
    ) -> Result<(), RegisterError> {
        match db::books::insert_book(&self.db, book).await {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                remove_assets(&[content_path]).await;
                Err(RegisterError::DuplicateBook)
            }
            Err(other) => {
                remove_assets(&[image_path, content_path]).await;
                Err(RegisterError::Internal(
                    anyhow::Error::new(other).context("book insert failed"),
                ))
            }
        }
    }

    async fn write_assets(
        &self,
        image_path: &Path,
        image_bytes: &[u8],
        content_path: &Path,
        content_bytes: &[u8],
    ) -> Result<(), RegisterError> {
        tokio::fs::create_dir_all(&self.assets_dir)
            .await
            .context("assets directory creation failed")?;
        tokio::fs::write(image_path, image_bytes)
            .await
            .context("image asset write failed")?;
        if let Err(e) = tokio::fs::write(content_path, content_bytes).await {
            remove_assets(&[image_path, content_path]).await;
            return Err(RegisterError::Internal(
                anyhow::Error::new(e).context("content asset write failed"),
            ));
        }
        Ok(())
    }

    /// Queue one notification per distinct requester with an email address.
    /// Requesters without one are skipped; dispatch failures are observable
    /// only in logs.
    async fn notify_requesters(&self, isbn: &str, book_title: &str) -> usize {
        let requesters = match db::requests::requesters_for_isbn(&self.db, isbn).await {
            Ok(requesters) => requesters,
            Err(e) => {
                warn!(isbn = %isbn, error = %e, "Could not load requesters for notification");
                return 0;
            }
        };

        let mut queued = 0;
        for requester in requesters {
            let Some(email) = requester.email else {
                continue;
            };
            self.mailer
                .enqueue(render_registration_mail(&email, &requester.nickname, book_title));
            queued += 1;
        }

        info!(isbn = %isbn, queued, "Registration notifications queued");
        queued
    }
}

fn validate(
    isbn: &str,
    genre: &str,
    metadata: &BookMetadata,
    content: &ContentUpload,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if isbn.trim().is_empty() {
        errors.push(field_error("book_isbn", "ISBN must not be empty"));
    } else if !isbn.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(field_error("book_isbn", "ISBN must be alphanumeric"));
    }

    if genre.trim().is_empty() {
        errors.push(field_error("book_genre", "Genre must not be empty"));
    }

    if metadata.title.trim().is_empty() {
        errors.push(field_error("book_title", "Catalog metadata has no title"));
    }

    if metadata.author.trim().is_empty() {
        errors.push(field_error("book_author", "Catalog metadata has no author"));
    }

    if content.bytes.is_empty() {
        errors.push(field_error("book_content", "Content file is empty"));
    }

    errors
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Reduce an uploaded filename to its final component
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "content.bin".to_string())
}

/// Best-effort removal of asset files after a failed persist
async fn remove_assets(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Asset cleanup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> BookMetadata {
        BookMetadata {
            author: "Frank Herbert".into(),
            title: "Dune".into(),
            publisher: "Ace".into(),
            image: "https://img.example/dune.jpg".into(),
            isbn: "9780441013593".into(),
            description: "Spice.".into(),
        }
    }

    fn sample_content() -> ContentUpload {
        ContentUpload {
            filename: "dune.mp3".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_validation_passes_for_complete_input() {
        let errors = validate("9780441013593", "sci-fi", &sample_metadata(), &sample_content());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validation_collects_all_failures() {
        let mut metadata = sample_metadata();
        metadata.title = String::new();
        let content = ContentUpload {
            filename: "x".into(),
            bytes: vec![],
        };

        let errors = validate("", "", &metadata, &content);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"book_isbn"));
        assert!(fields.contains(&"book_genre"));
        assert!(fields.contains(&"book_title"));
        assert!(fields.contains(&"book_content"));
    }

    #[test]
    fn test_validation_rejects_non_alphanumeric_isbn() {
        let errors = validate("978-04;410", "sci-fi", &sample_metadata(), &sample_content());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "book_isbn");
    }

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dune.mp3"), "dune.mp3");
        assert_eq!(sanitize_filename(""), "content.bin");
    }
}
