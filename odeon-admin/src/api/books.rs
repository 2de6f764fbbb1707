//! Book registration endpoint
//!
//! Accepts the admin registration form (multipart: `book_isbn`,
//! `book_genre`, `staff_user_id`, `book_content` file) and runs the
//! registration workflow.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::registrar::ContentUpload;
use crate::AppState;

/// Successful registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
    pub book_id: Uuid,
    pub notifications_queued: usize,
}

/// POST /api/books (multipart form)
pub async fn register_book(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<RegisterResponse>> {
    let form = RegisterForm::from_multipart(multipart).await?;

    let isbn = form
        .isbn
        .ok_or_else(|| ApiError::BadRequest("Missing form field: book_isbn".to_string()))?;
    let genre = form
        .genre
        .ok_or_else(|| ApiError::BadRequest("Missing form field: book_genre".to_string()))?;
    let staff_user_id = form
        .staff_user_id
        .ok_or_else(|| ApiError::BadRequest("Missing form field: staff_user_id".to_string()))?;

    // Content absence is a workflow failure (MISSING_CONTENT), not a form
    // parse error, so the Option passes through.
    let registered = state
        .registrar
        .register(&isbn, &genre, form.content, &staff_user_id)
        .await?;

    Ok(Json(RegisterResponse {
        status: "success".to_string(),
        message: "Book registered successfully.".to_string(),
        book_id: registered.book_id,
        notifications_queued: registered.notifications_queued,
    }))
}

#[derive(Default)]
struct RegisterForm {
    isbn: Option<String>,
    genre: Option<String>,
    content: Option<ContentUpload>,
    staff_user_id: Option<String>,
}

impl RegisterForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart form: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "book_isbn" => {
                    form.isbn = Some(read_text(field).await?);
                }
                "book_genre" => {
                    form.genre = Some(read_text(field).await?);
                }
                "staff_user_id" => {
                    form.staff_user_id = Some(read_text(field).await?);
                }
                "book_content" => {
                    let filename = field.file_name().unwrap_or("content.bin").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| {
                            ApiError::BadRequest(format!("Failed to read content file: {}", e))
                        })?
                        .to_vec();
                    form.content = Some(ContentUpload { filename, bytes });
                }
                other => {
                    tracing::debug!(field = %other, "Ignoring unknown form field");
                }
            }
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))
}
