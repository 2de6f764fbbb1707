//! User inquiry persistence (read-only from this subsystem)

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// A user-submitted question
#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub inquiry_id: i64,
    pub user_id: Option<String>,
    pub title: String,
    pub content: String,
    pub is_answered: bool,
    pub created_at: String,
}

/// Answered-state filter for inquiry listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsweredFilter {
    All,
    Answered,
    NotAnswered,
}

impl AnsweredFilter {
    /// Parse the `answered` query parameter; unknown values mean no filter.
    pub fn from_query(value: &str) -> Self {
        match value {
            "answered" => Self::Answered,
            "not_answered" => Self::NotAnswered,
            _ => Self::All,
        }
    }
}

/// List inquiries, optionally filtered by answered-state
pub async fn list_inquiries(pool: &SqlitePool, filter: AnsweredFilter) -> Result<Vec<Inquiry>> {
    let sql = match filter {
        AnsweredFilter::All => {
            "SELECT inquiry_id, user_id, title, content, is_answered, created_at \
             FROM inquiries ORDER BY inquiry_id"
        }
        AnsweredFilter::Answered => {
            "SELECT inquiry_id, user_id, title, content, is_answered, created_at \
             FROM inquiries WHERE is_answered = 1 ORDER BY inquiry_id"
        }
        AnsweredFilter::NotAnswered => {
            "SELECT inquiry_id, user_id, title, content, is_answered, created_at \
             FROM inquiries WHERE is_answered = 0 ORDER BY inquiry_id"
        }
    };

    let rows = sqlx::query(sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(inquiry_from_row).collect())
}

/// Load a single inquiry by id
pub async fn get_inquiry(pool: &SqlitePool, inquiry_id: i64) -> Result<Option<Inquiry>> {
    let row = sqlx::query(
        "SELECT inquiry_id, user_id, title, content, is_answered, created_at \
         FROM inquiries WHERE inquiry_id = ?",
    )
    .bind(inquiry_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(inquiry_from_row))
}

fn inquiry_from_row(row: sqlx::sqlite::SqliteRow) -> Inquiry {
    let is_answered: i64 = row.get("is_answered");
    Inquiry {
        inquiry_id: row.get("inquiry_id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        is_answered: is_answered != 0,
        created_at: row.get("created_at"),
    }
}

/// Insert an inquiry (test seeding helper)
pub async fn insert_inquiry(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    content: &str,
    is_answered: bool,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO inquiries (user_id, title, content, is_answered) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(is_answered as i64)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert_eq!(AnsweredFilter::from_query("answered"), AnsweredFilter::Answered);
        assert_eq!(
            AnsweredFilter::from_query("not_answered"),
            AnsweredFilter::NotAnswered
        );
        assert_eq!(AnsweredFilter::from_query("all"), AnsweredFilter::All);
        assert_eq!(AnsweredFilter::from_query("bogus"), AnsweredFilter::All);
    }
}
