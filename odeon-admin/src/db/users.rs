//! User records
//!
//! The admin service only reads users to resolve requesters for
//! notification; the upsert exists for seeding and provisioning.

use anyhow::Result;
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: String,
    pub nickname: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// Insert a user, replacing any existing row for the id
pub async fn upsert_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, nickname, email, is_admin) VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            nickname = excluded.nickname,
            email = excluded.email,
            is_admin = excluded.is_admin
        "#,
    )
    .bind(&user.user_id)
    .bind(&user.nickname)
    .bind(&user.email)
    .bind(user.is_admin as i64)
    .execute(pool)
    .await?;
    Ok(())
}
