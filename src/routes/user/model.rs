use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::utils::hash_password;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::new("username", "Username must not be empty"));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(FieldError::new(
            "username",
            "Only letters, digits and underscores are allowed",
        ));
    }
    Ok(())
}

impl User {
    pub async fn create(pool: &PgPool, username: &str, password: &str) -> Result<Self, AppError> {
        let password_hash = hash_password(password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists("Username is taken")
            }
            _ => AppError::from(e),
        })?;

        Ok(user)
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_allow_word_characters_only() {
        assert!(validate_username("leo_42").is_ok());
        assert!(validate_username("auth").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("dash-ed").is_err());
    }
}
