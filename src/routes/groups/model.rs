use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, FieldError};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct GroupInfo {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupInfo {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

pub fn validate_slug(slug: &str) -> Result<(), FieldError> {
    if slug.is_empty() {
        return Err(FieldError::new("slug", "Slug must not be empty"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FieldError::new(
            "slug",
            "Only ASCII letters, digits, hyphens and underscores are allowed",
        ));
    }
    Ok(())
}

impl Group {
    pub async fn create(
        pool: &PgPool,
        req: &CreateGroupRequest,
        created_by: Uuid,
    ) -> Result<Self, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, slug, description, created_by
            "#,
        )
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.description)
        .bind(created_by)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists("Slug is taken")
            }
            _ => AppError::from(e),
        })
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, created_by
            FROM groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, group_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1)")
            .bind(group_id)
            .fetch_one(pool)
            .await
    }

    /// Posts keep living when their group goes away; the foreign key is
    /// declared `ON DELETE SET NULL`, so this only clears their group link.
    pub async fn delete(pool: &PgPool, group_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_must_be_url_safe() {
        assert!(validate_slug("test-slug").is_ok());
        assert!(validate_slug("slug_2024").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("группа").is_err());
    }
}
