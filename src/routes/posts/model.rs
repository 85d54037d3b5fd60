use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::FieldError;
use crate::pagination::PageMeta;

/// Minimum post length, counted in characters after trimming.
pub const MIN_TEXT_CHARS: usize = 10;

/// A post as rendered in feeds and detail views: author and group are
/// already resolved to their display fields.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PostInfo {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CommentInfo {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// One rendered feed page. This is the unit the feed cache stores.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedPage {
    pub posts: Vec<PostInfo>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostInfo,
    pub comments: Vec<CommentInfo>,
}

pub fn validate_post_text(text: &str) -> Result<String, FieldError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(FieldError::new(
            "text",
            format!("Post text must be at least {} characters", MIN_TEXT_CHARS),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_comment_text(text: &str) -> Result<String, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("text", "Comment text must not be empty"));
    }
    Ok(trimmed.to_string())
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author,
           p.group_id, g.slug AS group_slug, g.title AS group_title, p.image
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const POST_ORDER: &str = " ORDER BY p.pub_date DESC, p.id DESC LIMIT $1 OFFSET $2";

impl PostInfo {
    pub async fn page_global(
        pool: &PgPool,
        page_size: u32,
        requested: i64,
    ) -> Result<FeedPage, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;
        let meta = PageMeta::compute(requested, total, page_size);

        let posts = sqlx::query_as::<_, PostInfo>(&format!("{}{}", POST_SELECT, POST_ORDER))
            .bind(meta.limit())
            .bind(meta.offset())
            .fetch_all(pool)
            .await?;

        Ok(FeedPage { posts, meta })
    }

    pub async fn page_by_group(
        pool: &PgPool,
        group_id: i64,
        page_size: u32,
        requested: i64,
    ) -> Result<FeedPage, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(pool)
            .await?;
        let meta = PageMeta::compute(requested, total, page_size);

        let posts = sqlx::query_as::<_, PostInfo>(&format!(
            "{} WHERE p.group_id = $3{}",
            POST_SELECT, POST_ORDER
        ))
        .bind(meta.limit())
        .bind(meta.offset())
        .bind(group_id)
        .fetch_all(pool)
        .await?;

        Ok(FeedPage { posts, meta })
    }

    pub async fn page_by_author(
        pool: &PgPool,
        author_id: Uuid,
        page_size: u32,
        requested: i64,
    ) -> Result<FeedPage, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await?;
        let meta = PageMeta::compute(requested, total, page_size);

        let posts = sqlx::query_as::<_, PostInfo>(&format!(
            "{} WHERE p.author_id = $3{}",
            POST_SELECT, POST_ORDER
        ))
        .bind(meta.limit())
        .bind(meta.offset())
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(FeedPage { posts, meta })
    }

    /// Posts by every author the viewer follows.
    pub async fn page_followed(
        pool: &PgPool,
        viewer: Uuid,
        page_size: u32,
        requested: i64,
    ) -> Result<FeedPage, sqlx::Error> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE author_id IN (SELECT author_id FROM follows WHERE user_id = $1)
            "#,
        )
        .bind(viewer)
        .fetch_one(pool)
        .await?;
        let meta = PageMeta::compute(requested, total, page_size);

        let posts = sqlx::query_as::<_, PostInfo>(&format!(
            "{} WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = $3){}",
            POST_SELECT, POST_ORDER
        ))
        .bind(meta.limit())
        .bind(meta.offset())
        .bind(viewer)
        .fetch_all(pool)
        .await?;

        Ok(FeedPage { posts, meta })
    }

    pub async fn find(pool: &PgPool, post_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PostInfo>(&format!("{} WHERE p.id = $1", POST_SELECT))
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// Inserts the post with a server-assigned `pub_date` and returns it in
    /// rendered form.
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        text: &str,
        group_id: Option<i64>,
        image: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let post_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (text, pub_date, author_id, group_id, image)
            VALUES ($1, NOW(), $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(text)
        .bind(author_id)
        .bind(group_id)
        .bind(image)
        .fetch_one(pool)
        .await?;

        Self::find(pool, post_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Rewrites the mutable fields. `pub_date` is never touched.
    pub async fn update(
        pool: &PgPool,
        post_id: i64,
        text: &str,
        group_id: Option<i64>,
        image: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3, image = $4
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(text)
        .bind(group_id)
        .bind(image)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Comments go with the post (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, post_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

impl CommentInfo {
    pub async fn list_for_post(pool: &PgPool, post_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentInfo>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author, c.text, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        post_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CommentInfo>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, text, created)
                VALUES ($1, $2, $3, NOW())
                RETURNING id, post_id, author_id, text, created
            )
            SELECT i.id, i.post_id, i.author_id, u.username AS author, i.text, i.created
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_post_text_is_rejected() {
        assert!(validate_post_text("too short").is_err());
        assert!(validate_post_text("").is_err());
        // nine characters padded with whitespace still fails
        assert!(validate_post_text("  123456789  ").is_err());
    }

    #[test]
    fn ten_chars_after_trim_pass() {
        assert_eq!(validate_post_text(" 1234567890 ").unwrap(), "1234567890");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 11 cyrillic characters, far more than 10 bytes either way
        assert!(validate_post_text("Текст поста").is_ok());
        // 9 characters but 17 bytes in UTF-8
        assert!(validate_post_text("Коротко и").is_err());
    }

    #[test]
    fn comment_text_must_be_non_empty() {
        assert!(validate_comment_text("   ").is_err());
        assert_eq!(validate_comment_text(" ok ").unwrap(), "ok");
    }
}
