use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Directed follow edge. The `(user_id, author_id)` pair is unique at the
/// storage level, so concurrent follow requests cannot produce duplicates.
pub struct Follow;

/// A user never follows themselves; such a request is silently skipped.
pub fn is_self_follow(user_id: Uuid, author_id: Uuid) -> bool {
    user_id == author_id
}

/// Unfollowing an edge that does not exist is an error, not a silent
/// success.
pub fn unfollow_outcome(removed: bool) -> Result<(), AppError> {
    if removed {
        Ok(())
    } else {
        Err(AppError::NotFound("Follow edge not found"))
    }
}

impl Follow {
    /// Idempotent: following someone already followed changes nothing.
    pub async fn create(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Returns whether an edge was actually removed.
    pub async fn delete(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE user_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_yourself_is_never_an_edge() {
        let user = Uuid::new_v4();
        assert!(is_self_follow(user, user));
        assert!(!is_self_follow(user, Uuid::new_v4()));
    }

    #[test]
    fn unfollow_without_an_edge_is_not_found() {
        let err = unfollow_outcome(false).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn unfollow_of_an_existing_edge_succeeds() {
        assert!(unfollow_outcome(true).is_ok());
    }
}
