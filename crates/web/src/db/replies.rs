//! Reply repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use washboard_core::{ReviewId, ShopId, Username};

use super::RepositoryError;
use crate::models::Reply;

/// Repository for reply database operations.
pub struct ReplyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReplyRepository<'a> {
    /// Create a new reply repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every reply written by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_username(
        &self,
        username: &Username,
    ) -> Result<Vec<Reply>, RepositoryError> {
        let replies = sqlx::query_as::<_, Reply>(
            r"
            SELECT id, review_id, username, content, created_at
            FROM washboard.reply
            WHERE username = $1
            ORDER BY created_at, id
            ",
        )
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        Ok(replies)
    }

    /// Every reply under any review of a shop, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_shop(&self, shop_id: ShopId) -> Result<Vec<Reply>, RepositoryError> {
        let replies = sqlx::query_as::<_, Reply>(
            r"
            SELECT r.id, r.review_id, r.username, r.content, r.created_at
            FROM washboard.reply r
            JOIN washboard.review v ON v.id = r.review_id
            WHERE v.shop_id = $1
            ORDER BY r.created_at, r.id
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(replies)
    }

    /// Post a reply under a review, dated now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        review_id: ReviewId,
        username: &Username,
        content: &str,
    ) -> Result<Reply, RepositoryError> {
        Self::insert(self.pool, review_id, username, content, None).await
    }

    /// Insert a reply on `executor`. `created_at` defaults to now when `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        review_id: ReviewId,
        username: &Username,
        content: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Reply, RepositoryError> {
        sqlx::query_as::<_, Reply>(
            r"
            INSERT INTO washboard.reply (review_id, username, content, created_at)
            VALUES ($1, $2, $3, COALESCE($4, NOW()))
            RETURNING id, review_id, username, content, created_at
            ",
        )
        .bind(review_id)
        .bind(username)
        .bind(content)
        .bind(created_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })
    }

    /// Count replies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.reply")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
