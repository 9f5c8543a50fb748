//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use washboard_core::{Rating, ReviewDraft, ReviewEdit, ReviewId, ShopId, Username};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_COLUMNS: &str = "id, shop_id, username, rating, title, comment, image_url, \
                              likes, dislikes, created_at, updated_at";

/// A review row as it appears in the sample data.
#[derive(Debug, Clone)]
pub struct ImportedReview<'r> {
    pub shop_id: ShopId,
    pub username: &'r Username,
    pub rating: Rating,
    pub title: &'r str,
    pub comment: &'r str,
    pub image_url: Option<&'r str>,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: Option<DateTime<Utc>>,
}

/// Counter totals after a reaction update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ReactionCounts {
    pub likes: i32,
    pub dislikes: i32,
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every review of a shop, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_shop(&self, shop_id: ShopId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM washboard.review
            WHERE shop_id = $1
            ORDER BY created_at, id
            "
        ))
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Every review written by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_username(
        &self,
        username: &Username,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM washboard.review
            WHERE username = $1
            ORDER BY created_at, id
            "
        ))
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM washboard.review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Store a validated review written by `username`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        shop_id: ShopId,
        username: &Username,
        draft: &ReviewDraft,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r"
            INSERT INTO washboard.review (shop_id, username, rating, title, comment, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(username)
        .bind(draft.rating)
        .bind(&draft.title)
        .bind(&draft.comment)
        .bind(draft.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(review)
    }

    /// Insert a review from sample data, keeping its counters and date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        review: &ImportedReview<'_>,
    ) -> Result<Review, RepositoryError> {
        let created = sqlx::query_as::<_, Review>(&format!(
            r"
            INSERT INTO washboard.review
                (shop_id, username, rating, title, comment, image_url, likes, dislikes,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    COALESCE($9, NOW()), COALESCE($9, NOW()))
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review.shop_id)
        .bind(review.username)
        .bind(review.rating)
        .bind(review.title)
        .bind(review.comment)
        .bind(review.image_url)
        .bind(review.likes)
        .bind(review.dislikes)
        .bind(review.created_at)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }

    /// Replace a review's title and comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn update_text(
        &self,
        id: ReviewId,
        edit: &ReviewEdit,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            r"
            UPDATE washboard.review
            SET title = $2, comment = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&edit.title)
        .bind(&edit.comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a review. Its replies are removed by the foreign key cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the review was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM washboard.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.review")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
