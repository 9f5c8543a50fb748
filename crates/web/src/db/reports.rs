//! Review report repository.

use sqlx::PgPool;
use uuid::Uuid;

use washboard_core::{ReviewId, Username};

use super::RepositoryError;

/// Repository for visitor reports on reviews.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a report from `visitor`. Repeat reports are ignored.
    ///
    /// # Returns
    ///
    /// Returns `true` if this is the visitor's first report of the review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn create(
        &self,
        visitor: Uuid,
        review_id: ReviewId,
        username: Option<&Username>,
        reason: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO washboard.review_report (visitor_key, review_id, username, reason)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (visitor_key, review_id) DO NOTHING
            ",
        )
        .bind(visitor)
        .bind(review_id)
        .bind(username)
        .bind(reason)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of distinct reports against a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_review(&self, review_id: ReviewId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM washboard.review_report WHERE review_id = $1",
        )
        .bind(review_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Count reports.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.review_report")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
