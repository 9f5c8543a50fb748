//! User account repository.

use sqlx::{PgExecutor, PgPool};

use washboard_core::Username;

use super::{RepositoryError, conflict_on_unique};
use crate::models::UserAccount;

/// Repository for user account database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct AccountWithHash {
    #[sqlx(flatten)]
    account: UserAccount,
    password_hash: String,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(UserAccount, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHash>(
            r"
            SELECT id, username, created_at, password_hash
            FROM washboard.user_account
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.account, r.password_hash)))
    }

    /// Create an account and an empty profile for it in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<UserAccount, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, UserAccount>(
            r"
            INSERT INTO washboard.user_account (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        sqlx::query(
            r"
            INSERT INTO washboard.profile (username, display_name)
            VALUES ($1, $1)
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(username)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(account)
    }

    /// Insert an account without creating a profile (sample data import).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        username: &Username,
        password_hash: &str,
    ) -> Result<UserAccount, RepositoryError> {
        sqlx::query_as::<_, UserAccount>(
            r"
            INSERT INTO washboard.user_account (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))
    }

    /// Count accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.user_account")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
