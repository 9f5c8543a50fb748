//! Shop owner repository.

use sqlx::{PgExecutor, PgPool};

use washboard_core::{ShopId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::ShopOwner;

/// Repository for shop owner database operations.
pub struct ShopOwnerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopOwnerRepository<'a> {
    /// Create a new shop owner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an owner by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<ShopOwner>, RepositoryError> {
        let owner = sqlx::query_as::<_, ShopOwner>(
            r"
            SELECT id, username, shop_id, display_name, bio, avatar_url
            FROM washboard.shop_owner
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner)
    }

    /// Get the owner of a shop, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_shop(&self, shop_id: ShopId) -> Result<Option<ShopOwner>, RepositoryError> {
        let owner = sqlx::query_as::<_, ShopOwner>(
            r"
            SELECT id, username, shop_id, display_name, bio, avatar_url
            FROM washboard.shop_owner
            WHERE shop_id = $1
            ",
        )
        .bind(shop_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner)
    }

    /// Insert an owner profile (sample data import).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already an owner.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        username: &Username,
        shop_id: ShopId,
        display_name: &str,
        bio: &str,
        avatar_url: Option<&str>,
    ) -> Result<ShopOwner, RepositoryError> {
        sqlx::query_as::<_, ShopOwner>(
            r"
            INSERT INTO washboard.shop_owner (username, shop_id, display_name, bio, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, shop_id, display_name, bio, avatar_url
            ",
        )
        .bind(username)
        .bind(shop_id)
        .bind(display_name)
        .bind(bio)
        .bind(avatar_url)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "shop owner"))
    }

    /// Count owners.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.shop_owner")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
