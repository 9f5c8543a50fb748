//! Laundry shop repository.

use sqlx::{PgExecutor, PgPool};

use washboard_core::ShopId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::LaundryShop;

const SHOP_COLUMNS: &str = "id, slug, name, address, description, image_url, phone, opening_hours";

/// Fields for a new shop listing.
#[derive(Debug, Clone)]
pub struct NewShop<'s> {
    pub slug: &'s str,
    pub name: &'s str,
    pub address: &'s str,
    pub description: &'s str,
    pub image_url: Option<&'s str>,
    pub phone: Option<&'s str>,
    pub opening_hours: Option<&'s str>,
}

/// Repository for laundry shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every shop ordered by display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<LaundryShop>, RepositoryError> {
        let shops = sqlx::query_as::<_, LaundryShop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM washboard.laundry_shop ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }

    /// Shops whose display name contains `query`, ignoring case.
    ///
    /// An empty query matches every shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<LaundryShop>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let shops = sqlx::query_as::<_, LaundryShop>(&format!(
            r"
            SELECT {SHOP_COLUMNS}
            FROM washboard.laundry_shop
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY name, id
            "
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }

    /// Get a shop by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<LaundryShop>, RepositoryError> {
        let shop = sqlx::query_as::<_, LaundryShop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM washboard.laundry_shop WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// Get a shop by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ShopId) -> Result<Option<LaundryShop>, RepositoryError> {
        let shop = sqlx::query_as::<_, LaundryShop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM washboard.laundry_shop WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// Insert a shop listing.
    ///
    /// Runs on `executor`, so the sample import can share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug or name is taken.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        shop: &NewShop<'_>,
    ) -> Result<LaundryShop, RepositoryError> {
        sqlx::query_as::<_, LaundryShop>(&format!(
            r"
            INSERT INTO washboard.laundry_shop
                (slug, name, address, description, image_url, phone, opening_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(shop.slug)
        .bind(shop.name)
        .bind(shop.address)
        .bind(shop.description)
        .bind(shop.image_url)
        .bind(shop.phone)
        .bind(shop.opening_hours)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "shop"))
    }

    /// Count shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.laundry_shop")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text_unchanged() {
        assert_eq!(escape_like("Weclean"), "Weclean");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
