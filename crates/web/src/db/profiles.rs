//! Profile repository.

use sqlx::{PgExecutor, PgPool};

use washboard_core::Username;

use super::{RepositoryError, conflict_on_unique};
use crate::models::Profile;

const PROFILE_COLUMNS: &str =
    "id, username, display_name, bio, avatar_url, location, created_at, updated_at";

/// Editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile for a username, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM washboard.profile WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    /// Create or replace the editable fields of a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        username: &Username,
        fields: &ProfileFields,
    ) -> Result<Profile, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r"
            INSERT INTO washboard.profile (username, display_name, bio, avatar_url, location)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                bio = EXCLUDED.bio,
                avatar_url = EXCLUDED.avatar_url,
                location = EXCLUDED.location,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(username)
        .bind(&fields.display_name)
        .bind(&fields.bio)
        .bind(fields.avatar_url.as_deref())
        .bind(fields.location.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(profile)
    }

    /// Insert a new profile (sample data import).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already has a profile.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        username: &Username,
        fields: &ProfileFields,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(&format!(
            r"
            INSERT INTO washboard.profile (username, display_name, bio, avatar_url, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(username)
        .bind(&fields.display_name)
        .bind(&fields.bio)
        .bind(fields.avatar_url.as_deref())
        .bind(fields.location.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "profile"))
    }

    /// Count profiles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.profile")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
