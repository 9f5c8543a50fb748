//! Per-visitor like/dislike state.
//!
//! A visitor is identified by a random key kept in their session. The
//! stored state and the review's counters change together in one
//! transaction, serialized on the review row, so concurrent clicks from the
//! same visitor can never count twice.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use washboard_core::{Reaction, ReactionAction, ReviewId, UnknownReaction};

use super::RepositoryError;
use super::reviews::ReactionCounts;

/// Result of applying one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedReaction {
    pub previous: Reaction,
    pub state: Reaction,
    pub counts: ReactionCounts,
}

/// Repository for visitor reaction state.
pub struct ReactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReactionRepository<'a> {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every active reaction of one visitor, keyed by review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` for an unknown stored state.
    pub async fn states_for(
        &self,
        visitor: Uuid,
    ) -> Result<HashMap<ReviewId, Reaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, (ReviewId, String)>(
            "SELECT review_id, state FROM washboard.review_reaction WHERE visitor_key = $1",
        )
        .bind(visitor)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, state)| Ok((id, parse_state(&state)?)))
            .collect()
    }

    /// Count stored reactions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM washboard.review_reaction")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Apply a like/dislike click from `visitor` to review `id`.
    ///
    /// Locks the review row first, so clicks on the same review are applied
    /// one at a time and each one sees the state the previous one stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn apply(
        &self,
        visitor: Uuid,
        id: ReviewId,
        action: ReactionAction,
    ) -> Result<AppliedReaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, ReviewId>(
            "SELECT id FROM washboard.review WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let previous = match sqlx::query_scalar::<_, String>(
            r"
            SELECT state FROM washboard.review_reaction
            WHERE visitor_key = $1 AND review_id = $2
            ",
        )
        .bind(visitor)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(state) => parse_state(&state)?,
            None => Reaction::None,
        };

        let (state, delta) = previous.apply(action);

        if state == Reaction::None {
            sqlx::query(
                "DELETE FROM washboard.review_reaction WHERE visitor_key = $1 AND review_id = $2",
            )
            .bind(visitor)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r"
                INSERT INTO washboard.review_reaction (visitor_key, review_id, state)
                VALUES ($1, $2, $3)
                ON CONFLICT (visitor_key, review_id)
                DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()
                ",
            )
            .bind(visitor)
            .bind(id)
            .bind(state.as_str())
            .execute(&mut *tx)
            .await?;
        }

        let counts = sqlx::query_as::<_, ReactionCounts>(
            r"
            UPDATE washboard.review
            SET likes = GREATEST(likes + $2, 0),
                dislikes = GREATEST(dislikes + $3, 0)
            WHERE id = $1
            RETURNING likes, dislikes
            ",
        )
        .bind(id)
        .bind(delta.likes)
        .bind(delta.dislikes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AppliedReaction {
            previous,
            state,
            counts,
        })
    }
}

fn parse_state(state: &str) -> Result<Reaction, RepositoryError> {
    state
        .parse()
        .map_err(|e: UnknownReaction| RepositoryError::DataCorruption(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_accepts_stored_values() {
        assert_eq!(parse_state("liked").ok(), Some(Reaction::Liked));
        assert_eq!(parse_state("disliked").ok(), Some(Reaction::Disliked));
    }

    #[test]
    fn test_parse_state_flags_corruption() {
        assert!(matches!(
            parse_state("sideways"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
