//! Star ratings and their HTML rendering.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Markup for a single star icon.
pub const STAR_ICON: &str = r#"<img src="/static/image/star.png" alt="" class="starsImg">"#;

/// Errors that can occur when parsing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The input is not an integer.
    #[error("rating must be a whole number")]
    NotANumber,
    /// The input is outside `1..=5`.
    #[error("rating must be between {min} and {max} stars (got {value})")]
    OutOfRange {
        /// Parsed value.
        value: i64,
        /// Smallest allowed rating.
        min: i32,
        /// Largest allowed rating.
        max: i32,
    },
}

/// A review rating from one to five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    /// Lowest rating.
    pub const MIN: i32 = 1;
    /// Highest rating.
    pub const MAX: i32 = 5;

    /// Create a rating from an integer.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` unless `1 <= value <= 5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            // Range checked above
            #[allow(clippy::cast_possible_truncation)]
            Ok(Self(value as i32))
        } else {
            Err(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Parse a rating from form input such as `"4"`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::NotANumber` for non-integer input and
    /// `RatingError::OutOfRange` for integers outside `1..=5`.
    pub fn parse(s: &str) -> Result<Self, RatingError> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| RatingError::NotANumber)?;
        Self::new(value)
    }

    /// Get the number of stars.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render `rating` star icons, one [`STAR_ICON`] per point.
///
/// Zero or negative input renders nothing. This is a formatting helper and
/// does not enforce the `1..=5` range; stored ratings go through [`Rating`].
#[must_use]
pub fn stars(rating: i64) -> String {
    let count = usize::try_from(rating).unwrap_or(0);
    STAR_ICON.repeat(count)
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
