//! Validation for submitted and edited reviews.

use crate::types::rating::{Rating, RatingError};

/// Reasons a review submission is rejected.
///
/// The messages are shown to the visitor as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewDraftError {
    #[error("Please enter a title for your review.")]
    MissingTitle,
    #[error("Please enter a comment for your review.")]
    MissingComment,
    #[error("Please select a rating for your review.")]
    MissingRating,
    #[error("Rating must be between 1 and 5 stars.")]
    InvalidRating(#[source] RatingError),
    #[error("Review title must be at most {max} characters.")]
    TitleTooLong { max: usize },
    #[error("Review comment must be at most {max} characters.")]
    CommentTooLong { max: usize },
    #[error("Image links must start with https:// or http://.")]
    InvalidImageUrl,
}

impl ReviewDraftError {
    /// Short code used in redirect query strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::MissingComment => "missing_comment",
            Self::MissingRating => "missing_rating",
            Self::InvalidRating(_) => "invalid_rating",
            Self::TitleTooLong { .. } => "title_too_long",
            Self::CommentTooLong { .. } => "comment_too_long",
            Self::InvalidImageUrl => "invalid_image_url",
        }
    }
}

/// A validated new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub title: String,
    pub comment: String,
    pub rating: Rating,
    /// Link to a photo shown under the review.
    pub image_url: Option<String>,
}

/// A validated edit of an existing review's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEdit {
    pub title: String,
    pub comment: String,
}

impl ReviewDraft {
    /// Longest accepted title, in characters.
    pub const MAX_TITLE_CHARS: usize = 120;
    /// Longest accepted comment, in characters.
    pub const MAX_COMMENT_CHARS: usize = 5000;
    /// Longest accepted image link, in characters.
    pub const MAX_IMAGE_URL_CHARS: usize = 2048;

    /// Validate raw form input.
    ///
    /// Checks run in form order (title, comment, rating) and the first
    /// failure is reported. Title and comment are trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first `ReviewDraftError` encountered.
    pub fn validate(
        title: &str,
        comment: &str,
        rating: Option<&str>,
    ) -> Result<Self, ReviewDraftError> {
        let ReviewEdit { title, comment } = ReviewEdit::validate(title, comment)?;

        let rating = match rating.map(str::trim) {
            None | Some("") => return Err(ReviewDraftError::MissingRating),
            Some(raw) => Rating::parse(raw).map_err(ReviewDraftError::InvalidRating)?,
        };

        Ok(Self {
            title,
            comment,
            rating,
            image_url: None,
        })
    }

    /// Attach an image link. Blank input attaches nothing.
    ///
    /// Accepts absolute `http`/`https` links and site-relative paths.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImageUrl` for any other scheme, an oversized link, or
    /// a link containing whitespace or markup characters.
    pub fn with_image_url(mut self, raw: Option<&str>) -> Result<Self, ReviewDraftError> {
        let Some(url) = raw.map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(self);
        };

        let site_relative = url.starts_with('/') && !url.starts_with("//");
        let absolute = ["https://", "http://"]
            .iter()
            .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme));
        let clean = !url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'));

        if !(site_relative || absolute)
            || !clean
            || url.chars().count() > Self::MAX_IMAGE_URL_CHARS
        {
            return Err(ReviewDraftError::InvalidImageUrl);
        }

        self.image_url = Some(url.to_owned());
        Ok(self)
    }
}

impl ReviewEdit {
    /// Validate an edited title and comment.
    ///
    /// # Errors
    ///
    /// Returns `MissingTitle`/`MissingComment` for blank input and the
    /// `TooLong` variants when a field exceeds its limit.
    pub fn validate(title: &str, comment: &str) -> Result<Self, ReviewDraftError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ReviewDraftError::MissingTitle);
        }
        if title.chars().count() > ReviewDraft::MAX_TITLE_CHARS {
            return Err(ReviewDraftError::TitleTooLong {
                max: ReviewDraft::MAX_TITLE_CHARS,
            });
        }

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ReviewDraftError::MissingComment);
        }
        if comment.chars().count() > ReviewDraft::MAX_COMMENT_CHARS {
            return Err(ReviewDraftError::CommentTooLong {
                max: ReviewDraft::MAX_COMMENT_CHARS,
            });
        }

        Ok(Self {
            title: title.to_owned(),
            comment: comment.to_owned(),
        })
    }
}
