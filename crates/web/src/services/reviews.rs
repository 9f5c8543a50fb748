//! Review authoring rules.
//!
//! Only a review's author may edit or delete it, and only the owner of the
//! reviewed shop may reply to it.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use washboard_core::{
    Reaction, ReactionAction, ReviewDraft, ReviewDraftError, ReviewEdit, ReviewId, ShopId,
    Username,
};

use crate::db::reviews::ReactionCounts;
use crate::db::{
    ReactionRepository, ReplyRepository, ReportRepository, RepositoryError, ReviewRepository,
    ShopOwnerRepository,
};
use crate::models::{Reply, Review};

/// Maximum reply length, in characters.
pub const MAX_REPLY_CHARS: usize = 2000;

/// Maximum report reason length, in characters.
pub const MAX_REPORT_REASON_CHARS: usize = 500;

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Submitted fields failed validation.
    #[error(transparent)]
    Invalid(#[from] ReviewDraftError),

    /// Reply text was blank or too long.
    #[error("reply must be between 1 and {MAX_REPLY_CHARS} characters")]
    InvalidReply,

    /// Report reason was too long.
    #[error("report reason must be at most {MAX_REPORT_REASON_CHARS} characters")]
    InvalidReport,

    /// The review does not exist.
    #[error("review not found")]
    NotFound,

    /// The user may not change this review.
    #[error("not allowed to modify this review")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ReviewError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Outcome of a like/dislike click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub previous: Reaction,
    pub state: Reaction,
    pub counts: ReactionCounts,
}

/// Outcome of reporting a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    /// False when this visitor had already reported the review.
    pub first_report: bool,
    /// Distinct reports against the review so far.
    pub reports: i64,
}

/// Review service.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
    replies: ReplyRepository<'a>,
    owners: ShopOwnerRepository<'a>,
    reactions: ReactionRepository<'a>,
    reports: ReportRepository<'a>,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
            replies: ReplyRepository::new(pool),
            owners: ShopOwnerRepository::new(pool),
            reactions: ReactionRepository::new(pool),
            reports: ReportRepository::new(pool),
        }
    }

    /// Validate and store a new review for `shop_id`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Invalid` if a field fails validation.
    #[instrument(skip(self, title, comment, image_url), fields(shop_id = %shop_id))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        author: &Username,
        title: &str,
        comment: &str,
        rating: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Review, ReviewError> {
        let draft = ReviewDraft::validate(title, comment, rating)?.with_image_url(image_url)?;
        let review = self.reviews.create(shop_id, author, &draft).await?;
        info!(review_id = %review.id, "Review created");
        Ok(review)
    }

    /// Replace the title and comment of `author`'s review.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Forbidden` if `author` didn't write the review.
    #[instrument(skip(self, title, comment), fields(review_id = %id))]
    pub async fn edit(
        &self,
        id: ReviewId,
        author: &Username,
        title: &str,
        comment: &str,
    ) -> Result<Review, ReviewError> {
        self.authored_by(id, author).await?;
        let edit = ReviewEdit::validate(title, comment)?;
        Ok(self.reviews.update_text(id, &edit).await?)
    }

    /// Delete `author`'s review together with its replies.
    ///
    /// Returns the deleted review so callers can redirect to its shop.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Forbidden` if `author` didn't write the review.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete(&self, id: ReviewId, author: &Username) -> Result<Review, ReviewError> {
        let review = self.authored_by(id, author).await?;
        if !self.reviews.delete(id).await? {
            return Err(ReviewError::NotFound);
        }
        info!("Review deleted");
        Ok(review)
    }

    /// Post a reply from the owner of the reviewed shop.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Forbidden` if `owner` doesn't own the shop.
    /// Returns `ReviewError::InvalidReply` for blank or oversized content.
    #[instrument(skip(self, content), fields(review_id = %id))]
    pub async fn reply(
        &self,
        id: ReviewId,
        owner: &Username,
        content: &str,
    ) -> Result<(Review, Reply), ReviewError> {
        let review = self.reviews.get(id).await?.ok_or(ReviewError::NotFound)?;

        let owns_shop = self
            .owners
            .get_by_username(owner)
            .await?
            .is_some_and(|o| o.shop_id == review.shop_id);
        if !owns_shop {
            return Err(ReviewError::Forbidden);
        }

        let content = validate_reply(content)?;
        let reply = self.replies.create(id, owner, content).await?;
        info!(reply_id = %reply.id, "Owner reply posted");
        Ok((review, reply))
    }

    /// Apply a like/dislike click from `visitor`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotFound` if the review doesn't exist.
    pub async fn react(
        &self,
        id: ReviewId,
        visitor: Uuid,
        action: ReactionAction,
    ) -> Result<ReactionOutcome, ReviewError> {
        let applied = self.reactions.apply(visitor, id, action).await?;
        Ok(ReactionOutcome {
            previous: applied.previous,
            state: applied.state,
            counts: applied.counts,
        })
    }

    /// Flag a review for moderation on behalf of `visitor`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotFound` if the review doesn't exist.
    /// Returns `ReviewError::InvalidReport` for an oversized reason.
    #[instrument(skip(self, reason), fields(review_id = %id))]
    pub async fn report(
        &self,
        id: ReviewId,
        visitor: Uuid,
        reporter: Option<&Username>,
        reason: &str,
    ) -> Result<ReportOutcome, ReviewError> {
        let reason = validate_report_reason(reason)?;
        let first_report = self.reports.create(visitor, id, reporter, reason).await?;
        let reports = self.reports.count_for_review(id).await?;
        if first_report {
            info!(reports, "Review reported");
        }
        Ok(ReportOutcome {
            first_report,
            reports,
        })
    }

    async fn authored_by(&self, id: ReviewId, author: &Username) -> Result<Review, ReviewError> {
        let review = self.reviews.get(id).await?.ok_or(ReviewError::NotFound)?;
        if &review.username != author {
            return Err(ReviewError::Forbidden);
        }
        Ok(review)
    }
}

fn validate_reply(content: &str) -> Result<&str, ReviewError> {
    let content = content.trim();
    let len = content.chars().count();
    if len == 0 || len > MAX_REPLY_CHARS {
        return Err(ReviewError::InvalidReply);
    }
    Ok(content)
}

fn validate_report_reason(reason: &str) -> Result<&str, ReviewError> {
    let reason = reason.trim();
    if reason.chars().count() > MAX_REPORT_REASON_CHARS {
        return Err(ReviewError::InvalidReport);
    }
    Ok(reason)
}
