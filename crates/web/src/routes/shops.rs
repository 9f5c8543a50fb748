//! Shop page route handlers.
//!
//! Every shop is served by one parameterized route, `/{slug}`. The same
//! route also carries the legacy prefixed profile URLs
//! (`/view_other_profile_{username}` and
//! `/establishment_owner_response_{username}`), which [`PageSlug`] tells
//! apart before any lookup happens.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use washboard_core::Username;

use crate::db::{ReplyRepository, ReviewRepository, ShopOwnerRepository, ShopRepository};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, LaundryShop, ShopOwner};
use crate::routes::views::{
    PageMeta, ReviewView, average_rating, replies_by_review, review_views,
};
use crate::routes::{MessageQuery, owner, profile, redirect_with_error};
use crate::services::reviews::{ReviewError, ReviewService};
use crate::state::AppState;

const OTHER_PROFILE_PREFIX: &str = "view_other_profile_";
const OWNER_RESPONSE_PREFIX: &str = "establishment_owner_response_";

/// What a single-segment path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlug<'a> {
    /// `/view_other_profile_{username}`
    OtherProfile(&'a str),
    /// `/establishment_owner_response_{username}`
    OwnerResponse(&'a str),
    /// `/{slug}` of a laundry shop.
    Shop(&'a str),
}

impl<'a> PageSlug<'a> {
    /// Classify a path segment. A prefix with nothing after it is treated
    /// as a shop slug and will not match any shop.
    #[must_use]
    pub fn parse(slug: &'a str) -> Self {
        if let Some(username) = slug
            .strip_prefix(OTHER_PROFILE_PREFIX)
            .filter(|u| !u.is_empty())
        {
            return Self::OtherProfile(username);
        }
        if let Some(username) = slug
            .strip_prefix(OWNER_RESPONSE_PREFIX)
            .filter(|u| !u.is_empty())
        {
            return Self::OwnerResponse(username);
        }
        Self::Shop(slug)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Shop page with its reviews and the review composer.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub shop: LaundryShop,
    pub owner: Option<ShopOwner>,
    pub reviews: Vec<ReviewView>,
    pub review_count: usize,
    pub average_rating: Option<String>,
    /// Composer validation message from the last submission.
    pub error: Option<String>,
}

/// Review composer form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    /// Selected star radio button; absent when none is selected.
    pub rate: Option<String>,
    /// Optional link to a photo.
    pub image_url: Option<String>,
}

/// Visitor-facing text for a composer error code.
fn composer_error_message(code: &str) -> String {
    use washboard_core::{RatingError, ReviewDraft, ReviewDraftError};

    let error = match code {
        "missing_title" => ReviewDraftError::MissingTitle,
        "missing_comment" => ReviewDraftError::MissingComment,
        "missing_rating" => ReviewDraftError::MissingRating,
        "invalid_rating" => ReviewDraftError::InvalidRating(RatingError::NotANumber),
        "title_too_long" => ReviewDraftError::TitleTooLong {
            max: ReviewDraft::MAX_TITLE_CHARS,
        },
        "comment_too_long" => ReviewDraftError::CommentTooLong {
            max: ReviewDraft::MAX_COMMENT_CHARS,
        },
        "invalid_image_url" => ReviewDraftError::InvalidImageUrl,
        _ => return "Something went wrong. Please try again.".to_string(),
    };
    error.to_string()
}

// =============================================================================
// Handlers
// =============================================================================

/// Serve `/{slug}`: a shop page or one of the prefixed profile pages.
#[instrument(skip(state, session, current_user, query))]
pub async fn page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
    Path(slug): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let error = query.error.as_deref();
    match PageSlug::parse(&slug) {
        PageSlug::OtherProfile(username) => {
            let username = parse_path_username(username)?;
            profile::view_other_profile(&state, &session, current_user, username).await
        }
        PageSlug::OwnerResponse(username) => {
            let username = parse_path_username(username)?;
            owner::owner_response(&state, &session, current_user, username, error).await
        }
        PageSlug::Shop(slug) => shop_page(&state, &session, current_user, slug, error).await,
    }
}

fn parse_path_username(raw: &str) -> Result<Username, AppError> {
    Username::parse(raw).map_err(|_| AppError::NotFound(format!("user {raw}")))
}

/// Render a shop with exactly the reviews that reference it.
async fn shop_page(
    state: &AppState,
    session: &Session,
    current_user: Option<CurrentUser>,
    slug: &str,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let pool = state.pool();
    let shop = ShopRepository::new(pool)
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {slug}")))?;

    let reviews = ReviewRepository::new(pool).list_for_shop(shop.id).await?;
    let owner = ShopOwnerRepository::new(pool).get_by_shop(shop.id).await?;
    let mut thread = replies_by_review(ReplyRepository::new(pool).list_for_shop(shop.id).await?);

    let viewer = current_user.as_ref().map(|u| &u.username);
    let reviews: Vec<ReviewView> = review_views(pool, session, reviews, viewer)
        .await?
        .into_iter()
        .map(|r| {
            let replies = thread.remove(&r.id).unwrap_or_default();
            r.with_replies(replies)
        })
        .collect();

    Ok(ShopTemplate {
        meta: PageMeta::new(shop.name.clone(), "style").with_script("reviews"),
        current_user,
        owner,
        review_count: reviews.len(),
        average_rating: average_rating(&reviews),
        reviews,
        error: error.map(composer_error_message),
        shop,
    }
    .into_response())
}

/// Publish a review for the shop at `/{slug}`.
///
/// Validation failures redirect back to the composer with an error code.
#[instrument(skip(state, form), fields(username = %user.username))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    let shop = ShopRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {slug}")))?;

    let shop_path = format!("/{}", shop.slug);
    match ReviewService::new(state.pool())
        .create(
            shop.id,
            &user.username,
            &form.title,
            &form.comment,
            form.rate.as_deref(),
            form.image_url.as_deref(),
        )
        .await
    {
        Ok(review) => {
            add_breadcrumb("review", "Posted review", Some(&[("shop", shop.slug.as_str())]));
            Ok(Redirect::to(&format!("{shop_path}#review-{}", review.id)).into_response())
        }
        Err(ReviewError::Invalid(e)) => {
            tracing::info!(reason = e.code(), "Review rejected");
            Ok(redirect_with_error(&shop_path, e.code()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shop_slug() {
        assert_eq!(PageSlug::parse("Weclean"), PageSlug::Shop("Weclean"));
        assert_eq!(
            PageSlug::parse("NonstopLaundryShopMalate"),
            PageSlug::Shop("NonstopLaundryShopMalate")
        );
    }

    #[test]
    fn test_parse_other_profile() {
        assert_eq!(
            PageSlug::parse("view_other_profile_althea"),
            PageSlug::OtherProfile("althea")
        );
    }

    #[test]
    fn test_parse_owner_response() {
        assert_eq!(
            PageSlug::parse("establishment_owner_response_weclean_owner"),
            PageSlug::OwnerResponse("weclean_owner")
        );
    }

    #[test]
    fn test_bare_prefix_is_a_shop_slug() {
        assert_eq!(
            PageSlug::parse("view_other_profile_"),
            PageSlug::Shop("view_other_profile_")
        );
    }

    #[test]
    fn test_composer_messages_match_validation() {
        assert_eq!(
            composer_error_message("missing_title"),
            "Please enter a title for your review."
        );
        assert_eq!(
            composer_error_message("missing_comment"),
            "Please enter a comment for your review."
        );
        assert_eq!(
            composer_error_message("missing_rating"),
            "Please select a rating for your review."
        );
        assert_eq!(
            composer_error_message("invalid_rating"),
            "Rating must be between 1 and 5 stars."
        );
        assert_eq!(
            composer_error_message("invalid_image_url"),
            "Image links must start with https:// or http://."
        );
    }
}
