//! Shop owner route handlers.
//!
//! The owner response page at `/establishment_owner_response_{username}`
//! lists the owner's shop reviews and the replies they have posted. When
//! the owner is the one viewing, each review gets a reply form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use washboard_core::{ReviewId, Username};

use crate::db::{ReplyRepository, ReviewRepository, ShopOwnerRepository, ShopRepository};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, ShopOwner};
use crate::routes::redirect_with_error;
use crate::routes::views::{
    PageMeta, ReplyView, ReviewView, ShopLink, replies_by_review, review_views,
};
use crate::services::reviews::{ReviewError, ReviewService};
use crate::state::AppState;

/// Owner response page.
#[derive(Template, WebTemplate)]
#[template(path = "establishment_owner_response.html")]
pub struct OwnerResponseTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub username: Username,
    /// `None` renders a placeholder.
    pub owner_profile: Option<ShopOwner>,
    pub shop: Option<ShopLink>,
    /// Reviews of the owner's shop, each with its replies.
    pub reviews: Vec<ReviewView>,
    /// Replies written by the owner.
    pub replies: Vec<ReplyView>,
    /// The viewer is this owner and may reply.
    pub can_reply: bool,
    pub error: Option<&'static str>,
}

/// Reply form data.
#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub content: String,
}

fn owner_page_path(username: &Username) -> String {
    format!("/establishment_owner_response_{username}")
}

fn reply_error_message(code: &str) -> &'static str {
    match code {
        "invalid_reply" => "Replies must be between 1 and 2000 characters.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Display an owner's profile, their shop's reviews and their replies.
#[instrument(skip(state, session, current_user), fields(username = %username))]
pub async fn owner_response(
    state: &AppState,
    session: &Session,
    current_user: Option<CurrentUser>,
    username: Username,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let pool = state.pool();
    let owner_profile = ShopOwnerRepository::new(pool)
        .get_by_username(&username)
        .await?;
    let replies = ReplyRepository::new(pool)
        .list_by_username(&username)
        .await?;

    let (shop, reviews) = match &owner_profile {
        Some(owner) => {
            let shop = ShopRepository::new(pool).get_by_id(owner.shop_id).await?;
            let reviews = ReviewRepository::new(pool)
                .list_for_shop(owner.shop_id)
                .await?;
            let mut thread = replies_by_review(
                ReplyRepository::new(pool)
                    .list_for_shop(owner.shop_id)
                    .await?,
            );

            let viewer = current_user.as_ref().map(|u| &u.username);
            let reviews = review_views(pool, session, reviews, viewer)
                .await?
                .into_iter()
                .map(|r| {
                    let replies = thread.remove(&r.id).unwrap_or_default();
                    r.with_replies(replies)
                })
                .collect();
            (shop.as_ref().map(ShopLink::from), reviews)
        }
        None => (None, Vec::new()),
    };

    let can_reply = owner_profile.is_some()
        && current_user
            .as_ref()
            .is_some_and(|u| u.username == username);

    Ok(OwnerResponseTemplate {
        meta: PageMeta::new("Establishment Owner Response Page", "establishment_owner_response")
            .with_script("reviews"),
        current_user,
        owner_profile,
        shop,
        reviews,
        replies: replies.into_iter().map(ReplyView::from).collect(),
        can_reply,
        error: error.map(reply_error_message),
        username,
    }
    .into_response())
}

/// Post an owner reply under a review of their shop.
#[instrument(skip(state, form), fields(username = %user.username))]
pub async fn post_reply(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(review_id): Path<ReviewId>,
    Form(form): Form<ReplyForm>,
) -> Result<Response, AppError> {
    let back = owner_page_path(&user.username);

    match ReviewService::new(state.pool())
        .reply(review_id, &user.username, &form.content)
        .await
    {
        Ok(_) => {
            add_breadcrumb("review", "Owner replied", None);
            Ok(Redirect::to(&format!("{back}#review-{review_id}")).into_response())
        }
        Err(ReviewError::InvalidReply) => Ok(redirect_with_error(&back, "invalid_reply")),
        Err(e) => Err(e.into()),
    }
}
