//! Review action handlers: edit, delete, like/dislike and report.

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use washboard_core::{Reaction, ReactionAction, ReviewId};

use crate::db::{ReviewRepository, ShopRepository};
use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAuth, ensure_visitor_key};
use crate::routes::redirect_with_error;
use crate::services::reviews::{ReviewError, ReviewService};
use crate::state::AppState;

/// Review edit form data.
#[derive(Debug, Deserialize)]
pub struct EditReviewForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

/// Like/dislike request body.
#[derive(Debug, Deserialize)]
pub struct ReactionForm {
    pub action: String,
}

/// Like/dislike response: the visitor's new state and the stored totals.
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub state: Reaction,
    pub likes: i32,
    pub dislikes: i32,
}

/// Report request body.
#[derive(Debug, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub reason: String,
}

/// Report response.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub reported: bool,
    pub first_report: bool,
}

/// Path of the shop page a review belongs to.
async fn shop_path_for(state: &AppState, review_id: ReviewId) -> Result<String, AppError> {
    let review = ReviewRepository::new(state.pool())
        .get(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {review_id}")))?;
    let shop = ShopRepository::new(state.pool())
        .get_by_id(review.shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {}", review.shop_id)))?;
    Ok(format!("/{}", shop.slug))
}

/// Save an edited title and comment. Author only.
#[instrument(skip(state, form), fields(username = %user.username))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(review_id): Path<ReviewId>,
    Form(form): Form<EditReviewForm>,
) -> Result<Response, AppError> {
    let shop_path = shop_path_for(&state, review_id).await?;

    match ReviewService::new(state.pool())
        .edit(review_id, &user.username, &form.title, &form.comment)
        .await
    {
        Ok(_) => {
            tracing::info!("Review edited");
            Ok(Redirect::to(&format!("{shop_path}#review-{review_id}")).into_response())
        }
        Err(ReviewError::Invalid(e)) => Ok(redirect_with_error(&shop_path, e.code())),
        Err(e) => Err(e.into()),
    }
}

/// Delete a review and its replies. Author only.
#[instrument(skip(state), fields(username = %user.username))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(review_id): Path<ReviewId>,
) -> Result<Response, AppError> {
    let shop_path = shop_path_for(&state, review_id).await?;

    ReviewService::new(state.pool())
        .delete(review_id, &user.username)
        .await?;

    Ok(Redirect::to(&shop_path).into_response())
}

/// Toggle like/dislike for this visitor and return the updated totals.
///
/// No login is needed. The state is stored in the database under a random
/// key kept in the visitor's session.
#[instrument(skip(state, session, form))]
pub async fn react(
    State(state): State<AppState>,
    session: Session,
    Path(review_id): Path<ReviewId>,
    Form(form): Form<ReactionForm>,
) -> Result<Json<ReactionResponse>, AppError> {
    let action: ReactionAction = form
        .action
        .parse()
        .map_err(|e: washboard_core::UnknownReactionAction| AppError::BadRequest(e.to_string()))?;

    let visitor = ensure_visitor_key(&session).await?;
    let outcome = ReviewService::new(state.pool())
        .react(review_id, visitor, action)
        .await?;

    tracing::debug!(from = %outcome.previous, to = %outcome.state, "Reaction applied");

    Ok(Json(ReactionResponse {
        state: outcome.state,
        likes: outcome.counts.likes,
        dislikes: outcome.counts.dislikes,
    }))
}

/// Flag a review as inappropriate.
///
/// Anyone may report. Each visitor counts once per review; repeats still
/// answer `reported: true`.
#[instrument(skip(state, session, current_user, form))]
pub async fn report(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Path(review_id): Path<ReviewId>,
    Form(form): Form<ReportForm>,
) -> Result<Json<ReportResponse>, AppError> {
    let visitor = ensure_visitor_key(&session).await?;
    let reporter = current_user.as_ref().map(|user| &user.username);

    let outcome = ReviewService::new(state.pool())
        .report(review_id, visitor, reporter, &form.reason)
        .await?;

    Ok(Json(ReportResponse {
        reported: true,
        first_report: outcome.first_report,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_response_shape() {
        let body = serde_json::to_value(ReactionResponse {
            state: Reaction::Liked,
            likes: 4,
            dislikes: 1,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "state": "liked", "likes": 4, "dislikes": 1 })
        );
    }

    #[test]
    fn test_report_response_shape() {
        let body = serde_json::to_value(ReportResponse {
            reported: true,
            first_report: false,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "reported": true, "first_report": false })
        );
    }
}
