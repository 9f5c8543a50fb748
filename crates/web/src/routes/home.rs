//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::ShopRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, LaundryShop};
use crate::routes::views::PageMeta;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "homepage.html")]
pub struct HomeTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    /// Every shop, ordered by name.
    pub shops: Vec<LaundryShop>,
}

/// Display the landing page listing all shops.
#[instrument(skip(state, current_user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let shops = ShopRepository::new(state.pool()).list().await?;

    Ok(HomeTemplate {
        meta: PageMeta::new("Homepage", "homepage"),
        current_user,
        shops,
    })
}
