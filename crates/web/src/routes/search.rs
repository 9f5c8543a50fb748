//! Search route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ShopRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, LaundryShop};
use crate::routes::views::PageMeta;
use crate::state::AppState;

/// Search result query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
}

/// Search result page template.
#[derive(Template, WebTemplate)]
#[template(path = "search_result.html")]
pub struct SearchResultTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub query: String,
    pub shops: Vec<LaundryShop>,
}

/// Display the search page.
pub async fn search_page(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    SearchTemplate {
        meta: PageMeta::new("Search", "search"),
        current_user,
    }
}

/// Display shops whose name contains `q`, ignoring case.
///
/// An empty query lists every shop.
#[instrument(skip(state, current_user), fields(q = %query.q))]
pub async fn search_result(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let q = query.q.trim().to_string();
    let shops = ShopRepository::new(state.pool()).search(&q).await?;
    tracing::debug!(results = shops.len(), "Shop search");

    Ok(SearchResultTemplate {
        meta: PageMeta::new("Search Result Page", "search_result"),
        current_user,
        query: q,
        shops,
    })
}
