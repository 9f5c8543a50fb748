//! HTTP route handlers for the review site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (shop list)
//! GET  /homepage                      - Home page (shop list)
//! GET  /health                        - Health check
//!
//! # Auth
//! GET  /log_in                        - Login page
//! POST /log_in                        - Login action (rate limited)
//! GET  /sign_up                       - Signup page
//! POST /sign_up                       - Signup action (rate limited)
//! POST /log_out                       - Logout action
//!
//! # Search
//! GET  /search                        - Search form
//! GET  /search_result?q=              - Shops matching the query
//!
//! # Profiles (requires auth)
//! GET  /profile                       - Own profile, reviews and replies
//! GET  /edit_profile                  - Profile editor
//! POST /edit_profile                  - Save profile
//!
//! # Reviews
//! POST /{slug}/reviews                - Publish a review (requires auth)
//! POST /reviews/{id}/edit             - Edit own review (requires auth)
//! POST /reviews/{id}/delete           - Delete own review (requires auth)
//! POST /reviews/{id}/reaction         - Like/dislike toggle, JSON (rate limited)
//! POST /reviews/{id}/report           - Report a review, JSON (rate limited)
//! POST /reviews/{id}/replies          - Owner reply (requires auth)
//!
//! # Pages keyed by one path segment
//! GET  /{slug}                                  - Shop page
//! GET  /view_other_profile_{username}           - Another user's profile
//! GET  /establishment_owner_response_{username} - Owner reply page
//! ```
//!
//! Static routes win over `/{slug}`, so no shop can shadow them.

pub mod auth;
pub mod home;
pub mod owner;
pub mod profile;
pub mod reviews;
pub mod search;
pub mod shops;
pub mod views;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::config::WebConfig;
use crate::middleware::{auth_rate_limiter, reaction_rate_limiter};
use crate::state::AppState;

/// `?error=` code carried back to a form after a failed submission.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Redirect to `path` with an `error` code in the query string.
#[must_use]
pub fn redirect_with_error(path: &str, code: &str) -> Response {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(code))).into_response()
}

/// Create the auth routes router.
fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/log_in",
            get(auth::login_page)
                .merge(post(auth::login).layer(auth_rate_limiter(trust_proxy_headers))),
        )
        .route(
            "/sign_up",
            get(auth::sign_up_page)
                .merge(post(auth::sign_up).layer(auth_rate_limiter(trust_proxy_headers))),
        )
        .route("/log_out", post(auth::log_out))
}

/// Create the review action routes router.
fn review_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/{id}/edit", post(reviews::edit))
        .route("/{id}/delete", post(reviews::delete))
        .route(
            "/{id}/reaction",
            post(reviews::react).layer(reaction_rate_limiter(trust_proxy_headers)),
        )
        .route(
            "/{id}/report",
            post(reviews::report).layer(reaction_rate_limiter(trust_proxy_headers)),
        )
        .route("/{id}/replies", post(owner::post_reply))
}

/// Create all routes for the review site.
pub fn routes(config: &WebConfig) -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/homepage", get(home::home))
        // Auth routes
        .merge(auth_routes(config.trust_proxy_headers))
        // Search
        .route("/search", get(search::search_page))
        .route("/search_result", get(search::search_result))
        // Profiles
        .route("/profile", get(profile::profile))
        .route(
            "/edit_profile",
            get(profile::edit_profile_page).post(profile::edit_profile),
        )
        // Review actions
        .nest("/reviews", review_routes(config.trust_proxy_headers))
        // Shop pages and prefixed profile pages
        .route("/{slug}", get(shops::page))
        .route("/{slug}/reviews", post(shops::create_review))
}
