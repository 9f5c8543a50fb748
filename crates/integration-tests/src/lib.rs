//! Integration tests for Washboard.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests: needs a migrated, empty or seeded database
//! WASHBOARD_DATABASE_URL=postgres://... cargo test -p washboard-integration-tests -- --ignored
//!
//! # Site tests: also needs the web server running with sample data
//! cargo run -p washboard-web &
//! WASHBOARD_TEST_URL=http://localhost:3000 cargo test -p washboard-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `sample_data_import` - Import idempotency, rollback and shop/review linkage
//! - `site_pages` - Pages, login, reviews, replies, reactions and reports over HTTP

use std::path::PathBuf;

use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;

/// Base URL of the running site (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("WASHBOARD_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Directory holding the bundled sample files.
#[must_use]
pub fn sample_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../web/sampledata")
}

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if no database URL is configured or the database is unreachable.
pub async fn migrated_pool() -> PgPool {
    let url = std::env::var("WASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("WASHBOARD_DATABASE_URL or DATABASE_URL must be set");

    let pool = washboard_web::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    washboard_web::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Browser-like client that keeps the session cookie and does not follow
/// redirects, so tests can assert on `Location`.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Log `client` in with a sample account.
///
/// # Panics
///
/// Panics if the login request fails or is rejected.
pub async fn log_in(client: &Client, username: &str, password: &str) {
    let resp = client
        .post(format!("{}/log_in", base_url()))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to send login request");

    let location = resp
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(location, "/homepage", "login for {username} was rejected");
}
