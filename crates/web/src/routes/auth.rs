//! Authentication route handlers.
//!
//! Login, signup and logout. Login state lives in the visitor's session.
//! Rejected input redirects back to the form with an `error` code; database
//! and session failures are server errors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserAccount};
use crate::routes::views::PageMeta;
use crate::routes::{MessageQuery, redirect_with_error};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; present only when ticked.
    pub remember: Option<String>,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "log_in.html")]
pub struct LogInTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "sign_up.html")]
pub struct SignUpTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Human-readable text for a login error code.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "missing" => "Please enter both username and password.",
        "credentials" => "Invalid username or password. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Human-readable text for a signup error code.
fn sign_up_error_message(code: &str) -> &'static str {
    match code {
        "missing" => "Please choose a username and password.",
        "invalid_username" => {
            "Usernames are 1-32 letters, digits, dots, dashes or underscores."
        }
        "username_taken" => "That username is already taken.",
        "password_too_short" => "Passwords must be at least 8 characters.",
        "password_mismatch" => "Passwords do not match.",
        _ => "Something went wrong. Please try again.",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LogInTemplate {
        meta: PageMeta::new("Login Page", "log_in_style").with_script("auth_forms"),
        current_user,
        error: query.error.as_deref().map(login_error_message),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(redirect_with_error("/log_in", "missing"));
    }

    let auth = AuthService::new(state.pool());
    match auth.login_with_password(&form.username, &form.password).await {
        Ok(account) => start_session(&session, account, form.remember.is_some(), "/homepage").await,
        Err(e) if e.is_server_error() => Err(AppError::Auth(e)),
        Err(e) => {
            tracing::info!(reason = e.code(), "Login rejected");
            Ok(redirect_with_error("/log_in", "credentials"))
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn sign_up_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    SignUpTemplate {
        meta: PageMeta::new("Sign up Page", "sign_up_style").with_script("auth_forms"),
        current_user,
        error: query.error.as_deref().map(sign_up_error_message),
    }
}

/// Handle signup form submission.
///
/// Creates the account and an empty profile, then logs the new user in.
#[instrument(skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(redirect_with_error("/sign_up", "missing"));
    }

    let auth = AuthService::new(state.pool());
    match auth
        .register_with_password(&form.username, &form.password, &form.password_confirm)
        .await
    {
        Ok(account) => {
            tracing::info!(user_id = %account.id, "Account created");
            start_session(&session, account, false, "/profile").await
        }
        Err(e) if e.is_server_error() => Err(AppError::Auth(e)),
        Err(e) => {
            tracing::info!(reason = e.code(), "Signup rejected");
            Ok(redirect_with_error("/sign_up", e.code()))
        }
    }
}

/// Store the user in the session and redirect to `next`.
async fn start_session(
    session: &Session,
    account: UserAccount,
    remember: bool,
    next: &str,
) -> Result<Response, AppError> {
    let user = CurrentUser {
        id: account.id,
        username: account.username,
    };

    set_current_user(session, &user, remember).await?;

    set_sentry_user(&user.id, user.username.as_str());
    tracing::info!(user_id = %user.id, remember, "User logged in");
    Ok(Redirect::to(next).into_response())
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
pub async fn log_out(session: Session) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to("/homepage").into_response())
}
