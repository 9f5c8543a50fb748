//! Authentication extractors and session helpers.
//!
//! The logged-in user is stored in the visitor's session under
//! [`session_keys::CURRENT_USER`]. Nothing about login state is kept on the
//! account row.
//!
//! A session store failure is a server error, never "logged out".

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::{Expiry, Session};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::session::remember_me_expiry;
use crate::models::{CurrentUser, session_keys};

/// Login page used for redirects.
pub const LOGIN_PATH: &str = "/log_in";

/// Extractor that requires a logged-in user.
///
/// Page requests without a user are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// Unauthorized response (for script requests).
    Unauthorized,
    /// The session store could not be read.
    Session(tower_sessions::session::Error),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Session(e) => AppError::Session(e).into_response(),
        }
    }
}

/// Whether the request came from page script rather than a navigation.
fn wants_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = if wants_json(parts) {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin
        };

        // Session is put in extensions by SessionManagerLayer
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(rejection);
        };

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .map_err(AuthRejection::Session)?
            .ok_or(rejection)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => {
                session
                    .get::<CurrentUser>(session_keys::CURRENT_USER)
                    .await?
            }
            None => None,
        };

        Ok(Self(user))
    }
}

/// Log a user in.
///
/// The session ID is cycled first so a pre-login ID can't be fixated.
/// With `remember`, the session outlives the default inactivity window.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    remember: bool,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    if remember {
        session.set_expiry(Some(Expiry::OnInactivity(remember_me_expiry())));
    }
    ensure_visitor_key(session).await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// The key this visitor's reactions are stored under, if they have one.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn visitor_key(
    session: &Session,
) -> Result<Option<Uuid>, tower_sessions::session::Error> {
    session.get::<Uuid>(session_keys::VISITOR).await
}

/// The visitor's reaction key, created on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn ensure_visitor_key(session: &Session) -> Result<Uuid, tower_sessions::session::Error> {
    if let Some(key) = visitor_key(session).await? {
        return Ok(key);
    }
    let key = Uuid::new_v4();
    session.insert(session_keys::VISITOR, key).await?;
    Ok(key)
}

/// Log the current user out, dropping all session state.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
