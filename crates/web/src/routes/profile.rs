//! Profile route handlers.
//!
//! The session user's own profile, the profile editor, and third-party
//! profiles at `/view_other_profile_{username}`.

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

use washboard_core::Username;

use crate::db::profiles::ProfileFields;
use crate::db::{
    ProfileRepository, ReplyRepository, ReviewRepository, ShopOwnerRepository, ShopRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Profile};
use crate::routes::views::{
    PageMeta, ProfileCard, ReplyView, ReviewView, profile_or_owner, review_views, shop_links,
};
use crate::routes::{MessageQuery, redirect_with_error};
use crate::state::AppState;

/// Longest accepted display name, in characters.
const MAX_DISPLAY_NAME_CHARS: usize = 64;
/// Longest accepted bio, in characters.
const MAX_BIO_CHARS: usize = 1000;

// =============================================================================
// Templates
// =============================================================================

/// Session user's profile page.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub username: Username,
    /// `None` renders a placeholder.
    pub profile: Option<Profile>,
    pub reviews: Vec<ReviewView>,
    pub replies: Vec<ReplyView>,
}

/// Profile editor.
#[derive(Template, WebTemplate)]
#[template(path = "edit_profile.html")]
pub struct EditProfileTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub profile: Option<ProfileCard>,
    pub error: Option<&'static str>,
}

/// Someone else's profile.
#[derive(Template, WebTemplate)]
#[template(path = "view_other_profile.html")]
pub struct OtherProfileTemplate {
    pub meta: PageMeta,
    pub current_user: Option<CurrentUser>,
    pub username: Username,
    /// Reviewer profile, else owner profile, else placeholder.
    pub profile: Option<ProfileCard>,
    pub reviews: Vec<ReviewView>,
    pub replies: Vec<ReplyView>,
}

// =============================================================================
// Form Types
// =============================================================================

/// Profile editor form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub location: String,
}

impl ProfileForm {
    /// Validate into storable fields, or an error code.
    fn validate(self) -> Result<ProfileFields, &'static str> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err("missing_display_name");
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            return Err("display_name_too_long");
        }
        let bio = self.bio.trim();
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err("bio_too_long");
        }

        let avatar_url = non_empty(&self.avatar_url);
        if let Some(url) = &avatar_url
            && !(url.starts_with("https://") || url.starts_with('/'))
        {
            return Err("invalid_avatar_url");
        }

        Ok(ProfileFields {
            display_name: display_name.to_string(),
            bio: bio.to_string(),
            avatar_url,
            location: non_empty(&self.location),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn edit_error_message(code: &str) -> &'static str {
    match code {
        "missing_display_name" => "Please enter a display name.",
        "display_name_too_long" => "Display names are at most 64 characters.",
        "bio_too_long" => "Bios are at most 1000 characters.",
        "invalid_avatar_url" => "Avatar links must start with https://",
        _ => "Something went wrong. Please try again.",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the session user's profile, reviews and replies.
#[instrument(skip(state, session), fields(username = %user.username))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();
    let profile = ProfileRepository::new(pool)
        .get_by_username(&user.username)
        .await?;
    let reviews = ReviewRepository::new(pool)
        .list_by_username(&user.username)
        .await?;
    let replies = ReplyRepository::new(pool)
        .list_by_username(&user.username)
        .await?;
    let shops = shop_links(&ShopRepository::new(pool).list().await?);

    let reviews = review_views(pool, &session, reviews, Some(&user.username))
        .await?
        .into_iter()
        .map(|r| {
            let shop = shops.get(&r.shop_id).cloned();
            r.with_shop(shop)
        })
        .collect();

    Ok(ProfileTemplate {
        meta: PageMeta::new("Profile Page", "profile_style").with_script("reviews"),
        username: user.username.clone(),
        current_user: Some(user),
        profile,
        reviews,
        replies: replies.into_iter().map(ReplyView::from).collect(),
    })
}

/// Display the profile editor.
///
/// Prefills from the reviewer profile, falling back to the owner profile.
#[instrument(skip(state), fields(username = %user.username))]
pub async fn edit_profile_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();
    let profile = ProfileRepository::new(pool)
        .get_by_username(&user.username)
        .await?;
    let owner = if profile.is_none() {
        ShopOwnerRepository::new(pool)
            .get_by_username(&user.username)
            .await?
    } else {
        None
    };

    Ok(EditProfileTemplate {
        meta: PageMeta::new("Edit Profile Page", "edit-profile"),
        current_user: Some(user),
        profile: profile_or_owner(profile, owner),
        error: query.error.as_deref().map(edit_error_message),
    })
}

/// Save the profile editor.
#[instrument(skip(state, form), fields(username = %user.username))]
pub async fn edit_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(code) => return Ok(redirect_with_error("/edit_profile", code)),
    };

    ProfileRepository::new(state.pool())
        .upsert(&user.username, &fields)
        .await?;
    tracing::info!("Profile updated");

    Ok(Redirect::to("/profile").into_response())
}

/// Display another user's profile, reviews and replies.
///
/// Missing profiles render a placeholder rather than an error.
#[instrument(skip(state, session, current_user), fields(username = %username))]
pub async fn view_other_profile(
    state: &AppState,
    session: &Session,
    current_user: Option<CurrentUser>,
    username: Username,
) -> Result<Response, AppError> {
    let pool = state.pool();
    let profile = ProfileRepository::new(pool)
        .get_by_username(&username)
        .await?;
    let owner = ShopOwnerRepository::new(pool)
        .get_by_username(&username)
        .await?;
    let reviews = ReviewRepository::new(pool)
        .list_by_username(&username)
        .await?;
    let replies = ReplyRepository::new(pool)
        .list_by_username(&username)
        .await?;
    let shops = shop_links(&ShopRepository::new(pool).list().await?);

    let viewer = current_user.as_ref().map(|u| &u.username);
    let reviews = review_views(pool, session, reviews, viewer)
        .await?
        .into_iter()
        .map(|r| {
            let shop = shops.get(&r.shop_id).cloned();
            r.with_shop(shop)
        })
        .collect();

    Ok(OtherProfileTemplate {
        meta: PageMeta::new(format!("Profile Page of {username}"), "view_other_profile")
            .with_script("reviews"),
        current_user,
        profile: profile_or_owner(profile, owner),
        username,
        reviews,
        replies: replies.into_iter().map(ReplyView::from).collect(),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(display_name: &str, avatar_url: &str) -> ProfileForm {
        ProfileForm {
            display_name: display_name.to_string(),
            bio: "  Loves clean sheets.  ".to_string(),
            avatar_url: avatar_url.to_string(),
            location: "   ".to_string(),
        }
    }

    #[test]
    fn test_profile_form_trims_and_drops_blanks() {
        let fields = form("  Althea  ", "").validate().unwrap();
        assert_eq!(fields.display_name, "Althea");
        assert_eq!(fields.bio, "Loves clean sheets.");
        assert_eq!(fields.avatar_url, None);
        assert_eq!(fields.location, None);
    }

    #[test]
    fn test_profile_form_requires_display_name() {
        assert_eq!(form("   ", "").validate().unwrap_err(), "missing_display_name");
    }

    #[test]
    fn test_profile_form_avatar_must_be_https_or_local() {
        assert_eq!(
            form("Althea", "javascript:alert(1)").validate().unwrap_err(),
            "invalid_avatar_url"
        );
        assert!(form("Althea", "https://example.com/a.png").validate().is_ok());
        assert!(form("Althea", "/static/image/profile.png").validate().is_ok());
    }

    #[test]
    fn test_edit_error_messages_cover_codes() {
        for code in [
            "missing_display_name",
            "display_name_too_long",
            "bio_too_long",
            "invalid_avatar_url",
        ] {
            assert_ne!(edit_error_message(code), edit_error_message("unknown"));
        }
    }
}
