//! Domain models for the review site.
//!
//! One struct per table. Repositories in [`crate::db`] return these directly.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};

use chrono::{DateTime, Utc};
use serde::Serialize;

use washboard_core::{
    CommentExcerpt, ProfileId, Rating, ReplyId, ReviewId, ShopId, ShopOwnerId, UserId, Username,
};

/// A login account. Password hashes never leave the repository layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    pub id: UserId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

/// Public profile of a reviewer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub username: Username,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A laundry shop listing.
///
/// `slug` is the URL key (`/Weclean`); `name` is the display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LaundryShop {
    pub id: ShopId,
    pub slug: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
}

/// A review of a laundry shop.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub shop_id: ShopId,
    pub username: Username,
    pub rating: Rating,
    pub title: String,
    pub comment: String,
    pub image_url: Option<String>,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Comment split for "Show more..." display.
    #[must_use]
    pub fn excerpt(&self) -> CommentExcerpt {
        CommentExcerpt::new(&self.comment)
    }
}

/// A response posted under a review.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reply {
    pub id: ReplyId,
    pub review_id: ReviewId,
    pub username: Username,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Owner account attached to a laundry shop.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShopOwner {
    pub id: ShopOwnerId,
    pub username: Username,
    pub shop_id: ShopId,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
}
