//! Template view models shared by several pages.

use std::collections::HashMap;

use sqlx::PgPool;
use tower_sessions::Session;

use washboard_core::{CommentExcerpt, Reaction, ReviewId, ShopId, Username};

use crate::db::ReactionRepository;
use crate::error::AppError;
use crate::middleware::visitor_key;
use crate::models::{LaundryShop, Profile, Reply, Review, ShopOwner};

/// Date format shown next to reviews and replies.
const DATE_FORMAT: &str = "%b %-d, %Y";

/// Static per-page metadata consumed by the base layout.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    /// Stylesheet name under `/static/css/`, without extension.
    pub css_file: &'static str,
    /// Script name under `/static/js/`, without extension.
    pub js_file: Option<&'static str>,
}

impl PageMeta {
    #[must_use]
    pub fn new(title: impl Into<String>, css_file: &'static str) -> Self {
        Self {
            title: title.into(),
            css_file,
            js_file: None,
        }
    }

    #[must_use]
    pub const fn with_script(mut self, js_file: &'static str) -> Self {
        self.js_file = Some(js_file);
        self
    }
}

/// Link to a shop page.
#[derive(Debug, Clone)]
pub struct ShopLink {
    pub slug: String,
    pub name: String,
}

impl From<&LaundryShop> for ShopLink {
    fn from(shop: &LaundryShop) -> Self {
        Self {
            slug: shop.slug.clone(),
            name: shop.name.clone(),
        }
    }
}

/// Map of shop id to link, for pages listing reviews across shops.
#[must_use]
pub fn shop_links(shops: &[LaundryShop]) -> HashMap<ShopId, ShopLink> {
    shops.iter().map(|s| (s.id, ShopLink::from(s))).collect()
}

/// A reply as rendered under a review or on a profile.
#[derive(Debug, Clone)]
pub struct ReplyView {
    pub review_id: ReviewId,
    pub username: Username,
    pub content: String,
    pub date: String,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            review_id: reply.review_id,
            username: reply.username,
            content: reply.content,
            date: reply.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// A review card.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub id: ReviewId,
    pub shop_id: ShopId,
    pub username: Username,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub excerpt: CommentExcerpt,
    pub image_url: Option<String>,
    pub likes: i32,
    pub dislikes: i32,
    pub date: String,
    pub edited: bool,
    pub reaction: Reaction,
    /// The viewer wrote this review and may edit or delete it.
    pub is_author: bool,
    pub shop: Option<ShopLink>,
    pub replies: Vec<ReplyView>,
}

impl ReviewView {
    #[must_use]
    pub fn new(review: Review, reaction: Reaction, viewer: Option<&Username>) -> Self {
        let excerpt = review.excerpt();
        Self {
            id: review.id,
            shop_id: review.shop_id,
            is_author: viewer.is_some_and(|v| *v == review.username),
            username: review.username,
            rating: review.rating.value(),
            title: review.title,
            comment: review.comment,
            excerpt,
            image_url: review.image_url,
            likes: review.likes,
            dislikes: review.dislikes,
            date: review.created_at.format(DATE_FORMAT).to_string(),
            edited: review.updated_at > review.created_at,
            reaction,
            shop: None,
            replies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_shop(mut self, shop: Option<ShopLink>) -> Self {
        self.shop = shop;
        self
    }

    #[must_use]
    pub fn with_replies(mut self, replies: Vec<ReplyView>) -> Self {
        self.replies = replies;
        self
    }
}

/// Build review cards with this visitor's stored reaction on each.
///
/// # Errors
///
/// Returns an error if the session or the reaction table can't be read.
pub async fn review_views(
    pool: &PgPool,
    session: &Session,
    reviews: Vec<Review>,
    viewer: Option<&Username>,
) -> Result<Vec<ReviewView>, AppError> {
    let mut states = match visitor_key(session).await? {
        Some(visitor) => ReactionRepository::new(pool).states_for(visitor).await?,
        None => HashMap::new(),
    };

    Ok(reviews
        .into_iter()
        .map(|review| {
            let reaction = states.remove(&review.id).unwrap_or_default();
            ReviewView::new(review, reaction, viewer)
        })
        .collect())
}

/// Group replies by the review they answer, keeping their order.
#[must_use]
pub fn replies_by_review(replies: Vec<Reply>) -> HashMap<ReviewId, Vec<ReplyView>> {
    let mut grouped: HashMap<ReviewId, Vec<ReplyView>> = HashMap::new();
    for reply in replies {
        grouped
            .entry(reply.review_id)
            .or_default()
            .push(ReplyView::from(reply));
    }
    grouped
}

/// Profile header for reviewer and owner pages.
#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub username: Username,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub is_owner: bool,
}

impl From<Profile> for ProfileCard {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username,
            display_name: profile.display_name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            location: profile.location,
            is_owner: false,
        }
    }
}

impl From<ShopOwner> for ProfileCard {
    fn from(owner: ShopOwner) -> Self {
        Self {
            username: owner.username,
            display_name: owner.display_name,
            bio: owner.bio,
            avatar_url: owner.avatar_url,
            location: None,
            is_owner: true,
        }
    }
}

/// Reviewer profile, falling back to the owner profile of the same username.
#[must_use]
pub fn profile_or_owner(profile: Option<Profile>, owner: Option<ShopOwner>) -> Option<ProfileCard> {
    profile
        .map(ProfileCard::from)
        .or_else(|| owner.map(ProfileCard::from))
}

/// Average star rating to one decimal place, if there are any reviews.
#[must_use]
pub fn average_rating(reviews: &[ReviewView]) -> Option<String> {
    if reviews.is_empty() {
        return None;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total as f64 / reviews.len() as f64;
    Some(format!("{average:.1}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use washboard_core::{ProfileId, Rating, ReplyId, ShopOwnerId};

    use super::*;

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn review(id: i32, author: &str, rating: i64) -> Review {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        Review {
            id: ReviewId::new(id),
            shop_id: ShopId::new(1),
            username: username(author),
            rating: Rating::new(rating).unwrap(),
            title: "Fast service".to_string(),
            comment: "Clothes came back folded.".to_string(),
            image_url: None,
            likes: 2,
            dislikes: 0,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_review_view_marks_author() {
        let viewer = username("althea");
        let mine = ReviewView::new(review(1, "althea", 5), Reaction::None, Some(&viewer));
        let theirs = ReviewView::new(review(2, "marco", 4), Reaction::None, Some(&viewer));
        let anonymous = ReviewView::new(review(3, "althea", 4), Reaction::None, None);

        assert!(mine.is_author);
        assert!(!theirs.is_author);
        assert!(!anonymous.is_author);
        assert_eq!(mine.date, "Mar 4, 2024");
        assert!(!mine.edited);
    }

    #[test]
    fn test_replies_grouped_in_order() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let reply = |id, review_id, content: &str| Reply {
            id: ReplyId::new(id),
            review_id: ReviewId::new(review_id),
            username: username("weclean_owner"),
            content: content.to_string(),
            created_at: at,
        };

        let grouped = replies_by_review(vec![
            reply(1, 10, "first"),
            reply(2, 11, "other"),
            reply(3, 10, "second"),
        ]);

        let contents: Vec<_> = grouped[&ReviewId::new(10)]
            .iter()
            .map(|r| r.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(grouped[&ReviewId::new(11)].len(), 1);
    }

    #[test]
    fn test_profile_falls_back_to_owner() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let owner = ShopOwner {
            id: ShopOwnerId::new(1),
            username: username("weclean_owner"),
            shop_id: ShopId::new(1),
            display_name: "Weclean Owner".to_string(),
            bio: String::new(),
            avatar_url: None,
        };
        let profile = Profile {
            id: ProfileId::new(1),
            username: username("weclean_owner"),
            display_name: "Reviewer".to_string(),
            bio: String::new(),
            avatar_url: None,
            location: None,
            created_at: at,
            updated_at: at,
        };

        let card = profile_or_owner(None, Some(owner.clone())).unwrap();
        assert!(card.is_owner);
        assert_eq!(card.display_name, "Weclean Owner");

        let card = profile_or_owner(Some(profile), Some(owner)).unwrap();
        assert!(!card.is_owner);

        assert!(profile_or_owner(None, None).is_none());
    }

    #[test]
    fn test_average_rating() {
        let views: Vec<_> = [5, 4, 4]
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                ReviewView::new(
                    review(i32::try_from(i).unwrap(), "althea", r),
                    Reaction::None,
                    None,
                )
            })
            .collect();
        assert_eq!(average_rating(&views).as_deref(), Some("4.3"));
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn test_page_meta_script() {
        let meta = PageMeta::new("Shop", "style").with_script("reviews");
        assert_eq!(meta.js_file, Some("reviews"));
        assert_eq!(PageMeta::new("Profile Page", "profile_style").js_file, None);
    }
}
