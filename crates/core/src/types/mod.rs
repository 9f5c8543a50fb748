//! Core types for Washboard.
//!
//! This module provides type-safe wrappers and pure rules for the review domain.

pub mod excerpt;
pub mod id;
pub mod rating;
pub mod reaction;
pub mod review_draft;
pub mod username;

pub use excerpt::{COMMENT_EXCERPT_CHARS, CommentExcerpt};
pub use id::*;
pub use rating::{Rating, RatingError, STAR_ICON, stars};
pub use reaction::{
    Reaction, ReactionAction, ReactionDelta, UnknownReaction, UnknownReactionAction,
};
pub use review_draft::{ReviewDraft, ReviewDraftError, ReviewEdit};
pub use username::{Username, UsernameError};
