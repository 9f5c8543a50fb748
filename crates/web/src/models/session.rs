//! Session-related types.
//!
//! Types stored in the session for authentication and the visitor key that
//! reaction state is filed under.

use serde::{Deserialize, Serialize};

use washboard_core::{UserId, Username};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's account name.
    pub username: Username,
}

/// Session keys for stored state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the random id this visitor's likes and dislikes are stored under.
    pub const VISITOR: &str = "visitor";
}
