//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Username/password accounts (Argon2id)
//! - `reviews` - Review authoring, owner replies, reactions
//! - `sample_data` - Insert-if-empty import of the bundled JSON fixtures

pub mod auth;
pub mod reviews;
pub mod sample_data;

pub use auth::{AuthError, AuthService};
pub use reviews::{ReviewError, ReviewService};
pub use sample_data::{ImportError, ImportReport, TableImport, import_sample_data};
