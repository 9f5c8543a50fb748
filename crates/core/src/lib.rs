//! Washboard Core - Shared domain types and rules.
//!
//! This crate provides the types and pure rules used across all Washboard components:
//! - `web` - Server-rendered laundry shop review site
//! - `cli` - Command-line tools for migrations and sample data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps the review rules testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, usernames, ratings, comment excerpts, reactions and
//!   review drafts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
