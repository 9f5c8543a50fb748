//! Sample data import.
//!
//! Loads the bundled JSON fixtures into an empty database. Each table is
//! imported only when it has no rows, so running the import repeatedly
//! never duplicates data.
//!
//! The whole import runs in one transaction holding an advisory lock. A
//! failed run leaves nothing behind, and a second importer (the CLI seed
//! racing the startup import) waits and then finds the tables filled.
//!
//! # Files
//!
//! | File | Table |
//! |---|---|
//! | `laundry_shopSample.json` | `laundry_shop` |
//! | `user_accSample.json` | `user_account` |
//! | `profileSample.json` | `profile` |
//! | `laundry_shop_ownerSample.json` | `shop_owner` |
//! | `reviewsSample.json` | `review` |
//! | `replySample.json` | `reply` |
//!
//! Reviews name their shop by display name and carry a `ref`; replies point
//! at a review through `review_ref`. Both are resolved to generated IDs here.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::{info, instrument, warn};

use washboard_core::{Rating, RatingError, ReviewId, ShopId, Username, UsernameError};

use crate::db::profiles::ProfileFields;
use crate::db::reviews::ImportedReview;
use crate::db::shops::NewShop;
use crate::db::{
    ProfileRepository, ReplyRepository, RepositoryError, ReviewRepository, ShopOwnerRepository,
    ShopRepository, UserRepository,
};
use crate::services::auth::hash_password;

pub const SHOPS_FILE: &str = "laundry_shopSample.json";
pub const USERS_FILE: &str = "user_accSample.json";
pub const PROFILES_FILE: &str = "profileSample.json";
pub const OWNERS_FILE: &str = "laundry_shop_ownerSample.json";
pub const REVIEWS_FILE: &str = "reviewsSample.json";
pub const REPLIES_FILE: &str = "replySample.json";

/// Advisory lock key serializing concurrent imports.
const IMPORT_LOCK_KEY: i64 = 0x7761_7368_626f_6172;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur while importing sample data.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid username {value:?} in {file}: {source}")]
    InvalidUsername {
        file: &'static str,
        value: String,
        #[source]
        source: UsernameError,
    },

    #[error("invalid rating in review {reference:?}: {source}")]
    InvalidRating {
        reference: String,
        #[source]
        source: RatingError,
    },

    #[error("{file} references unknown shop {name:?}")]
    UnknownShop { file: &'static str, name: String },

    #[error("reply references unknown review {0:?}")]
    UnknownReview(String),

    #[error("failed to hash sample password for {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// File Records
// =============================================================================

#[derive(Debug, Deserialize)]
struct ShopRecord {
    slug: String,
    name: String,
    address: String,
    #[serde(default)]
    description: String,
    image_url: Option<String>,
    phone: Option<String>,
    opening_hours: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    username: String,
    display_name: String,
    #[serde(default)]
    bio: String,
    avatar_url: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnerRecord {
    username: String,
    shop: String,
    display_name: String,
    #[serde(default)]
    bio: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    #[serde(rename = "ref")]
    reference: String,
    shop: String,
    username: String,
    rating: i64,
    title: String,
    comment: String,
    image_url: Option<String>,
    #[serde(default)]
    likes: i32,
    #[serde(default)]
    dislikes: i32,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ReplyRecord {
    review_ref: String,
    username: String,
    content: String,
    date: Option<DateTime<Utc>>,
}

// =============================================================================
// Report
// =============================================================================

/// What happened to one table during an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableImport {
    /// The table was empty and this many rows were inserted.
    Imported(usize),
    /// The table already had rows and was left alone.
    Skipped,
}

impl fmt::Display for TableImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported(n) => write!(f, "imported {n}"),
            Self::Skipped => f.write_str("skipped"),
        }
    }
}

/// Per-table outcome of a sample data import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub shops: TableImport,
    pub users: TableImport,
    pub profiles: TableImport,
    pub owners: TableImport,
    pub reviews: TableImport,
    pub replies: TableImport,
}

impl ImportReport {
    /// Total rows inserted across all tables.
    #[must_use]
    pub fn total_imported(&self) -> usize {
        [
            self.shops,
            self.users,
            self.profiles,
            self.owners,
            self.reviews,
            self.replies,
        ]
        .iter()
        .map(|t| match t {
            TableImport::Imported(n) => *n,
            TableImport::Skipped => 0,
        })
        .sum()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shops {}, users {}, profiles {}, owners {}, reviews {}, replies {}",
            self.shops, self.users, self.profiles, self.owners, self.reviews, self.replies
        )
    }
}

/// Whether a table with `existing_rows` rows should be imported.
#[must_use]
pub const fn needs_import(existing_rows: i64) -> bool {
    existing_rows == 0
}

// =============================================================================
// Import
// =============================================================================

/// Import every sample file from `dir` into the tables that are still empty.
///
/// # Errors
///
/// Returns `ImportError` if a file cannot be read or parsed, a reference
/// cannot be resolved, or an insert fails. Nothing is kept from a failed run.
#[instrument(skip(pool, dir), fields(dir = %dir.as_ref().display()))]
pub async fn import_sample_data(
    pool: &PgPool,
    dir: impl AsRef<Path>,
) -> Result<ImportReport, ImportError> {
    let dir = dir.as_ref();

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(IMPORT_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let shops = import_shops(&mut tx, dir).await?;
    let shop_ids = shop_ids_by_name(&mut tx).await?;

    let users = import_users(&mut tx, dir).await?;
    let profiles = import_profiles(&mut tx, dir).await?;
    let owners = import_owners(&mut tx, dir, &shop_ids).await?;
    let (reviews, review_ids) = import_reviews(&mut tx, dir, &shop_ids).await?;
    let replies = import_replies(&mut tx, dir, review_ids.as_ref()).await?;

    tx.commit().await?;

    let report = ImportReport {
        shops,
        users,
        profiles,
        owners,
        reviews,
        replies,
    };

    info!(
        shops = %report.shops,
        users = %report.users,
        profiles = %report.profiles,
        owners = %report.owners,
        reviews = %report.reviews,
        replies = %report.replies,
        "Sample data import completed"
    );

    Ok(report)
}

async fn read_records<T: DeserializeOwned>(
    dir: &Path,
    file: &'static str,
) -> Result<Vec<T>, ImportError> {
    let path = dir.join(file);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ImportError::Io { path, source })?;
    parse_records(file, &content)
}

fn parse_records<T: DeserializeOwned>(
    file: &'static str,
    content: &str,
) -> Result<Vec<T>, ImportError> {
    serde_json::from_str(content).map_err(|source| ImportError::Json { file, source })
}

fn parse_username(file: &'static str, value: &str) -> Result<Username, ImportError> {
    Username::parse(value).map_err(|source| ImportError::InvalidUsername {
        file,
        value: value.to_owned(),
        source,
    })
}

/// Whether `table` in the `washboard` schema has no rows yet.
async fn table_is_empty(
    conn: &mut PgConnection,
    table: &'static str,
) -> Result<bool, ImportError> {
    let rows = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM washboard.{table}"))
        .fetch_one(conn)
        .await?;
    Ok(needs_import(rows))
}

async fn shop_ids_by_name(
    conn: &mut PgConnection,
) -> Result<HashMap<String, ShopId>, ImportError> {
    let shops =
        sqlx::query_as::<_, (String, ShopId)>("SELECT name, id FROM washboard.laundry_shop")
            .fetch_all(conn)
            .await?;
    Ok(shops.into_iter().collect())
}

fn resolve_shop(
    shop_ids: &HashMap<String, ShopId>,
    file: &'static str,
    name: &str,
) -> Result<ShopId, ImportError> {
    shop_ids
        .get(name)
        .copied()
        .ok_or_else(|| ImportError::UnknownShop {
            file,
            name: name.to_owned(),
        })
}

async fn import_shops(conn: &mut PgConnection, dir: &Path) -> Result<TableImport, ImportError> {
    if !table_is_empty(conn, "laundry_shop").await? {
        return Ok(TableImport::Skipped);
    }

    let records: Vec<ShopRecord> = read_records(dir, SHOPS_FILE).await?;
    for record in &records {
        ShopRepository::insert(&mut *conn, &NewShop {
            slug: &record.slug,
            name: &record.name,
            address: &record.address,
            description: &record.description,
            image_url: record.image_url.as_deref(),
            phone: record.phone.as_deref(),
            opening_hours: record.opening_hours.as_deref(),
        })
        .await?;
    }

    info!(count = records.len(), "Laundry shops imported");
    Ok(TableImport::Imported(records.len()))
}

async fn import_users(conn: &mut PgConnection, dir: &Path) -> Result<TableImport, ImportError> {
    if !table_is_empty(conn, "user_account").await? {
        return Ok(TableImport::Skipped);
    }

    let records: Vec<UserRecord> = read_records(dir, USERS_FILE).await?;
    for record in &records {
        let username = parse_username(USERS_FILE, &record.username)?;
        let hash = hash_password(&record.password)
            .map_err(|_| ImportError::PasswordHash(username.to_string()))?;
        UserRepository::insert(&mut *conn, &username, &hash).await?;
    }

    info!(count = records.len(), "User accounts imported");
    Ok(TableImport::Imported(records.len()))
}

async fn import_profiles(
    conn: &mut PgConnection,
    dir: &Path,
) -> Result<TableImport, ImportError> {
    if !table_is_empty(conn, "profile").await? {
        return Ok(TableImport::Skipped);
    }

    let records: Vec<ProfileRecord> = read_records(dir, PROFILES_FILE).await?;
    for record in &records {
        let username = parse_username(PROFILES_FILE, &record.username)?;
        let fields = ProfileFields {
            display_name: record.display_name.clone(),
            bio: record.bio.clone(),
            avatar_url: record.avatar_url.clone(),
            location: record.location.clone(),
        };
        ProfileRepository::insert(&mut *conn, &username, &fields).await?;
    }

    info!(count = records.len(), "Profiles imported");
    Ok(TableImport::Imported(records.len()))
}

async fn import_owners(
    conn: &mut PgConnection,
    dir: &Path,
    shop_ids: &HashMap<String, ShopId>,
) -> Result<TableImport, ImportError> {
    if !table_is_empty(conn, "shop_owner").await? {
        return Ok(TableImport::Skipped);
    }

    let records: Vec<OwnerRecord> = read_records(dir, OWNERS_FILE).await?;
    for record in &records {
        let username = parse_username(OWNERS_FILE, &record.username)?;
        let shop_id = resolve_shop(shop_ids, OWNERS_FILE, &record.shop)?;
        ShopOwnerRepository::insert(
            &mut *conn,
            &username,
            shop_id,
            &record.display_name,
            &record.bio,
            record.avatar_url.as_deref(),
        )
        .await?;
    }

    info!(count = records.len(), "Shop owners imported");
    Ok(TableImport::Imported(records.len()))
}

/// Returns the `ref` → id map only when reviews were imported in this run.
async fn import_reviews(
    conn: &mut PgConnection,
    dir: &Path,
    shop_ids: &HashMap<String, ShopId>,
) -> Result<(TableImport, Option<HashMap<String, ReviewId>>), ImportError> {
    if !table_is_empty(conn, "review").await? {
        return Ok((TableImport::Skipped, None));
    }

    let records: Vec<ReviewRecord> = read_records(dir, REVIEWS_FILE).await?;
    let mut review_ids = HashMap::with_capacity(records.len());

    for record in &records {
        let username = parse_username(REVIEWS_FILE, &record.username)?;
        let shop_id = resolve_shop(shop_ids, REVIEWS_FILE, &record.shop)?;
        let rating = Rating::new(record.rating).map_err(|source| ImportError::InvalidRating {
            reference: record.reference.clone(),
            source,
        })?;

        let review = ReviewRepository::insert(
            &mut *conn,
            &ImportedReview {
                shop_id,
                username: &username,
                rating,
                title: &record.title,
                comment: &record.comment,
                image_url: record.image_url.as_deref(),
                likes: record.likes.max(0),
                dislikes: record.dislikes.max(0),
                created_at: record.date,
            },
        )
        .await?;
        review_ids.insert(record.reference.clone(), review.id);
    }

    info!(count = records.len(), "Reviews imported");
    Ok((TableImport::Imported(records.len()), Some(review_ids)))
}

async fn import_replies(
    conn: &mut PgConnection,
    dir: &Path,
    review_ids: Option<&HashMap<String, ReviewId>>,
) -> Result<TableImport, ImportError> {
    if !table_is_empty(conn, "reply").await? {
        return Ok(TableImport::Skipped);
    }

    // Review refs only exist in the fixture, so replies can't be attached
    // to reviews that were already in the database.
    let Some(review_ids) = review_ids else {
        warn!("Reply table is empty but reviews were not imported; skipping replies");
        return Ok(TableImport::Skipped);
    };

    let records: Vec<ReplyRecord> = read_records(dir, REPLIES_FILE).await?;
    for record in &records {
        let username = parse_username(REPLIES_FILE, &record.username)?;
        let review_id = review_ids
            .get(&record.review_ref)
            .copied()
            .ok_or_else(|| ImportError::UnknownReview(record.review_ref.clone()))?;
        ReplyRepository::insert(
            &mut *conn,
            review_id,
            &username,
            &record.content,
            record.date,
        )
        .await?;
    }

    info!(count = records.len(), "Replies imported");
    Ok(TableImport::Imported(records.len()))
}
