//! Sample data commands.
//!
//! `seed` imports the bundled JSON files into tables that are still empty,
//! the same import the web server runs at startup. Running it again is a
//! no-op for every table that already has rows.

use std::path::Path;

use tracing::info;

use washboard_web::db::{
    ProfileRepository, ReactionRepository, ReplyRepository, ReportRepository, ReviewRepository,
    ShopOwnerRepository, ShopRepository, UserRepository,
};
use washboard_web::services::import_sample_data;

use super::{CommandError, connect};

/// Import sample data from `dir`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the import fails.
pub async fn sample_data(dir: &Path) -> Result<(), CommandError> {
    let pool = connect().await?;

    info!(dir = %dir.display(), "Importing sample data");
    let report = import_sample_data(&pool, dir).await?;

    info!("Seeding complete!");
    info!("  Laundry shops: {}", report.shops);
    info!("  User accounts: {}", report.users);
    info!("  Profiles:      {}", report.profiles);
    info!("  Shop owners:   {}", report.owners);
    info!("  Reviews:       {}", report.reviews);
    info!("  Replies:       {}", report.replies);
    info!("  Rows inserted: {}", report.total_imported());

    Ok(())
}

/// Show row counts for every table.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn stats() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Table Statistics");
    info!("================");
    info!("laundry_shop: {}", ShopRepository::new(&pool).count().await?);
    info!("user_account: {}", UserRepository::new(&pool).count().await?);
    info!("profile:      {}", ProfileRepository::new(&pool).count().await?);
    info!("shop_owner:   {}", ShopOwnerRepository::new(&pool).count().await?);
    info!("review:       {}", ReviewRepository::new(&pool).count().await?);
    info!("reply:        {}", ReplyRepository::new(&pool).count().await?);
    info!("reaction:     {}", ReactionRepository::new(&pool).count().await?);
    info!("report:       {}", ReportRepository::new(&pool).count().await?);

    Ok(())
}
