use crate::services::DatabaseService;
use chrono::{DateTime, Timelike, Utc};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

/// Recomputes the denormalized aggregate fields of every community:
/// `total_package_count` is the number of active listings, and
/// `total_download_count` the sum of downloads over active versions of
/// the listed packages. Returns the number of communities updated.
pub fn refresh_community_aggregates(db: &DatabaseService) -> Result<usize, diesel::result::Error> {
    let community_ids = db.get_all_community_ids()?;
    let mut updated = 0;

    for community_id in &community_ids {
        let listings = db.get_community_listings(*community_id)?;
        let total_package_count = listings.len() as i64;

        let mut total_download_count: i64 = 0;
        for (_, package) in &listings {
            for version in db.get_versions(package.id)? {
                total_download_count += version.downloads;
            }
        }

        db.set_community_aggregates(*community_id, total_download_count, total_package_count)?;
        updated += 1;
    }

    Ok(updated)
}

/// Time until the next run: minute 1 of every hour, UTC.
pub fn duration_until_next_refresh(now: DateTime<Utc>) -> Duration {
    let this_hour = now
        .with_minute(1)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let next = if this_hour > now {
        this_hour
    } else {
        this_hour + chrono::Duration::hours(1)
    };

    (next - now).to_std().unwrap_or(Duration::from_secs(3600))
}

/// Periodic aggregate refresh loop, spawned at liftoff.
pub async fn start_aggregate_refresh_task(database: Arc<DatabaseService>) {
    info!("Aggregate refresh task running (fires at minute 1 of every hour, UTC)");

    loop {
        let delay = duration_until_next_refresh(Utc::now());
        tokio::time::sleep(delay).await;

        let db = database.clone();
        match tokio::task::spawn_blocking(move || refresh_community_aggregates(&db)).await {
            Ok(Ok(updated)) => info!("Refreshed aggregate fields for {updated} communities"),
            Ok(Err(e)) => error!("Aggregate refresh failed: {e}"),
            Err(e) => error!("Aggregate refresh task panicked: {e}"),
        }
    }
}
