//! Expired-comic cleanup pass.

use std::time::Duration;

use oddplate_cloud::ArtifactStore;
use oddplate_db::repositories::comic_repo::ComicRepo;
use oddplate_db::DbPool;

/// Default seconds between sweep passes.
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Default maximum rows reclaimed per pass.
pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Sweep loop configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between passes.
    pub interval: Duration,
    /// Upper bound on rows reclaimed per pass.
    pub batch_size: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SweepConfig {
    /// Build from `ODDPLATE_SWEEP_INTERVAL_SECS` and
    /// `ODDPLATE_SWEEP_BATCH_SIZE`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: env_parse("ODDPLATE_SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            batch_size: env_parse("ODDPLATE_SWEEP_BATCH_SIZE").unwrap_or(defaults.batch_size),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// What one sweep pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Expired rows found in this pass.
    pub scanned: usize,
    /// Rows (and their blobs) fully reclaimed.
    pub removed: usize,
    /// Blob deletes that failed; their rows are kept so the next pass
    /// retries them.
    pub blob_failures: usize,
}

/// Run one bounded cleanup pass.
///
/// For each expired row the blob is deleted first and the row only after,
/// so a blob delete failure leaves the row in place for a retry; the
/// reverse order would orphan the blob forever.
pub async fn sweep_once(
    pool: &DbPool,
    artifacts: &dyn ArtifactStore,
    batch_size: i64,
) -> Result<SweepStats, sqlx::Error> {
    let now = chrono::Utc::now();
    let expired = ComicRepo::list_expired(pool, now, batch_size).await?;

    let mut stats = SweepStats {
        scanned: expired.len(),
        ..SweepStats::default()
    };

    for comic in expired {
        if let Err(e) = artifacts.delete(&comic.image_key).await {
            tracing::warn!(
                place_id = %comic.place_id,
                key = %comic.image_key,
                error = %e,
                "Blob delete failed, keeping row for the next pass"
            );
            stats.blob_failures += 1;
            continue;
        }
        ComicRepo::delete_by_place(pool, &comic.place_id).await?;
        stats.removed += 1;
    }

    if stats.scanned > 0 {
        tracing::info!(
            scanned = stats.scanned,
            removed = stats.removed,
            blob_failures = stats.blob_failures,
            "Expiry sweep pass finished"
        );
    }
    Ok(stats)
}
