//! Takedown: remove every artifact of a place from the system.
//!
//! Removal touches three stores (blob store, cache, leaderboard) with no
//! transaction spanning them, so a takedown can partially complete. Each
//! step runs regardless of the others' results and the report records all
//! three outcomes; the caller decides whether a partial takedown needs a
//! retry.

use std::sync::Arc;

use oddplate_cloud::ArtifactStore;

use crate::error::PipelineError;
use crate::ports::{ComicCache, LeaderboardStore};

/// Outcome of one removal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The step ran and removed something (count where meaningful).
    Removed(u64),
    /// The step ran and found nothing to remove.
    Absent,
    /// The step failed; the message is the underlying error.
    Failed(String),
}

impl StepResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-store outcomes of a takedown.
#[derive(Debug, Clone)]
pub struct TakedownReport {
    pub place_id: String,
    pub blob: StepResult,
    pub cache: StepResult,
    pub leaderboard: StepResult,
}

impl TakedownReport {
    /// True when every step either removed its data or had nothing to do.
    pub fn is_complete(&self) -> bool {
        !self.blob.is_failed() && !self.cache.is_failed() && !self.leaderboard.is_failed()
    }
}

/// Remove a place's comic image, cache row, and leaderboard entries.
///
/// Never returns `Err` for per-store failures; they land in the report.
/// The blob key comes from the cache row, so when the cache has no row
/// the blob step is skipped as [`StepResult::Absent`].
pub async fn remove_place(
    cache: &Arc<dyn ComicCache>,
    artifacts: &Arc<dyn ArtifactStore>,
    leaderboard: &Arc<dyn LeaderboardStore>,
    place_id: &str,
) -> Result<TakedownReport, PipelineError> {
    let cached = cache.find(place_id).await;

    let blob = match &cached {
        Ok(Some(comic)) => match artifacts.delete(&comic.image_key).await {
            Ok(()) => StepResult::Removed(1),
            Err(e) => {
                tracing::warn!(place_id, key = %comic.image_key, error = %e, "Blob delete failed");
                StepResult::Failed(e.to_string())
            }
        },
        Ok(None) => StepResult::Absent,
        Err(e) => StepResult::Failed(e.to_string()),
    };

    let cache_step = match &cached {
        Ok(Some(_)) => match cache.delete(place_id).await {
            Ok(()) => StepResult::Removed(1),
            Err(e) => {
                tracing::warn!(place_id, error = %e, "Cache delete failed");
                StepResult::Failed(e.to_string())
            }
        },
        Ok(None) => StepResult::Absent,
        Err(e) => StepResult::Failed(e.to_string()),
    };

    let leaderboard_step = match leaderboard.delete_by_place(place_id).await {
        Ok(0) => StepResult::Absent,
        Ok(n) => StepResult::Removed(n),
        Err(e) => {
            tracing::warn!(place_id, error = %e, "Leaderboard delete failed");
            StepResult::Failed(e.to_string())
        }
    };

    let report = TakedownReport {
        place_id: place_id.to_string(),
        blob,
        cache: cache_step,
        leaderboard: leaderboard_step,
    };
    if report.is_complete() {
        tracing::info!(place_id, "Takedown complete");
    } else {
        tracing::warn!(place_id, report = ?report, "Takedown partially complete");
    }
    Ok(report)
}
