//! Port traits over the pipeline's collaborators.
//!
//! The orchestrator talks to every external system through these traits so
//! tests can substitute in-memory implementations. Production adapters for
//! the concrete clients live in [`crate::adapters`]; the artifact store
//! already has its own trait in `oddplate-cloud` and is used directly.

use async_trait::async_trait;

use oddplate_core::narrative::NarrativeAnalysis;
use oddplate_db::models::comic::{Comic, CreateComic};
use oddplate_db::models::leaderboard::{UpsertLeaderboardEntry, UpsertOutcome};
use oddplate_places::PlaceDetails;

use crate::error::PipelineError;

/// Source of place metadata and reviews.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PipelineError>;
}

/// Text-AI collaborator: reviews in, score + panel count + narrative out.
#[async_trait]
pub trait NarrativeAnalyzer: Send + Sync {
    async fn analyze(&self, review_texts: &[String]) -> Result<NarrativeAnalysis, PipelineError>;
}

/// Image-AI collaborator: prompt in, raw bitmap bytes out.
///
/// Implementations must surface content-policy rejections as
/// [`PipelineError::ContentPolicy`] and never substitute prompts on their
/// own; the fallback decision belongs to the orchestrator.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str, panel_count: u8) -> Result<Vec<u8>, PipelineError>;
}

/// Keyed record store for generated comics.
#[async_trait]
pub trait ComicCache: Send + Sync {
    /// Returns expired rows too; the caller decides validity.
    async fn find(&self, place_id: &str) -> Result<Option<Comic>, PipelineError>;
    /// Full replace; the implementation stamps the expiry at write time.
    async fn upsert(&self, comic: &CreateComic) -> Result<Comic, PipelineError>;
    async fn delete(&self, place_id: &str) -> Result<(), PipelineError>;
}

/// Regional ranked-set store.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Monotonic upsert: lower-than-stored scores are ignored.
    async fn upsert(&self, entry: &UpsertLeaderboardEntry)
        -> Result<UpsertOutcome, PipelineError>;
    /// Remove a place across all regions.
    async fn delete_by_place(&self, place_id: &str) -> Result<u64, PipelineError>;
}
