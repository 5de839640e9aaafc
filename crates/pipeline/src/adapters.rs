//! Production adapters binding the concrete clients to the port traits.
//!
//! Each adapter owns the mapping from its layer's error type into the
//! caller-facing [`PipelineError`] taxonomy.

use async_trait::async_trait;
use chrono::Duration;

use oddplate_core::narrative::NarrativeAnalysis;
use oddplate_db::models::comic::{Comic, CreateComic};
use oddplate_db::models::leaderboard::{UpsertLeaderboardEntry, UpsertOutcome};
use oddplate_db::repositories::comic_repo::ComicRepo;
use oddplate_db::repositories::leaderboard_repo::LeaderboardRepo;
use oddplate_db::DbPool;
use oddplate_openai::{AnalysisClient, ImageClient, OpenAiError};
use oddplate_places::{PlaceDetails, PlacesClient, PlacesError};

use crate::error::PipelineError;
use crate::ports::{ComicCache, ImageSynthesizer, LeaderboardStore, NarrativeAnalyzer, ReviewSource};

// ---------------------------------------------------------------------------
// Review source
// ---------------------------------------------------------------------------

#[async_trait]
impl ReviewSource for PlacesClient {
    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PipelineError> {
        PlacesClient::get_details(self, place_id)
            .await
            .map_err(|e| match e {
                PlacesError::NotFound(id) => PipelineError::PlaceNotFound(id),
                other => PipelineError::Directory(other.to_string()),
            })
    }
}

// ---------------------------------------------------------------------------
// AI collaborators
// ---------------------------------------------------------------------------

#[async_trait]
impl NarrativeAnalyzer for AnalysisClient {
    async fn analyze(&self, review_texts: &[String]) -> Result<NarrativeAnalysis, PipelineError> {
        AnalysisClient::analyze(self, review_texts)
            .await
            .map_err(|e| PipelineError::Analysis(e.to_string()))
    }
}

#[async_trait]
impl ImageSynthesizer for ImageClient {
    async fn synthesize(&self, prompt: &str, panel_count: u8) -> Result<Vec<u8>, PipelineError> {
        ImageClient::generate(self, prompt, panel_count)
            .await
            .map_err(|e| match e {
                OpenAiError::ContentPolicy(reason) => PipelineError::ContentPolicy(reason),
                other => PipelineError::Synthesis(other.to_string()),
            })
    }
}

// ---------------------------------------------------------------------------
// Postgres-backed stores
// ---------------------------------------------------------------------------

/// Cache port over the `comics` table.
pub struct PgComicCache {
    pool: DbPool,
    ttl: Duration,
}

impl PgComicCache {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }
}

#[async_trait]
impl ComicCache for PgComicCache {
    async fn find(&self, place_id: &str) -> Result<Option<Comic>, PipelineError> {
        ComicRepo::find_by_place(&self.pool, place_id)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }

    async fn upsert(&self, comic: &CreateComic) -> Result<Comic, PipelineError> {
        ComicRepo::upsert(&self.pool, comic, self.ttl)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }

    async fn delete(&self, place_id: &str) -> Result<(), PipelineError> {
        ComicRepo::delete_by_place(&self.pool, place_id)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }
}

/// Leaderboard port over the `leaderboard_entries` table.
pub struct PgLeaderboard {
    pool: DbPool,
}

impl PgLeaderboard {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaderboardStore for PgLeaderboard {
    async fn upsert(
        &self,
        entry: &UpsertLeaderboardEntry,
    ) -> Result<UpsertOutcome, PipelineError> {
        LeaderboardRepo::upsert(&self.pool, entry)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }

    async fn delete_by_place(&self, place_id: &str) -> Result<u64, PipelineError> {
        LeaderboardRepo::delete_by_place(&self.pool, place_id)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }
}
