//! The generate-or-serve-cached pipeline.
//!
//! Flow: cache check → fetch reviews → validate count → select → filter →
//! analyze → build prompt → synthesize (with content-policy fallback) →
//! overlay captions → upload → cache write → best-effort leaderboard
//! write.
//!
//! Concurrency note: two concurrent requests for the same place can both
//! miss the cache and both run the full generation. This is deliberate —
//! the service runs multi-instance, so an in-process single-flight lock
//! could not make generation exactly-once anyway. The cache upsert is
//! last-writer-wins and the leaderboard upsert is monotonic, so duplicate
//! work wastes provider spend but never corrupts state.

use std::sync::Arc;

use oddplate_cloud::ArtifactStore;
use oddplate_core::content_filter::filter_reviews;
use oddplate_core::overlay::{render_captions, FontVec};
use oddplate_core::prompt::{build_comic_prompt, fallback_prompt};
use oddplate_core::review::select_reviews;
use oddplate_db::models::comic::{Comic, CreateComic};
use oddplate_db::models::leaderboard::UpsertLeaderboardEntry;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::outcome::{GenerationOutcome, LeaderboardWrite};
use crate::ports::{ComicCache, ImageSynthesizer, LeaderboardStore, NarrativeAnalyzer, ReviewSource};

/// End-to-end comic generation orchestrator.
pub struct ComicPipeline {
    pub source: Arc<dyn ReviewSource>,
    pub analyzer: Arc<dyn NarrativeAnalyzer>,
    pub synthesizer: Arc<dyn ImageSynthesizer>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub cache: Arc<dyn ComicCache>,
    pub leaderboard: Arc<dyn LeaderboardStore>,
    /// Caption font; strips render without text when absent.
    pub font: Option<FontVec>,
    pub config: PipelineConfig,
}

impl ComicPipeline {
    /// Generate a comic for a place, or serve the cached one.
    ///
    /// `force_regenerate` bypasses the cache check entirely and overwrites
    /// any existing cache and leaderboard entries. Only the leaderboard
    /// write is best-effort; every other failure aborts the request.
    pub async fn generate(
        &self,
        place_id: &str,
        force_regenerate: bool,
    ) -> Result<GenerationOutcome, PipelineError> {
        if !force_regenerate {
            if let Some(mut comic) = self.cache.find(place_id).await? {
                if comic.is_valid_at(chrono::Utc::now()) {
                    tracing::info!(place_id, "Serving comic from cache");
                    comic.from_cache = true;
                    return Ok(GenerationOutcome {
                        comic,
                        leaderboard: LeaderboardWrite::NotAttempted,
                    });
                }
                tracing::debug!(place_id, "Cached comic expired, regenerating");
            }
        }

        let details = self.source.get_details(place_id).await?;
        if details.reviews.len() < self.config.min_reviews {
            return Err(PipelineError::InsufficientContent {
                found: details.reviews.len(),
                required: self.config.min_reviews,
            });
        }

        let selected = select_reviews(&details.reviews, self.config.review_sample_cap);
        let filtered = filter_reviews(selected);
        if filtered.len() < self.config.min_reviews {
            return Err(PipelineError::InsufficientContent {
                found: filtered.len(),
                required: self.config.min_reviews,
            });
        }

        let texts: Vec<String> = filtered
            .iter()
            .take(self.config.analysis_review_cap)
            .map(|r| r.text.clone())
            .collect();
        let analysis = self.analyzer.analyze(&texts).await?;
        tracing::info!(
            place_id,
            score = analysis.score,
            panel_count = analysis.panel_count,
            "Reviews analyzed"
        );

        let raw_image = self.synthesize_with_fallback(&analysis.narrative, analysis.panel_count).await?;

        let composed = render_captions(
            &raw_image,
            &analysis.narrative,
            analysis.panel_count,
            self.font.as_ref(),
        )
        .map_err(|e| PipelineError::Compositing(e.to_string()))?;

        let image_key = format!("comics/{place_id}/{}.png", uuid::Uuid::new_v4());
        let image_url = self
            .artifacts
            .put(&image_key, composed)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let comic = self
            .cache
            .upsert(&CreateComic {
                place_id: place_id.to_string(),
                place_name: details.display_name.clone(),
                narrative: analysis.narrative.clone(),
                score: analysis.score,
                image_key,
                image_url: image_url.clone(),
            })
            .await?;

        let leaderboard = self
            .write_leaderboard(&details.place_id, &details.display_name, &details.address, &details.region_code, analysis.score, &image_url)
            .await;

        Ok(GenerationOutcome { comic, leaderboard })
    }

    /// Return the valid cached comic for a place, if any.
    ///
    /// Expired rows count as absent here; only [`generate`](Self::generate)
    /// distinguishes "never generated" from "stale".
    pub async fn get_cached(&self, place_id: &str) -> Result<Option<Comic>, PipelineError> {
        let Some(mut comic) = self.cache.find(place_id).await? else {
            return Ok(None);
        };
        if !comic.is_valid_at(chrono::Utc::now()) {
            return Ok(None);
        }
        comic.from_cache = true;
        Ok(Some(comic))
    }

    /// Synthesize with the sanitized narrative prompt; on a content-policy
    /// rejection, try the generic fallback prompt exactly once. A second
    /// rejection is terminal.
    async fn synthesize_with_fallback(
        &self,
        narrative: &str,
        panel_count: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        let prompt = build_comic_prompt(narrative, panel_count);
        match self.synthesizer.synthesize(&prompt, panel_count).await {
            Ok(bytes) => Ok(bytes),
            Err(PipelineError::ContentPolicy(reason)) => {
                tracing::warn!(
                    reason,
                    "Sanitized prompt rejected by content policy, using generic fallback"
                );
                self.synthesizer
                    .synthesize(&fallback_prompt(panel_count), panel_count)
                    .await
            }
            Err(other) => Err(other),
        }
    }

    /// Best-effort leaderboard write: failures are logged and reported in
    /// the outcome, never propagated.
    async fn write_leaderboard(
        &self,
        place_id: &str,
        place_name: &str,
        address: &str,
        region: &str,
        score: f64,
        image_url: &str,
    ) -> LeaderboardWrite {
        let entry = UpsertLeaderboardEntry {
            place_id: place_id.to_string(),
            region: region.to_string(),
            place_name: place_name.to_string(),
            address: address.to_string(),
            score,
            image_url: image_url.to_string(),
        };
        match self.leaderboard.upsert(&entry).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                tracing::warn!(
                    place_id,
                    region,
                    error = %e,
                    "Leaderboard write failed; generation still succeeds"
                );
                LeaderboardWrite::Failed
            }
        }
    }
}
