//! Environment-driven pipeline configuration.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;

use oddplate_core::overlay::{font_from_bytes, FontVec};
use oddplate_core::review::{DEFAULT_REVIEW_SAMPLE_CAP, MIN_REVIEWS_FOR_GENERATION};

/// Default cache validity window.
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 7;

/// Safety margin added to presigned URL validity beyond the cache TTL.
pub const URL_TTL_MARGIN_SECS: u64 = 3600;

/// Knobs for the generation pipeline. Every value has an explicit default
/// and an environment override.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validity window stamped on every cache write.
    pub cache_ttl: Duration,
    /// Minimum reviews required before and after filtering.
    pub min_reviews: usize,
    /// Sample cap for review selection.
    pub review_sample_cap: usize,
    /// Cap on review bodies forwarded to the analyzer. Defaults to the
    /// same value as the selection cap but is a separate knob.
    pub analysis_review_cap: usize,
    /// TTF font used for caption overlay. When unset, caption strips are
    /// drawn without text (logged at startup).
    pub font_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::days(DEFAULT_CACHE_TTL_DAYS),
            min_reviews: MIN_REVIEWS_FOR_GENERATION,
            review_sample_cap: DEFAULT_REVIEW_SAMPLE_CAP,
            analysis_review_cap: DEFAULT_REVIEW_SAMPLE_CAP,
            font_path: None,
        }
    }
}

impl PipelineConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `ODDPLATE_CACHE_TTL_DAYS`,
    /// `ODDPLATE_MIN_REVIEWS`, `ODDPLATE_REVIEW_SAMPLE_CAP`,
    /// `ODDPLATE_ANALYSIS_REVIEW_CAP`, `ODDPLATE_FONT_PATH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: env_parse("ODDPLATE_CACHE_TTL_DAYS")
                .map(Duration::days)
                .unwrap_or(defaults.cache_ttl),
            min_reviews: env_parse("ODDPLATE_MIN_REVIEWS").unwrap_or(defaults.min_reviews),
            review_sample_cap: env_parse("ODDPLATE_REVIEW_SAMPLE_CAP")
                .unwrap_or(defaults.review_sample_cap),
            analysis_review_cap: env_parse("ODDPLATE_ANALYSIS_REVIEW_CAP")
                .unwrap_or(defaults.analysis_review_cap),
            font_path: std::env::var("ODDPLATE_FONT_PATH").ok().map(PathBuf::from),
        }
    }

    /// Presigned URL validity: cache TTL plus a one-hour safety margin,
    /// so a URL never dies while its cache row is still valid.
    pub fn url_ttl(&self) -> StdDuration {
        StdDuration::from_secs(self.cache_ttl.num_seconds().max(0) as u64 + URL_TTL_MARGIN_SECS)
    }

    /// Load the caption font from `font_path`, if configured.
    ///
    /// An unreadable or invalid font is logged and treated as absent;
    /// captions then render as blank strips instead of failing requests.
    pub fn load_font(&self) -> Option<FontVec> {
        let path = self.font_path.as_ref()?;
        let result = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| font_from_bytes(bytes).map_err(|e| e.to_string()));
        match result {
            Ok(font) => Some(font),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error,
                    "Caption font unavailable, captions will render without text"
                );
                None
            }
        }
    }
}

/// Parse an environment variable, ignoring unset or unparseable values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
