//! End-to-end comic generation pipeline.
//!
//! [`orchestrator::ComicPipeline`] composes the review source, the two AI
//! collaborators, the artifact store, the cache, and the leaderboard into
//! the generate-or-serve-cached flow, and owns the partial-failure policy:
//! only the leaderboard write is best-effort; everything else aborts the
//! request.

pub mod adapters;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod ports;
pub mod takedown;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError};
pub use orchestrator::ComicPipeline;
pub use outcome::{GenerationOutcome, LeaderboardWrite};
pub use takedown::{remove_place, StepResult, TakedownReport};
