//! Result types distinguishing primary success from secondary effects.
//!
//! A successful generation that fails to update the leaderboard is still
//! a successful generation; the leaderboard write result is carried
//! alongside the comic instead of being collapsed into one boolean.

use oddplate_db::models::comic::Comic;
use oddplate_db::models::leaderboard::UpsertOutcome;

/// What happened to the best-effort leaderboard write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardWrite {
    /// First entry for this (place, region).
    Inserted,
    /// New score beat the stored one.
    Updated,
    /// New score did not beat the stored one; rank unchanged.
    IgnoredLowerScore,
    /// The write failed; logged and swallowed.
    Failed,
    /// No write was attempted (cache hit).
    NotAttempted,
}

impl From<UpsertOutcome> for LeaderboardWrite {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Inserted => Self::Inserted,
            UpsertOutcome::Updated => Self::Updated,
            UpsertOutcome::IgnoredLowerScore => Self::IgnoredLowerScore,
        }
    }
}

/// The pipeline's answer to a generate request.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The generated (or cached) comic.
    pub comic: Comic,
    /// What the leaderboard write did.
    pub leaderboard: LeaderboardWrite,
}
