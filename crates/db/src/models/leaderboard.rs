//! Leaderboard models and DTOs.

use oddplate_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A leaderboard row: the best artifact seen so far for a place within a
/// region. The stored score is the maximum ever observed, never decayed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub place_id: String,
    pub region: String,
    pub place_name: String,
    pub address: String,
    pub score: f64,
    /// Derived sortable key; ascending key order is descending score order.
    pub sort_key: String,
    pub image_url: String,
    pub updated_at: Timestamp,
}

/// Input for a leaderboard upsert. The sort key is derived by the
/// repository from the score and place id, never taken from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLeaderboardEntry {
    pub place_id: String,
    pub region: String,
    pub place_name: String,
    pub address: String,
    pub score: f64,
    pub image_url: String,
}

/// What an upsert did. Lower-than-stored scores are ignored at the
/// repository boundary so rank monotonicity cannot be bypassed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First entry for this (place, region) pair.
    Inserted,
    /// New score beat the stored one; row replaced.
    Updated,
    /// New score did not beat the stored one; row untouched.
    IgnoredLowerScore,
}
