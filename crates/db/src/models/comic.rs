//! Generated comic models and DTOs.

use oddplate_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A generated comic row from the `comics` table.
///
/// A row is valid for reuse iff `now < expires_at`; expired rows are still
/// returned by lookups so callers can tell "never generated" apart from
/// "stale, needs refresh" without a second query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comic {
    pub place_id: String,
    pub place_name: String,
    pub narrative: String,
    /// Strangeness score, 0-100.
    pub score: f64,
    /// Object-store key of the final bitmap.
    pub image_key: String,
    /// Externally fetchable URL of the final bitmap.
    pub image_url: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// Transient flag: true when this result was served from cache rather
    /// than freshly generated. Never persisted.
    #[sqlx(default)]
    #[serde(default)]
    pub from_cache: bool,
}

impl Comic {
    /// Whether this row is still within its validity window.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting or replacing a comic. The expiry is stamped by the
/// repository at write time, never taken from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComic {
    pub place_id: String,
    pub place_name: String,
    pub narrative: String,
    pub score: f64,
    pub image_key: String,
    pub image_url: String,
}
