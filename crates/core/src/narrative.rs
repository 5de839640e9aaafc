//! Narrative analysis result type and beat splitting.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lowest valid strangeness score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest valid strangeness score.
pub const MAX_SCORE: f64 = 100.0;
/// Fewest panels a comic can have.
pub const MIN_PANEL_COUNT: u8 = 1;
/// Most panels a comic can have.
pub const MAX_PANEL_COUNT: u8 = 4;

/// Output of the narrative analysis call: how strange the reviews are,
/// how many panels the comic should have, and the story itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeAnalysis {
    /// Strangeness score, 0-100. Higher means more unusual source material.
    pub score: f64,
    /// Number of comic panels, 1-4.
    pub panel_count: u8,
    /// Short narrative derived from the reviews.
    pub narrative: String,
}

impl NarrativeAnalysis {
    /// Validate score range, panel count range, and non-empty narrative.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(CoreError::Validation(format!(
                "Strangeness score {} out of range {MIN_SCORE}-{MAX_SCORE}",
                self.score
            )));
        }
        if !(MIN_PANEL_COUNT..=MAX_PANEL_COUNT).contains(&self.panel_count) {
            return Err(CoreError::Validation(format!(
                "Panel count {} out of range {MIN_PANEL_COUNT}-{MAX_PANEL_COUNT}",
                self.panel_count
            )));
        }
        if self.narrative.trim().is_empty() {
            return Err(CoreError::Validation(
                "Narrative must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a narrative into `panel_count` beats.
///
/// Sentences are distributed across panels in order, as evenly as possible.
/// With fewer sentences than panels, trailing panels reuse the last
/// sentence so every panel has a caption.
pub fn split_into_beats(narrative: &str, panel_count: u8) -> Vec<String> {
    let panel_count = panel_count.max(MIN_PANEL_COUNT) as usize;
    let sentences: Vec<String> = narrative
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if sentences.is_empty() {
        return vec![narrative.trim().to_string(); panel_count];
    }

    let mut beats = Vec::with_capacity(panel_count);
    let per_panel = sentences.len().div_ceil(panel_count);
    for chunk in sentences.chunks(per_panel) {
        beats.push(chunk.join(" "));
    }
    while beats.len() < panel_count {
        let last = beats.last().cloned().unwrap_or_default();
        beats.push(last);
    }
    beats
}
