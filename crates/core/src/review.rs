//! Review types and selection logic.
//!
//! Negative reviews (rating <= 3) are the richest narrative material, so
//! selection always takes every negative review first, ordered worst-first,
//! and pads with positive reviews only up to the sample cap.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum number of reviews a place must have before generation is allowed.
pub const MIN_REVIEWS_FOR_GENERATION: usize = 5;

/// Default maximum number of reviews forwarded to the narrative analyzer.
/// Caps the token cost of the downstream text-AI call.
pub const DEFAULT_REVIEW_SAMPLE_CAP: usize = 5;

/// Ratings at or below this value count as negative.
pub const NEGATIVE_RATING_MAX: u8 = 3;

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// One customer review, as fetched from the place directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Author display name.
    pub author: String,
    /// Free-text review body.
    pub text: String,
    /// Star rating, 1-5.
    pub rating: u8,
    /// When the review was written.
    pub time: Timestamp,
}

impl Review {
    /// Whether this review counts as negative (rating 1-3).
    pub fn is_negative(&self) -> bool {
        self.rating <= NEGATIVE_RATING_MAX
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select a prioritized, size-bounded sample of reviews.
///
/// Partitions into negative (rating <= 3) and positive (rating >= 4)
/// groups, sorts each ascending by rating then descending by body length,
/// then takes all negatives followed by positives up to `cap`. If the
/// negatives alone meet or exceed `cap`, no positives are included.
pub fn select_reviews(reviews: &[Review], cap: usize) -> Vec<Review> {
    let (mut negative, mut positive): (Vec<Review>, Vec<Review>) =
        reviews.iter().cloned().partition(Review::is_negative);

    let by_rating_then_length =
        |a: &Review, b: &Review| a.rating.cmp(&b.rating).then(b.text.len().cmp(&a.text.len()));
    negative.sort_by(by_rating_then_length);
    positive.sort_by(by_rating_then_length);

    let mut selected = negative;
    if selected.len() < cap {
        let remaining = cap - selected.len();
        selected.extend(positive.into_iter().take(remaining));
    } else {
        selected.truncate(cap);
    }
    selected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
