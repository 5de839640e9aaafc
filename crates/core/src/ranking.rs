//! Leaderboard sort-key derivation.
//!
//! The leaderboard store only guarantees retrieval in ascending key order,
//! so the sortable key component is `(ceiling - score)` rendered as a
//! fixed-width string: a naturally ascending key scan yields descending
//! score order. The place id is appended as a tiebreak suffix so two
//! places with equal scores still produce distinct keys.

/// Fixed constant subtracted from the score to invert sort order.
/// Must exceed the maximum possible score (100).
pub const SORT_KEY_CEILING: f64 = 1000.0;

/// Separator between the inverted-score component and the tiebreak suffix.
pub const SORT_KEY_SEPARATOR: char = '#';

/// Derive the sortable leaderboard key for a score.
///
/// The inverted score is zero-padded to a fixed 12-character width with
/// five decimal places, so lexicographic order equals numeric order.
pub fn score_to_sort_key(score: f64, place_id: &str) -> String {
    format!(
        "{:012.5}{SORT_KEY_SEPARATOR}{place_id}",
        SORT_KEY_CEILING - score
    )
}
