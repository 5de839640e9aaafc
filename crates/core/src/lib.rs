//! Pure domain logic for the comic generation pipeline.
//!
//! Everything in this crate is side-effect free: review selection, content
//! filtering, prompt construction, caption layout, leaderboard key
//! derivation, and the retry policy. I/O lives in the sibling crates.

pub mod content_filter;
pub mod error;
pub mod narrative;
pub mod overlay;
pub mod prompt;
pub mod ranking;
pub mod retry;
pub mod review;
pub mod types;

pub use error::CoreError;
