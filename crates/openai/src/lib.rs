//! Wrappers for the two external AI collaborators: narrative analysis
//! (text) and comic synthesis (image). Both carry transient-failure retry
//! driven by an injected [`oddplate_core::retry::RetryPolicy`]; the image
//! client additionally classifies content-policy rejections so the
//! pipeline can fall back to a generic prompt.

pub mod analyzer;
pub mod error;
pub mod images;
pub mod retry;

pub use analyzer::AnalysisClient;
pub use error::OpenAiError;
pub use images::ImageClient;
