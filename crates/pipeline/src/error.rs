//! Caller-facing error taxonomy for the pipeline.
//!
//! Every terminal failure is distinguishable by kind so an outer transport
//! can map them to distinct user-facing messages. The pipeline itself
//! knows nothing about HTTP status codes; that mapping belongs to the
//! transport boundary.

/// Errors surfaced by the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The place directory has no record for this id.
    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    /// Too few reviews before or after filtering.
    #[error("Insufficient reviews for generation: found {found}, need at least {required}")]
    InsufficientContent { found: usize, required: usize },

    /// The place directory failed for a reason other than a missing
    /// record (network, auth, 5xx).
    #[error("Place directory failed: {0}")]
    Directory(String),

    /// The narrative analysis provider failed after retries.
    #[error("Narrative analysis failed: {0}")]
    Analysis(String),

    /// The image provider failed after retries.
    #[error("Image synthesis failed: {0}")]
    Synthesis(String),

    /// The image provider refused the prompt content. The orchestrator
    /// tries the generic fallback prompt exactly once; a second rejection
    /// surfaces as this error.
    #[error("Image provider rejected the prompt content: {0}")]
    ContentPolicy(String),

    /// Caption compositing failed (decode, layout, or encode).
    #[error("Caption compositing failed: {0}")]
    Compositing(String),

    /// Cache or blob store write failed. Leaderboard failures never
    /// surface here; they are logged and reported in the outcome.
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Coarse classification for the transport boundary's status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No such place (404-equivalent).
    NotFound,
    /// The request cannot produce content (400-equivalent).
    BadInput,
    /// An upstream AI provider failed (502-equivalent).
    UpstreamFailure,
    /// Our own storage failed (500-equivalent).
    Storage,
}

impl PipelineError {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlaceNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientContent { .. } => ErrorKind::BadInput,
            Self::Directory(_) | Self::Analysis(_) | Self::Synthesis(_) | Self::ContentPolicy(_) => {
                ErrorKind::UpstreamFailure
            }
            Self::Compositing(_) | Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_content_message_carries_the_count() {
        let err = PipelineError::InsufficientContent {
            found: 3,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient reviews for generation: found 3, need at least 5"
        );
    }

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(
            PipelineError::PlaceNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PipelineError::InsufficientContent {
                found: 0,
                required: 5
            }
            .kind(),
            ErrorKind::BadInput
        );
        assert_eq!(
            PipelineError::ContentPolicy("no".into()).kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            PipelineError::Storage("disk".into()).kind(),
            ErrorKind::Storage
        );
    }
}
