//! Error classification for the AI provider wrappers.
//!
//! Transient failures (rate limits, timeouts, 5xx) are retried; a
//! content-policy rejection means the *input* must change and is never
//! retried with the same prompt.

use serde::Deserialize;

/// Errors from the OpenAI provider layer.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// Expected to succeed on retry without any input change.
    #[error("Transient provider failure: {0}")]
    Transient(String),

    /// The provider refused the request content. Requires changing the
    /// prompt, not retrying it.
    #[error("Content policy rejection: {0}")]
    ContentPolicy(String),

    /// Any other provider error (bad request, auth, quota exhausted).
    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider returned 2xx but the body was not what we expected.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Standard OpenAI error envelope: `{"error": {"message", "code", ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl OpenAiError {
    /// Whether retrying the identical request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify a transport-level failure from `reqwest`.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::Transient(e.to_string())
        } else {
            Self::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }

    /// Classify a non-2xx response from its status code and body.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error);

        if let Some(ref err) = parsed {
            let code = err.code.as_deref().unwrap_or("");
            let kind = err.kind.as_deref().unwrap_or("");
            if code == "content_policy_violation" || kind == "image_generation_user_error" {
                return Self::ContentPolicy(err.message.clone());
            }
        }

        if status == 429 || status >= 500 {
            return Self::Transient(format!("HTTP {status}: {body}"));
        }

        Self::Api {
            status,
            message: parsed.map(|e| e.message).unwrap_or_else(|| body.to_string()),
        }
    }
}
