//! Comic synthesis over the OpenAI images endpoint.
//!
//! The provider returns a temporary fetch URL (or an inline base64
//! payload); the wrapper always resolves to raw bitmap bytes before
//! returning, since the provider's URL is not guaranteed to stay valid.

use std::time::Duration;

use base64::engine::general_purpose;
use base64::Engine;
use serde::{Deserialize, Serialize};

use oddplate_core::retry::RetryPolicy;

use crate::analyzer::DEFAULT_BASE_URL;
use crate::error::OpenAiError;
use crate::retry::with_retry;

/// Default image model. Chosen for lowest unit cost.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Fixed square output resolution.
pub const IMAGE_SIZE: &str = "1024x1024";

/// HTTP request timeout for a single synthesis attempt. Image generation
/// routinely takes tens of seconds.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/images/generations`.
#[derive(Debug, Serialize)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    /// "standard" is the cheapest tier.
    quality: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagesGenerateResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the image synthesis call.
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl ImageClient {
    /// Create a client with the default base URL and image model.
    pub fn new(api_key: String, retry: RetryPolicy) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, retry)
    }

    /// Create a client targeting a custom base URL (tests, proxies).
    pub fn with_base_url(base_url: String, api_key: String, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url,
            api_key,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            retry,
        }
    }

    /// Generate a bitmap for the prompt and return its raw bytes.
    ///
    /// Transient failures are retried per the injected policy. A
    /// [`OpenAiError::ContentPolicy`] rejection surfaces immediately so
    /// the caller can decide whether to try a different prompt; this
    /// wrapper never substitutes prompts on its own.
    pub async fn generate(&self, prompt: &str, panel_count: u8) -> Result<Vec<u8>, OpenAiError> {
        tracing::info!(
            panel_count,
            prompt_chars = prompt.len(),
            "Requesting image synthesis"
        );
        with_retry(&self.retry, "generate_image", || self.request_image(prompt)).await
    }

    /// One attempt: submit the prompt, then resolve the result to bytes.
    async fn request_image(&self, prompt: &str) -> Result<Vec<u8>, OpenAiError> {
        let body = ImagesGenerateRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            quality: "standard",
            response_format: "url",
        };

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(OpenAiError::from_transport)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(OpenAiError::from_transport)?;
        if !status.is_success() {
            return Err(OpenAiError::from_status(status.as_u16(), &text));
        }

        let parsed: ImagesGenerateResponse = serde_json::from_str(&text)
            .map_err(|e| OpenAiError::Malformed(format!("Bad images payload: {e}")))?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| OpenAiError::Malformed("No image data returned".to_string()))?;

        if let Some(b64) = first.b64_json {
            return general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| OpenAiError::Malformed(format!("Bad base64 image: {e}")));
        }

        let url = first
            .url
            .ok_or_else(|| OpenAiError::Malformed("Image missing both url and b64_json".to_string()))?;
        self.download(&url).await
    }

    /// Fetch the generated bitmap from the provider's temporary URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, OpenAiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(OpenAiError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            // A dead temporary URL is worth one fresh generation attempt.
            return Err(OpenAiError::Transient(format!(
                "Image download failed with HTTP {status}"
            )));
        }
        let bytes = response.bytes().await.map_err(OpenAiError::from_transport)?;
        Ok(bytes.to_vec())
    }
}
