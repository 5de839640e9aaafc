//! Narrative analysis over the OpenAI structured-output text endpoint.
//!
//! Sends the selected review bodies and gets back a strangeness score,
//! a panel count, and a short narrative as strict-schema JSON.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use oddplate_core::narrative::NarrativeAnalysis;
use oddplate_core::retry::RetryPolicy;

use crate::error::OpenAiError;
use crate::retry::with_retry;

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default text model for review analysis.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";

/// HTTP request timeout for a single analysis attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ANALYSIS_INSTRUCTIONS: &str = r#"You read customer reviews of one place and produce material for a short illustrated comic strip about it.

Rules:
- score: how strange, unusual, or noteworthy the reviews make the place sound, 0 (completely ordinary) to 100 (utterly bizarre). Use the full range.
- panel_count: how many visual beats the story needs, 1 to 4.
- narrative: a short third-person story (2-4 sentences) distilled from the most vivid review details. Concrete and visual; no review quotes, no names of real people.

Return JSON that matches the provided schema."#;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Response shape of `POST /v1/responses`.
#[derive(Debug, Deserialize)]
struct ResponsesCreateResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponseOutputItem>,
}

#[derive(Debug, Deserialize)]
struct ResponseOutputItem {
    #[serde(default)]
    content: Vec<ResponseContentItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentItem {
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(other)]
    Other,
}

fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "score": {"type": "number", "minimum": 0, "maximum": 100},
            "panel_count": {"type": "integer", "minimum": 1, "maximum": 4},
            "narrative": {"type": "string"}
        },
        "required": ["score", "panel_count", "narrative"]
    })
}

/// Pull the structured-output text out of a responses payload and parse it.
fn extract_analysis(parsed: ResponsesCreateResponse) -> Result<NarrativeAnalysis, OpenAiError> {
    let output_text = parsed
        .output_text
        .or_else(|| {
            parsed
                .output
                .iter()
                .flat_map(|item| item.content.iter())
                .find_map(|content| match content {
                    ResponseContentItem::OutputText { text } => Some(text.clone()),
                    ResponseContentItem::Other => None,
                })
        })
        .ok_or_else(|| OpenAiError::Malformed("Response missing output_text".to_string()))?;

    let analysis: NarrativeAnalysis = serde_json::from_str(&output_text)
        .map_err(|e| OpenAiError::Malformed(format!("Bad structured output: {e}")))?;
    analysis
        .validate()
        .map_err(|e| OpenAiError::Malformed(e.to_string()))?;
    Ok(analysis)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the narrative analysis call.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl AnalysisClient {
    /// Create a client with the default base URL and text model.
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
            model: DEFAULT_TEXT_MODEL.to_string(),
            retry,
        }
    }

    /// Analyze review bodies into a score, panel count, and narrative.
    ///
    /// Transient provider failures are retried per the injected policy;
    /// malformed responses surface immediately.
    pub async fn analyze(&self, review_texts: &[String]) -> Result<NarrativeAnalysis, OpenAiError> {
        with_retry(&self.retry, "analyze_reviews", || {
            self.request_analysis(review_texts)
        })
        .await
    }

    /// One attempt against `POST /v1/responses`.
    async fn request_analysis(
        &self,
        review_texts: &[String],
    ) -> Result<NarrativeAnalysis, OpenAiError> {
        let user_input = json!({ "reviews": review_texts }).to_string();
        let body = json!({
            "model": self.model,
            "instructions": ANALYSIS_INSTRUCTIONS,
            "input": [
                {"role": "user", "content": [{"type": "input_text", "text": user_input}]}
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": "review_analysis",
                    "strict": true,
                    "schema": analysis_schema()
                }
            }
        });

        let response = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
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

        let parsed: ResponsesCreateResponse = serde_json::from_str(&text)
            .map_err(|e| OpenAiError::Malformed(format!("Bad responses payload: {e}")))?;
        let analysis = extract_analysis(parsed)?;

        tracing::info!(
            score = analysis.score,
            panel_count = analysis.panel_count,
            "Narrative analysis complete"
        );
        Ok(analysis)
    }
}
