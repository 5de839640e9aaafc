//! REST client for the external place/review directory.
//!
//! Wraps the directory's place-details endpoint using [`reqwest`]. A
//! missing place is a distinct error from a transport failure so the
//! pipeline can surface "place not found" separately from "upstream
//! unavailable".

use std::time::Duration;

use serde::Deserialize;

use oddplate_core::review::Review;
use oddplate_core::types::Timestamp;

/// HTTP request timeout for directory lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the pipeline needs to know about a place.
#[derive(Debug, Clone)]
pub struct PlaceDetails {
    pub place_id: String,
    pub display_name: String,
    pub address: String,
    /// Coarse geographic grouping key used to partition the leaderboard.
    pub region_code: String,
    pub reviews: Vec<Review>,
}

/// Errors from the place directory layer.
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    /// The directory has no record for this place id.
    #[error("Place not found: {0}")]
    NotFound(String),

    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The directory returned a non-2xx status other than 404.
    #[error("Place directory error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    display_name: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    region_code: String,
    #[serde(default)]
    reviews: Vec<ReviewPayload>,
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    text: String,
    rating: u8,
    time: Timestamp,
}

impl From<ReviewPayload> for Review {
    fn from(payload: ReviewPayload) -> Self {
        Review {
            author: payload.author_name,
            text: payload.text,
            rating: payload.rating,
            time: payload.time,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the place directory.
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    /// Create a new directory client.
    ///
    /// * `base_url` - Directory API base URL, without a trailing slash.
    /// * `api_key`  - Credential sent on every request.
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Fetch a place's display name, address, region, and reviews.
    ///
    /// Sends `GET /places/{place_id}`. A 404 maps to
    /// [`PlacesError::NotFound`].
    pub async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let response = self
            .client
            .get(format!("{}/places/{place_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PlacesError::NotFound(place_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let payload: PlaceDetailsResponse = response.json().await?;
        tracing::debug!(
            place_id,
            review_count = payload.reviews.len(),
            "Fetched place details"
        );

        Ok(PlaceDetails {
            place_id: place_id.to_string(),
            display_name: payload.display_name,
            address: payload.formatted_address,
            region_code: payload.region_code,
            reviews: payload.reviews.into_iter().map(Review::from).collect(),
        })
    }
}
