//! Text recognition collaborator boundary.
//!
//! Recognition is an assumed external capability, not something this crate
//! implements: the trait treats it as a black box that either returns
//! positioned text fragments or fails. Failure (including timeout and an
//! empty result) is a normal, handled input — the orchestrator falls back to
//! the fixed-ratio layout instead of surfacing an error.

use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::TextFragment;
use crate::error::PancartaError;
use crate::resolve::{encode_png, png_data_uri};

/// Default wall-clock limit for one recognition call.
pub const DEFAULT_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default language pair requested from the recognition service.
pub const DEFAULT_LANGUAGES: &str = "jpn+eng";

/// External text-recognition capability.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in the image, returning fragments with bounding boxes
    /// in the image's own pixel coordinates and confidence in `[0, 100]`.
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<TextFragment>, PancartaError>;
}

/// Recognizer that never finds anything.
///
/// Useful as the default collaborator when no recognition service is
/// configured: every edit without user coordinates then lands on the
/// fixed-ratio fallback.
pub struct NullRecognizer;

#[async_trait]
impl TextRecognizer for NullRecognizer {
    async fn recognize(&self, _image: &RgbImage) -> Result<Vec<TextFragment>, PancartaError> {
        Ok(Vec::new())
    }
}

#[derive(Serialize)]
struct RecognitionRequest<'a> {
    image: &'a str,
    languages: &'a str,
}

#[derive(Deserialize)]
struct RecognitionResponse {
    fragments: Vec<TextFragment>,
}

/// HTTP client for a text-recognition service.
///
/// Posts the raster as a PNG data URI and expects a JSON body of the shape
/// `{"fragments": [{"text", "x", "y", "width", "height", "confidence"}]}`.
pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
    languages: String,
}

impl HttpRecognizer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PancartaError> {
        Self::with_timeout(endpoint, DEFAULT_RECOGNITION_TIMEOUT)
    }

    /// Build with an explicit per-call timeout. A timed-out call surfaces as
    /// a recognition error, which the orchestrator treats as "no regions".
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PancartaError> {
        let client = reqwest::Client::builder()
            .user_agent("pancarta/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| PancartaError::Recognition(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            languages: DEFAULT_LANGUAGES.to_string(),
        })
    }

    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }
}

#[async_trait]
impl TextRecognizer for HttpRecognizer {
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<TextFragment>, PancartaError> {
        let png = encode_png(image)?;
        let uri = png_data_uri(&png);
        let request = RecognitionRequest {
            image: &uri,
            languages: &self.languages,
        };

        debug!(endpoint = %self.endpoint, languages = %self.languages, "recognition request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| PancartaError::Recognition(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PancartaError::Recognition(format!(
                "service returned HTTP {}",
                response.status()
            )));
        }

        let body: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| PancartaError::Recognition(format!("bad response body: {}", e)))?;

        Ok(body.fragments)
    }
}
