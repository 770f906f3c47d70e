//! Gemini client. Every call to the image model in Cabide goes through here.
//!
//! Handlers never use this module directly; they reach it through the
//! `ImageGenerator` trait in `generation::generator`.
//!
//! Model: gemini-3-pro-image-preview (fixed, not configurable)
use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The image model used for every generation.
pub const MODEL: &str = "gemini-3-pro-image-preview";
const MAX_RETRIES: u32 = 3;
/// Conjuntos with three reference images regularly take over a minute.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Finish reasons that mean the safety filter ate the output.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "PROHIBITED_CONTENT",
    "RECITATION",
    "IMAGE_RECITATION",
    "BLOCKLIST",
];

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Content blocked: {0}")]
    ContentBlocked(String),

    #[error("Gemini returned no image: {0}")]
    NoImage(String),

    #[error("Failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A reference image sent inline with the instruction.
#[derive(Debug, Clone, Copy)]
pub struct InlineImage<'a> {
    pub mime_type: &'a str,
    pub data: &'a [u8],
}

/// Decoded image returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineDataOut<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataOut<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineDataIn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataIn {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

impl<'a> GenerateContentRequest<'a> {
    /// Instruction first, then the images in role order.
    fn new(instruction: &'a str, images: &[InlineImage<'a>]) -> Self {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(RequestPart::Text { text: instruction });
        for image in images {
            parts.push(RequestPart::InlineData {
                inline_data: InlineDataOut {
                    mime_type: image.mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(image.data),
                },
            });
        }

        Self {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        }
    }
}

impl GenerateContentResponse {
    /// Pulls the first inline image out of the response, surfacing safety blocks.
    pub fn into_image(self) -> Result<GeneratedImage, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::ContentBlocked(format!("prompt blocked: {reason}")));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::NoImage("no candidates in response".to_string()))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKED_FINISH_REASONS.contains(&reason) {
                return Err(GeminiError::ContentBlocked(format!(
                    "generation stopped by safety filter: {reason}"
                )));
            }
        }

        let inline = candidate
            .content
            .into_iter()
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                GeminiError::NoImage(format!(
                    "candidate has no image part (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        let data = base64::engine::general_purpose::STANDARD.decode(inline.data.as_bytes())?;
        Ok(GeneratedImage {
            data,
            mime_type: inline.mime_type,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Gemini `generateContent` endpoint with retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, GeminiError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/models/{MODEL}", self.base_url)
    }

    /// Sends the instruction plus reference images and returns the generated image.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn generate_image(
        &self,
        instruction: &str,
        images: &[InlineImage<'_>],
    ) -> Result<GeneratedImage, GeminiError> {
        let request_body = GenerateContentRequest::new(instruction, images);
        let url = format!("{}:generateContent", self.model_url());

        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GeminiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(GeminiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GeminiError::Api {
                    status: status.as_u16(),
                    message: google_error_message(body),
                });
            }

            let image = parse_image_response(&response.text().await?)?;

            debug!(
                "Gemini call succeeded: {} bytes of {}",
                image.data.len(),
                image.mime_type
            );

            return Ok(image);
        }

        Err(retries_exhausted(last_error))
    }

    /// Cheap connectivity check: fetches the model's metadata.
    pub async fn check_model(&self) -> Result<(), GeminiError> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(GeminiError::Api {
            status: status.as_u16(),
            message: google_error_message(body),
        })
    }
}

fn parse_image_response(body: &str) -> Result<GeneratedImage, GeminiError> {
    serde_json::from_str::<GenerateContentResponse>(body)?.into_image()
}

/// Final error once every attempt failed. A trailing 429 reads as rate limiting.
fn retries_exhausted(last_error: Option<GeminiError>) -> GeminiError {
    match last_error {
        Some(GeminiError::Api { status: 429, .. }) | None => GeminiError::RateLimited {
            retries: MAX_RETRIES,
        },
        Some(other) => other,
    }
}

/// Extracts `error.message` from a Google error body, falling back to the raw body.
fn google_error_message(body: String) -> String {
    serde_json::from_str::<GoogleError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
