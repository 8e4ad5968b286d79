//! Gemini `generateContent` client for image extraction.

use std::env;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::ExtractionConfig;
use crate::error::{LexiError, Result};
use crate::transfer::extract::{generate_content_text, ImageInput, TextExtractor};

/// Blocking client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiExtractor {
    /// Build a client from configuration. The API key is read from the
    /// environment variable named by `api_key_env`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LexiError::config(format!(
                    "set {} to use image import",
                    config.api_key_env
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LexiError::external_service(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }

    fn request_body(prompt: &str, image: &ImageInput) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": BASE64.encode(&image.bytes),
                        }
                    }
                ]
            }]
        })
    }
}

fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "invalid request to the extraction service, check the image format".to_string(),
        401 | 403 => "API key rejected by the extraction service".to_string(),
        429 => "extraction service rate limit exceeded, try again later".to_string(),
        _ => format!("extraction service request failed: {}", status),
    }
}

impl TextExtractor for GeminiExtractor {
    fn extract_text(&self, prompt: &str, image: &ImageInput) -> Result<String> {
        tracing::info!(mime = image.mime_type, bytes = image.bytes.len(), "sending image for extraction");

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt, image))
            .send()
            .map_err(|e| LexiError::external_service(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LexiError::external_service(status_message(status)));
        }

        let body: Value = response.json().map_err(|e| {
            LexiError::external_service(format!("unreadable extraction response: {e}"))
        })?;
        generate_content_text(&body)
    }
}
