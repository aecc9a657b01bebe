//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for Google's Gemini generative-language
//! API, the primary vendor in the fallback chain. It implements the
//! `GenerationProvider` port from the `core` crate over plain HTTP, since the
//! vendor has no OpenAI-compatible endpoint.

use coursecraft_core::ports::{GenerationProvider, GenerationRequest, PortError, PortResult};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationProvider` against the Gemini
/// `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiAdapter {
    http: Client,
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. `base_url` overrides the Google
    /// endpoint, which the test suite uses to point at a local mock server.
    pub fn new(http: Client, api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            self.model.strip_prefix("models/").unwrap_or(&self.model)
        )
    }
}

//=========================================================================================
// `GenerationProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationProvider for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> PortResult<String> {
        let mut payload = json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens,
            },
        });
        if let Some(system) = &request.system {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Provider(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Provider(format!(
                "Gemini error [{status}]: {body}"
            )));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Provider(format!("Gemini response was not JSON: {e}")))?;

        let text = data["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PortError::Provider(
                "Gemini returned no candidate text".to_string(),
            ));
        }
        Ok(text)
    }
}
