// Gemini client - Google AI Studio API integration.
//
// Implements the `TextGenerator` trait against the Gemini
// `generateContent` endpoint (https://ai.google.dev/api/generate-content).
//
// **API quirks worth knowing:**
// - Authentication: the API key is passed as a query parameter (`?key=`),
//   not a Bearer token.
// - Request format: `contents[]` with nested `parts`; sampling options go
//   in `generationConfig`.
// - Response format: the text lives at `candidates[0].content.parts[0].text`.

use crate::core::ai::{GenerationOptions, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

/// Client for Google's Gemini API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: options.map(|opts| GenerationConfig {
                temperature: opts.temperature,
                top_p: opts.top_p,
                top_k: opts.top_k,
                max_output_tokens: opts.max_output_tokens,
            }),
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "Sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            // Prefer the structured error message when the body parses
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(
                    format!("Gemini API error ({}): {}", status, error_response.error.message)
                        .into(),
                );
            }

            return Err(format!("Gemini API error: {} - {}", status, error_text).into());
        }

        let response_json: GenerateContentResponse = response.json().await?;

        let text = response_json
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.content.parts.first())
            .and_then(|part| part.text.clone())
            .ok_or(
                "No content in Gemini response - the model may have been blocked by safety filters",
            )?;

        Ok(text)
    }
}
