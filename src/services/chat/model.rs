// src/services/chat/model.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::common::error::AppError;

pub const EMPTY_REPLY: &str = "(Không có phản hồi)";

/// Modelo generativo de texto: manda o prompt, recebe o texto.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

// ---
// Cliente da API Generative Language (Gemini)
// ---

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Falha ao criar cliente HTTP: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ModelError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ModelError(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelError(e.to_string()))?;

        Ok(parsed.first_text().unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}
