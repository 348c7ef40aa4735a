use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};
use thiserror::Error;

pub const TEMPERATURE: f64 = 0.2;

/// Binary attachment sent as an `inline_data` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini request failed")]
    Transport(#[source] reqwest::Error),
    #[error("API Error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Gemini returned invalid JSON payload")]
    InvalidJson(#[from] serde_json::Error),
    #[error("empty response from Gemini")]
    EmptyResponse,
}

impl From<reqwest::Error> for GeminiError {
    // The request URL carries the API key as a query parameter.
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Transport(err.without_url())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_base: String,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(api_base: &str) -> anyhow::Result<Self> {
        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_http_client(api_base, http))
    }

    pub fn with_http_client(api_base: &str, http: HttpClient) -> Self {
        Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Sends one `generateContent` request and returns the first text part
    /// of the first candidate, unmodified.
    pub fn generate_text(
        &self,
        model: &str,
        api_key: &str,
        prompt: &str,
        inline: Option<&InlineData>,
    ) -> Result<String, GeminiError> {
        let endpoint = self.endpoint_for_model(model);
        let payload = build_payload(prompt, inline);
        log::debug!("POST {endpoint} ({} prompt bytes)", prompt.len());

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = serde_json::from_str(&body)?;
        first_text_part(&parsed).ok_or(GeminiError::EmptyResponse)
    }
}

pub fn build_payload(prompt: &str, inline: Option<&InlineData>) -> Value {
    let mut parts = vec![json!({ "text": prompt })];
    if let Some(inline) = inline.filter(|inline| !inline.data.is_empty()) {
        parts.push(json!({
            "inline_data": {
                "mime_type": inline.mime_type,
                "data": BASE64.encode(&inline.data),
            }
        }));
    }
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "temperature": TEMPERATURE },
    })
}

/// `None` when there are no candidates or the first one has no parts. A
/// first part without `text` yields an empty string.
pub fn first_text_part(response: &Value) -> Option<String> {
    let candidate = response.get("candidates")?.as_array()?.first()?;
    let part = candidate
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?;
    Some(
        part.get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    )
}
