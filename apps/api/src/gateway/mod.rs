//! AI Gateway: the single point of entry for all generative-AI calls.
//!
//! No other module talks to the model endpoint directly. Every call carries
//! the credential of the post it is made for; there is no service-wide key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GatewayConfig;

pub mod schema;

pub use schema::Schema;

const PING_PROMPT: &str = "Test request to validate API token";

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport failure or non-success status. `status` is absent when no response arrived.
    #[error("AI gateway request failed")]
    Unavailable { status: Option<u16>, body: Value },

    /// The reply carried no parseable structured content.
    #[error("Failed to parse Gemini API response")]
    MalformedResponse { body: Value },
}

impl GatewayError {
    /// Raw upstream payload, kept for diagnostics.
    pub fn upstream(&self) -> &Value {
        match self {
            GatewayError::Unavailable { body, .. } | GatewayError::MalformedResponse { body } => {
                body
            }
        }
    }

    fn transport(e: reqwest::Error) -> Self {
        GatewayError::Unavailable {
            status: None,
            body: Value::String(e.without_url().to_string()),
        }
    }
}

/// Structured-output generation against an external model.
///
/// Carried in `AppState` as `Arc<dyn Gateway>`.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Sends `prompt` constrained by `schema` and returns the parsed JSON the model produced.
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        schema: &Schema,
    ) -> Result<Value, GatewayError>;

    /// Minimal one-token call; true when the upstream accepts `credential`.
    async fn validate_credential(&self, credential: &str) -> bool;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl<'a> GenerateContentRequest<'a> {
    fn structured(prompt: &'a str, schema: &'a Schema) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
                ..Default::default()
            },
        }
    }

    fn ping() -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: PING_PROMPT }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: Some(1),
                ..Default::default()
            },
        }
    }
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
}

impl GeminiClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            url: content_url(config),
        })
    }

    pub fn model_url(&self) -> &str {
        &self.url
    }

    async fn post(
        &self,
        credential: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<(u16, Value), GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", credential)])
            .json(request)
            .send()
            .await
            .map_err(GatewayError::transport)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(GatewayError::transport)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, body))
    }
}

#[async_trait]
impl Gateway for GeminiClient {
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        schema: &Schema,
    ) -> Result<Value, GatewayError> {
        let request = GenerateContentRequest::structured(prompt, schema);
        let (status, body) = self.post(credential, &request).await?;

        if !(200..300).contains(&status) {
            warn!("AI gateway returned status {status}");
            return Err(GatewayError::Unavailable {
                status: Some(status),
                body,
            });
        }

        let parsed = parse_generation(body)?;
        debug!("AI gateway call succeeded");
        Ok(parsed)
    }

    async fn validate_credential(&self, credential: &str) -> bool {
        match self.post(credential, &GenerateContentRequest::ping()).await {
            Ok((status, _)) => (200..300).contains(&status),
            Err(e) => {
                warn!("Credential check could not reach the AI gateway: {e}");
                false
            }
        }
    }
}

fn content_url(config: &GatewayConfig) -> String {
    format!(
        "{}/v1beta/models/{}:{}",
        config.endpoint.trim_end_matches('/'),
        config.model_id,
        config.generate_content_api
    )
}

/// Pulls the first candidate's first text part and parses it as JSON.
fn parse_generation(body: Value) -> Result<Value, GatewayError> {
    let parsed = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .and_then(|text| serde_json::from_str::<Value>(strip_json_fences(text)).ok());

    match parsed {
        Some(value) if !is_empty_value(&value) => Ok(value),
        _ => {
            warn!("AI gateway reply had no usable structured content");
            Err(GatewayError::MalformedResponse { body })
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Canned gateway: replays one reply for every call and records prompts.
    pub struct StubGateway {
        reply: Result<Value, GatewayError>,
        accepts_credentials: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGateway {
        pub fn replying(reply: Value) -> Self {
            Self {
                reply: Ok(reply),
                accepts_credentials: true,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: GatewayError) -> Self {
            Self {
                reply: Err(error),
                accepts_credentials: true,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn rejecting_credentials() -> Self {
            Self {
                reply: Ok(Value::Null),
                accepts_credentials: false,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for StubGateway {
        async fn generate(
            &self,
            _credential: &str,
            prompt: &str,
            _schema: &Schema,
        ) -> Result<Value, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        async fn validate_credential(&self, _credential: &str) -> bool {
            self.accepts_credentials
        }
    }
}
