//! The planning-service call interface and its OpenRouter-backed client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use forager_shared::config::PlannerConfig;
use forager_shared::{ForagerError, Result};

/// User-Agent string for planning requests.
const USER_AGENT: &str = concat!("Forager/", env!("CARGO_PKG_VERSION"));

/// Default timeout for planning calls, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature for planning calls.
const TEMPERATURE: f64 = 0.3;

/// One prompt in, one completion text out.
///
/// The planner treats whatever comes back as untrusted: parse failures fall
/// back to deterministic templates, so implementations only need to surface
/// transport-level failures as `Err`.
#[async_trait]
pub trait PlanningClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Chat-completions wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// OpenRouterClient
// ---------------------------------------------------------------------------

/// Live planning client speaking the OpenRouter chat-completions API.
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenRouterClient {
    /// Build a client from the `[planner]` config section; the API key is
    /// read from the env var the config names, never from the config itself.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ForagerError::config(format!(
                "planner API key not found in ${}",
                config.api_key_env
            ))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForagerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Build a client with an explicit key and endpoint (used by tests).
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForagerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl PlanningClient for OpenRouterClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForagerError::Planning(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForagerError::Planning(format!("HTTP {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ForagerError::Planning(format!("bad response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ForagerError::Planning("response had no choices".into()))?;

        debug!(len = content.len(), "planning completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_chat_request_and_extracts_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "temperature": 0.3,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "[\"q1\", \"q2\"]"}}]
            })))
            .mount(&server)
            .await;

        let client =
            OpenRouterClient::new(format!("{}/chat", server.uri()), "test-model", "test-key")
                .unwrap();
        let text = client.complete("plan some queries").await.unwrap();
        assert_eq!(text, "[\"q1\", \"q2\"]");
    }

    #[tokio::test]
    async fn http_error_is_a_planning_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client =
            OpenRouterClient::new(format!("{}/chat", server.uri()), "m", "k").unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, ForagerError::Planning(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_a_planning_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client =
            OpenRouterClient::new(format!("{}/chat", server.uri()), "m", "k").unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
