//! Azure OpenAI Provider Implementation
//!
//! Sends chat-completion requests to an Azure OpenAI deployment.
//!
//! # Features
//!
//! - Async HTTP communication with the chat completions API
//! - Explicit request and connect timeouts
//! - Private-endpoint routing (FQDN override and pinned address)
//! - Status codes mapped onto distinct error variants, no retries
//!
//! # Examples
//!
//! ```no_run
//! use rankright_llm::{AzureOpenAiProvider, GatewayConfig};
//!
//! let config = GatewayConfig::new("https://myres.openai.azure.com", "api-key");
//! let provider = AzureOpenAiProvider::new(config).unwrap();
//! ```

use crate::config::GatewayConfig;
use crate::prompt::connection_test_request;
use crate::LlmError;
use rankright_domain::traits::{ChatRequest, LlmProvider};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Longest slice of an error body carried into error messages
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Azure OpenAI chat-completions provider
pub struct AzureOpenAiProvider {
    config: GatewayConfig,
    url: Url,
    client: reqwest::Client,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl AzureOpenAiProvider {
    /// Create a provider from a validated config
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` listing every config issue, or if the
    /// HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, LlmError> {
        config.validate()?;

        let endpoint = config.effective_endpoint()?;
        let url = completions_url(&endpoint, &config.deployment, &config.api_version)?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("rankright/", env!("CARGO_PKG_VERSION")));

        if let Some((host, addr)) = config.pinned_address(&endpoint)? {
            debug!(%host, %addr, "Pinning model host to private address");
            builder = builder.resolve(&host, addr);
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, url, client })
    }

    /// Full chat-completions URL requests are sent to
    pub fn completions_url(&self) -> &Url {
        &self.url
    }

    /// Settings this provider was built from
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Issue a tiny completion to verify credentials and network path
    pub async fn test_connection(&self) -> Result<(), LlmError> {
        self.send(&connection_test_request()).await.map(|_| ())
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(Message {
                role: "system",
                content: &request.system,
            });
        }
        messages.push(Message {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatCompletionBody {
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .client
            .post(self.url.clone())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            let err = classify_status(status, retry_after, &text, &self.config.deployment);
            warn!(status = status.as_u16(), error = %err, "Model request rejected");
            return Err(err);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("unreadable completion body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("completion had no content".to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Network(format!(
                "request to {} timed out after {}s",
                self.url.host_str().unwrap_or("model endpoint"),
                self.config.request_timeout_secs
            ))
        } else if err.is_connect() {
            LlmError::Network(format!("could not connect to model endpoint: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl LlmProvider for AzureOpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        self.send(request).await
    }
}

/// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
fn completions_url(endpoint: &Url, deployment: &str, api_version: &str) -> Result<Url, LlmError> {
    let base = endpoint.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!(
        "{}/openai/deployments/{}/chat/completions",
        base, deployment
    ))
    .map_err(|e| LlmError::Config(format!("invalid completions URL: {}", e)))?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

/// Map a non-success status onto an error variant
fn classify_status(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    deployment: &str,
) -> LlmError {
    let detail: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();

    match status {
        StatusCode::UNAUTHORIZED => {
            LlmError::Auth(format!("API key rejected (HTTP 401): {}", detail))
        }
        StatusCode::NOT_FOUND => LlmError::Auth(format!(
            "deployment '{}' not found (HTTP 404): {}",
            deployment, detail
        )),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimit { retry_after },
        StatusCode::FORBIDDEN => LlmError::Network(format!(
            "access denied by firewall or virtual network rules (HTTP 403): {}",
            detail
        )),
        other => LlmError::Network(format!("HTTP {}: {}", other.as_u16(), detail)),
    }
}
