use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::stream::{decode_fragments, response_bytes, Decoded, LineProtocol};
use crate::providers::{CompletionProvider, CompletionRequest, FragmentStream};

/// Client for OpenAI-compatible chat completion endpoints
///
/// Works with the Hugging Face inference router, OpenAI itself and local
/// servers such as LM Studio.
#[derive(Debug)]
pub struct OpenAICompatible {
    /// Display name used in logs
    name: String,
    /// HTTP client for API requests
    client: Client,
    /// Bearer token, may be empty for local servers
    api_key: String,
    /// Base URL including the version path, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Streaming chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    pub model: String,
    /// The conversation, a single user turn for translation
    pub messages: Vec<ChatMessage>,
    /// Temperature for generation
    pub temperature: f32,
    /// Always true, fragments are consumed as they arrive
    pub stream: bool,
}

impl From<&CompletionRequest> for ChatCompletionRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            stream: true,
        }
    }
}

/// One `data:` payload of the event stream
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Some servers report failures in-band after the stream started
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Server-Sent Events framing of chat completion chunks
#[derive(Debug, Default)]
pub struct SseProtocol {
    /// `data:` lines of the event being assembled
    data: Vec<String>,
    /// Whether any choice carried a finish reason
    finished: bool,
}

impl SseProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatch(&mut self) -> Result<Vec<Decoded>, ProviderError> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }
        let payload = self.data.join("\n");
        self.data.clear();

        if payload.trim() == "[DONE]" {
            return Ok(vec![Decoded::Done]);
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(&payload).map_err(|e| {
            ProviderError::ParseError(format!("Malformed stream chunk ({}): {}", e, truncate(&payload)))
        })?;

        if let Some(err) = chunk.error {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(ProviderError::RequestFailed(format!("Error reported mid-stream: {}", message)));
        }

        let mut decoded = Vec::new();
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    decoded.push(Decoded::Fragment(content));
                }
            }
            if choice.finish_reason.is_some() {
                self.finished = true;
            }
        }
        Ok(decoded)
    }
}

impl LineProtocol for SseProtocol {
    fn on_line(&mut self, line: &str) -> Result<Vec<Decoded>, ProviderError> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return Ok(Vec::new());
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // event:, id: and retry: fields carry nothing we use
        Ok(Vec::new())
    }

    fn on_end(&mut self) -> Result<Vec<Decoded>, ProviderError> {
        let decoded = self.dispatch()?;
        if decoded.contains(&Decoded::Done) || self.finished {
            return Ok(decoded);
        }
        Err(ProviderError::ConnectionError(
            "Stream closed before the completion finished".to_string(),
        ))
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Map a non-success HTTP status to a provider error
pub fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

/// Map a reqwest send failure to a provider error
pub fn send_error(name: &str, e: reqwest::Error) -> ProviderError {
    if e.is_connect() || e.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", name, e))
    } else {
        ProviderError::RequestFailed(format!("Failed to send request to {}: {}", name, e))
    }
}

impl OpenAICompatible {
    /// Create a new client
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Full URL of the chat completions route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompatible {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_completion(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError> {
        let body = ChatCompletionRequest::from(&request);
        debug!("{}: streaming {} with temperature {}", self.name, body.model, body.temperature);

        let mut builder = self.client.post(self.completions_url())
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| send_error(&self.name, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.name, status, error_text);
            return Err(status_error(status, error_text));
        }

        Ok(decode_fragments(response_bytes(response), SseProtocol::new()))
    }
}
