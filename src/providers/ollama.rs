use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::openai::{send_error, status_error};
use crate::providers::stream::{decode_fragments, response_bytes, Decoded, LineProtocol};
use crate::providers::{CompletionProvider, CompletionRequest, FragmentStream};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    pub model: String,
    /// Messages of the conversation
    pub messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
    /// Whether to stream the response
    pub stream: bool,
}

impl From<&CompletionRequest> for ChatRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            options: Some(GenerationOptions {
                temperature: Some(request.temperature),
            }),
            stream: true,
        }
    }
}

/// One JSON line of a streamed chat response
#[derive(Debug, Deserialize)]
pub struct ChatStreamLine {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON-lines framing used by `/api/chat`
#[derive(Debug, Default)]
pub struct JsonLinesProtocol;

impl LineProtocol for JsonLinesProtocol {
    fn on_line(&mut self, line: &str) -> Result<Vec<Decoded>, ProviderError> {
        if line.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parsed: ChatStreamLine = serde_json::from_str(line)
            .map_err(|e| ProviderError::ParseError(format!("Malformed Ollama stream line ({}): {}", e, line)))?;

        if let Some(message) = parsed.error {
            return Err(ProviderError::RequestFailed(format!("Ollama reported: {}", message)));
        }

        let mut decoded = Vec::new();
        if let Some(message) = parsed.message {
            if !message.content.is_empty() {
                decoded.push(Decoded::Fragment(message.content));
            }
        }
        if parsed.done {
            decoded.push(Decoded::Done);
        }
        Ok(decoded)
    }

    fn on_end(&mut self) -> Result<Vec<Decoded>, ProviderError> {
        Err(ProviderError::ConnectionError(
            "Ollama stream closed before the final message".to_string(),
        ))
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Force HTTP/1.1 - Ollama uses HTTP/1.1
                .http1_only()
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for Ollama {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn stream_completion(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError> {
        let body = ChatRequest::from(&request);
        debug!("Ollama: streaming chat with {}", body.model);

        let response = self.client.post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("Ollama", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        Ok(decode_fragments(response_bytes(response), JsonLinesProtocol))
    }
}
