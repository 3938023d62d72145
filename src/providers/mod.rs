/*!
 * Provider implementations for streaming completions.
 *
 * This module contains client implementations for the completion backends:
 * - OpenAI-compatible: Hugging Face router, OpenAI, LM Studio (Server-Sent Events)
 * - Ollama: Local LLM server (JSON lines)
 * - Mock: Scripted fragments for tests and dry runs
 */

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Incremental text fragments of one completion, in arrival order
pub type FragmentStream = BoxStream<'static, Result<String, ProviderError>>;

/// A single streaming completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier understood by the backend
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// The full user prompt
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, temperature: f32, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature,
            prompt: prompt.into(),
        }
    }
}

/// Common trait for all completion backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the completion streamer.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Human readable backend name for logs
    fn name(&self) -> &str;

    /// Start a streaming completion
    ///
    /// # Returns
    /// * `Ok(FragmentStream)` once the backend accepted the request. Errors that
    ///   happen after that point arrive as `Err` items on the stream.
    async fn stream_completion(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError>;
}

/// Build the provider selected in the translation config
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let api_key = config.get_api_key();
    let needs_key = matches!(config.provider, TranslationProvider::HuggingFace | TranslationProvider::OpenAI);
    if needs_key && api_key.is_empty() {
        return Err(ProviderError::AuthenticationError(format!(
            "No API key for {} (set it in the config or via {})",
            config.provider.display_name(),
            config.provider.api_key_env_var().unwrap_or("the environment"),
        )));
    }
    Ok(client_for(config, api_key))
}

/// Build the selected provider without requiring credentials.
///
/// Only for runs that never send a request, such as a dry run; a hosted
/// provider built this way fails with an authentication error if used.
pub fn build_provider_without_credentials(config: &TranslationConfig) -> Arc<dyn CompletionProvider> {
    client_for(config, config.get_api_key())
}

fn client_for(config: &TranslationConfig, api_key: String) -> Arc<dyn CompletionProvider> {
    let timeout_secs = config.get_timeout_secs();
    match config.provider {
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(config.get_endpoint(), timeout_secs)),
        TranslationProvider::HuggingFace | TranslationProvider::OpenAI | TranslationProvider::LMStudio => {
            Arc::new(openai::OpenAICompatible::new(
                config.provider.display_name(),
                config.get_endpoint(),
                api_key,
                timeout_secs,
            ))
        }
    }
}

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod stream;
