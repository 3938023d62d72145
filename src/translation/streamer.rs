/*!
 * Completion streamer: one document, one streaming request.
 *
 * Fragments are appended in arrival order and echoed through a callback.
 * Only after the backend reports completion is the text post-processed and
 * handed back; any error along the way aborts with nothing returned.
 */

use futures::StreamExt;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::StreamingError;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::translation::postprocess::{ReasoningTraceStripper, ResponsePostProcessor};
use crate::translation::prompts::PromptPolicy;

/// Per-request buffer of received fragments
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    fragments: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Drives a single translation request against a completion provider
#[derive(Debug, Clone)]
pub struct CompletionStreamer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
    policy: PromptPolicy,
    source_language: String,
    target_language: String,
    post_processor: Arc<dyn ResponsePostProcessor>,
}

impl CompletionStreamer {
    /// Create a streamer with the default prompt, zero temperature and
    /// reasoning-trace stripping.
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            policy: PromptPolicy::default(),
            source_language: "English".to_string(),
            target_language: "Vietnamese".to_string(),
            post_processor: Arc::new(ReasoningTraceStripper::default()),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn policy(mut self, policy: PromptPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Language names as they should appear in the prompt
    pub fn languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_language = source.into();
        self.target_language = target.into();
        self
    }

    pub fn post_processor(mut self, post_processor: Arc<dyn ResponsePostProcessor>) -> Self {
        self.post_processor = post_processor;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Build the request that `translate` would send
    pub fn build_request(&self, escaped_document: &str) -> CompletionRequest {
        let prompt = self.policy.render(escaped_document, &self.source_language, &self.target_language);
        CompletionRequest::new(self.model.clone(), self.temperature, prompt)
    }

    /// Translate one escaped document.
    ///
    /// `on_fragment` sees every fragment as it arrives. The returned text is
    /// the post-processed completion, still escaped.
    pub async fn translate<F>(&self, escaped_document: &str, mut on_fragment: F) -> Result<String, StreamingError>
    where
        F: FnMut(&str),
    {
        let started = Instant::now();
        let request = self.build_request(escaped_document);

        let mut stream = self.provider.stream_completion(request).await?;
        let mut accumulator = StreamAccumulator::new();
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            on_fragment(&fragment);
            accumulator.push(&fragment);
        }

        debug!(
            "{}: {} fragments, {} bytes in {:.1}s",
            self.provider.name(),
            accumulator.fragment_count(),
            accumulator.as_str().len(),
            started.elapsed().as_secs_f64()
        );

        Ok(self.post_processor.finalize(accumulator.into_text()))
    }
}
