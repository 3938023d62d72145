/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different streaming behaviors:
 * - `MockProvider::scripted(..)` - Streams a fixed list of fragments
 * - `MockProvider::failing_after(..)` - Streams some fragments, then errors
 * - `MockProvider::failing()` - Rejects the request outright
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionProvider, CompletionRequest, FragmentStream};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Streams the fragments, then completes
    Scripted(Vec<String>),
    /// Streams the fragments, then yields an error item
    FailAfter(Vec<String>),
    /// Fails before any fragment is produced
    Failing,
    /// Streams the fragments with a delay before each one
    Slow { fragments: Vec<String>, delay_ms: u64 },
}

/// Mock provider for testing streaming behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Shared request counter, survives clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom fragment generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Stream the given fragments on every request
    pub fn scripted<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::Scripted(fragments.into_iter().map(Into::into).collect()))
    }

    /// Stream the given fragments, then fail mid-stream
    pub fn failing_after<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::FailAfter(fragments.into_iter().map(Into::into).collect()))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Stream fragments with a delay before each
    pub fn slow<S: Into<String>>(fragments: impl IntoIterator<Item = S>, delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow {
            fragments: fragments.into_iter().map(Into::into).collect(),
            delay_ms,
        })
    }

    /// Set a custom fragment generator, used instead of the scripted fragments
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> Vec<String>) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `stream_completion` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of all requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn fragments_for(&self, request: &CompletionRequest, scripted: &[String]) -> Vec<String> {
        match self.custom_response {
            Some(generator) => generator(request),
            None => scripted.to_vec(),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn stream_completion(&self, request: CompletionRequest) -> Result<FragmentStream, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Scripted(fragments) => {
                let items = self.fragments_for(&request, fragments).into_iter().map(Ok);
                Ok(stream::iter(items).boxed())
            }

            MockBehavior::FailAfter(fragments) => {
                let items = self
                    .fragments_for(&request, fragments)
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(ProviderError::ConnectionError(
                        "Simulated connection reset mid-stream".to_string(),
                    ))));
                Ok(stream::iter(items).boxed())
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Slow { fragments, delay_ms } => {
                let delay = Duration::from_millis(*delay_ms);
                let items = self.fragments_for(&request, fragments);
                Ok(stream::iter(items)
                    .then(move |fragment| async move {
                        tokio::time::sleep(delay).await;
                        Ok(fragment)
                    })
                    .boxed())
            }
        }
    }
}
