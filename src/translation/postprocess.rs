/*!
 * Post-processing of a reassembled completion.
 *
 * Reasoning models emit their deliberation before the answer, closed by a
 * delimiter. The stripper keeps only what follows the last delimiter; other
 * backends use the passthrough.
 */

use std::fmt::Debug;

/// Turns the accumulated completion into the document to persist
pub trait ResponsePostProcessor: Send + Sync + Debug {
    fn finalize(&self, accumulated: String) -> String;
}

/// Keeps the text after the last reasoning-trace closing delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningTraceStripper {
    closing_delimiter: String,
}

impl ReasoningTraceStripper {
    pub const DEFAULT_DELIMITER: &'static str = "</think>";

    pub fn new(closing_delimiter: impl Into<String>) -> Self {
        Self {
            closing_delimiter: closing_delimiter.into(),
        }
    }

    pub fn closing_delimiter(&self) -> &str {
        &self.closing_delimiter
    }
}

impl Default for ReasoningTraceStripper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELIMITER)
    }
}

impl ResponsePostProcessor for ReasoningTraceStripper {
    /// Without the delimiter the text is returned untouched, whitespace included.
    fn finalize(&self, accumulated: String) -> String {
        if self.closing_delimiter.is_empty() {
            return accumulated;
        }
        match accumulated.rfind(&self.closing_delimiter) {
            Some(pos) => accumulated[pos + self.closing_delimiter.len()..].trim().to_string(),
            None => accumulated,
        }
    }
}

/// Returns the completion unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passthrough;

impl ResponsePostProcessor for Passthrough {
    fn finalize(&self, accumulated: String) -> String {
        accumulated
    }
}
