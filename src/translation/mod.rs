/*!
 * Translation of a single document through a streaming completion backend.
 *
 * - `prompts`: Prompt template and glossary policy
 * - `postprocess`: Cleanup of the reassembled completion
 * - `streamer`: One streaming request, fragment reassembly
 */

// Re-export main types for easier usage
pub use self::postprocess::{Passthrough, ReasoningTraceStripper, ResponsePostProcessor};
pub use self::prompts::{GlossaryRules, PromptPolicy, TermTranslation};
pub use self::streamer::{CompletionStreamer, StreamAccumulator};

// Submodules
pub mod postprocess;
pub mod prompts;
pub mod streamer;
