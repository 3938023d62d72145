/*!
 * # doctran - batch translation of documentation trees
 *
 * A Rust library that mirrors a source-language documentation tree into a
 * target-language tree by streaming each document through a language model.
 *
 * ## Features
 *
 * - Discover eligible documents (`.mdx` pages and `_toctree.yml` indexes)
 * - Map every source path to its target-language path
 * - Protect reserved markers such as `<think>` from the model
 * - Stream completions from several providers:
 *   - Hugging Face inference router (OpenAI-compatible)
 *   - OpenAI API
 *   - LM Studio (local, OpenAI-compatible)
 *   - Ollama (local LLM)
 * - Strip reasoning traces from reasoning-model output
 * - Resumable runs: existing translations are never touched
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `paths`: Source to target path mapping
 * - `escaper`: Reserved-marker escaping
 * - `discovery`: Work discovery
 * - `translation`: Prompt policy, streaming and post-processing:
 *   - `translation::prompts`: Prompt template and glossary
 *   - `translation::streamer`: Completion streamer
 *   - `translation::postprocess`: Reasoning-trace stripping
 * - `providers`: Streaming clients for the completion backends
 * - `app_controller`: Run controller
 * - `progress`: Progress reporting
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod discovery;
pub mod errors;
pub mod escaper;
pub mod file_utils;
pub mod language_utils;
pub mod paths;
pub mod progress;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ItemOutcome, RunOptions, RunSummary};
pub use discovery::{EligibilityRules, WorkItem};
pub use escaper::{ReservedMarker, TokenEscaper};
pub use paths::LanguagePathMapper;
pub use progress::{ConsoleReporter, ProgressReporter, SilentReporter};
pub use translation::{CompletionStreamer, PromptPolicy, ReasoningTraceStripper};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use errors::{AppError, DiscoveryError, PathMapError, ProviderError, StreamingError, WriteError};
