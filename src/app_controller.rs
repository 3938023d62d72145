use log::{debug, error, info, warn};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::discovery::{self, WorkItem};
use crate::errors::{AppError, DiscoveryError, StreamingError};
use crate::escaper::TokenEscaper;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::paths::LanguagePathMapper;
use crate::progress::ProgressReporter;
use crate::providers::{self, CompletionProvider};
use crate::translation::{CompletionStreamer, Passthrough, PromptPolicy, ReasoningTraceStripper, ResponsePostProcessor};

// @module: Run controller for batch document translation

/// Final state of one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Destination already existed and was left alone
    SkippedExisting,
    /// Source was blank; an empty destination was written
    SkippedEmpty,
    /// Translated and persisted
    Written,
    /// Would be translated (dry run)
    Planned,
    /// Failed and skipped because the run continues past errors
    Failed(String),
}

/// Per-outcome counts for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub skipped_existing: usize,
    pub skipped_empty: usize,
    pub planned: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::SkippedExisting => self.skipped_existing += 1,
            ItemOutcome::SkippedEmpty => self.skipped_empty += 1,
            ItemOutcome::Written => self.written += 1,
            ItemOutcome::Planned => self.planned += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run completed in {}: {} files, {} translated, {} skipped (existing), {} skipped (empty)",
            Controller::format_duration(self.elapsed),
            self.total,
            self.written,
            self.skipped_existing,
            self.skipped_empty
        )?;
        if self.planned > 0 {
            write!(f, ", {} planned", self.planned)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// Knobs that change how a run proceeds, not what it produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Log and count per-item failures instead of aborting the run
    pub continue_on_error: bool,
    /// Classify items without writing or calling the provider
    pub dry_run: bool,
}

/// Main application controller for document translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    mapper: LanguagePathMapper,
    escaper: TokenEscaper,
    streamer: CompletionStreamer,
    options: RunOptions,
}

impl Controller {
    // @method: Create a new controller with the provider named in the configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let provider = providers::build_provider(&config.translation)
            .map_err(|e| AppError::Config(e.to_string()))?;
        Self::with_provider(config, provider)
    }

    // @method: Create a dry-run controller; no credentials are needed since nothing is sent
    pub fn for_dry_run(config: Config) -> Result<Self, AppError> {
        let provider = providers::build_provider_without_credentials(&config.translation);
        let controller = Self::with_provider(config, provider)?;
        let options = RunOptions {
            dry_run: true,
            ..controller.options
        };
        Ok(controller.with_options(options))
    }

    // @method: Create a new controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn CompletionProvider>) -> Result<Self, AppError> {
        let common = &config.translation.common;

        let policy = match &common.prompt_policy_path {
            Some(path) => PromptPolicy::from_file(path).map_err(|e| AppError::Config(format!("{:#}", e)))?,
            None => PromptPolicy::default(),
        };
        if !policy.has_content_placeholder() {
            return Err(AppError::Config("Prompt template has no {content} placeholder".to_string()));
        }

        let post_processor: Arc<dyn ResponsePostProcessor> = if common.strip_reasoning {
            Arc::new(ReasoningTraceStripper::new(common.reasoning_close_delimiter.clone()))
        } else {
            Arc::new(Passthrough)
        };

        let source_name = language_utils::get_language_name(&config.source_language)
            .unwrap_or_else(|_| config.source_language.clone());
        let target_name = language_utils::get_language_name(&config.target_language)
            .unwrap_or_else(|_| config.target_language.clone());

        let streamer = CompletionStreamer::new(provider, config.translation.get_model())
            .temperature(common.temperature)
            .policy(policy)
            .languages(source_name, target_name)
            .post_processor(post_processor);

        let escaper = TokenEscaper::new(common.reserved_markers.clone())?;
        let options = RunOptions {
            continue_on_error: config.run.continue_on_error,
            dry_run: false,
        };

        Ok(Self {
            mapper: LanguagePathMapper::from(&config),
            config,
            escaper,
            streamer,
            options,
        })
    }

    /// Replace the run options
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover the work items under `root`
    pub fn discover<P: AsRef<Path>>(&self, root: P) -> Result<Vec<WorkItem>, DiscoveryError> {
        discovery::discover_work_items(root, &self.config.discovery, &self.mapper)
    }

    /// Translate every eligible document under `root`, one at a time in
    /// discovery order.
    pub async fn run<P: AsRef<Path>>(&self, root: P, reporter: &mut dyn ProgressReporter) -> Result<RunSummary, AppError> {
        let start_time = Instant::now();
        let root = root.as_ref();

        info!("Collecting files in {}", root.display());
        let items = self.discover(root)?;
        let total = items.len();

        info!(
            "Translating {} -> {} with {} - {}",
            self.config.source_language,
            self.config.target_language,
            self.streamer.provider_name(),
            self.streamer.model()
        );
        reporter.run_started(total);

        let mut summary = RunSummary {
            total,
            ..Default::default()
        };

        for (i, item) in items.iter().enumerate() {
            let index = i + 1;
            let outcome = match self.process_item(item, index, total, reporter).await {
                Ok(outcome) => outcome,
                Err(e) if self.options.continue_on_error => {
                    error!("Error processing file {}: {}", item.source_path.display(), e);
                    ItemOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    error!("Aborting run at {}/{}: {}", index, total, e);
                    reporter.item_finished(index, total, item, &ItemOutcome::Failed(e.to_string()));
                    return Err(e);
                }
            };

            reporter.item_finished(index, total, item, &outcome);
            summary.record(&outcome);
        }

        summary.elapsed = start_time.elapsed();
        reporter.run_finished(&summary);
        if summary.failed > 0 {
            warn!("{} of {} files failed; re-run to retry them", summary.failed, total);
        }

        Ok(summary)
    }

    /// Bring one item to a terminal state.
    ///
    /// Nothing is written for an item unless its translation completed; an
    /// error leaves the destination absent.
    pub async fn process_item(
        &self,
        item: &WorkItem,
        index: usize,
        total: usize,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<ItemOutcome, AppError> {
        if item.destination_path.exists() {
            return Ok(ItemOutcome::SkippedExisting);
        }

        let content = FileManager::read_to_string(&item.source_path).map_err(|source| StreamingError::Read {
            path: item.source_path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            if !self.options.dry_run {
                FileManager::write_atomic(&item.destination_path, "")?;
            }
            return Ok(ItemOutcome::SkippedEmpty);
        }

        if self.options.dry_run {
            return Ok(ItemOutcome::Planned);
        }

        reporter.item_started(index, total, item);

        let escaped = self.escaper.escape(&content);
        let translated = self
            .streamer
            .translate(&escaped, |fragment| reporter.fragment(fragment))
            .await?;
        let document = self.escaper.unescape(&translated);

        debug!("Writing {} bytes to {}", document.len(), item.destination_path.display());
        FileManager::write_atomic(&item.destination_path, &document)?;

        Ok(ItemOutcome::Written)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
