/*!
 * Progress reporting side channel.
 *
 * The controller announces each item and echoes fragments as they stream
 * in. Nothing here feeds back into the run; reporters only observe.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::io::Write;
use std::time::Duration;

use crate::app_controller::{ItemOutcome, RunSummary};
use crate::discovery::WorkItem;

/// Observer of a translation run
pub trait ProgressReporter {
    /// Called once after discovery
    fn run_started(&mut self, _total: usize) {}

    /// Called when an item starts streaming
    fn item_started(&mut self, index: usize, total: usize, item: &WorkItem);

    /// Called for every fragment of the item being streamed
    fn fragment(&mut self, text: &str);

    /// Called once per item with its final state
    fn item_finished(&mut self, index: usize, total: usize, item: &WorkItem, outcome: &ItemOutcome);

    /// Called once when the run ends normally
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Reporter for an operator watching a terminal
pub struct ConsoleReporter {
    echo_fragments: bool,
    spinner: Option<ProgressBar>,
    fragments: usize,
    echoed: bool,
}

impl ConsoleReporter {
    /// With `echo_fragments` off a spinner counts fragments instead
    pub fn new(echo_fragments: bool) -> Self {
        Self {
            echo_fragments,
            spinner: None,
            fragments: 0,
            echoed: false,
        }
    }

    fn spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }
}

impl ProgressReporter for ConsoleReporter {
    fn run_started(&mut self, total: usize) {
        info!("Collected {} files", total);
    }

    fn item_started(&mut self, index: usize, total: usize, item: &WorkItem) {
        info!("[{}/{}] Processing file: {}", index, total, item.source_path.display());
        self.fragments = 0;
        self.echoed = false;
        if !self.echo_fragments {
            let spinner = Self::spinner();
            spinner.set_message("Waiting for the first fragment");
            self.spinner = Some(spinner);
        }
    }

    fn fragment(&mut self, text: &str) {
        self.fragments += 1;
        if self.echo_fragments {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{}", text);
            let _ = stdout.flush();
            self.echoed = true;
        } else if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("{} fragments received", self.fragments));
        }
    }

    fn item_finished(&mut self, index: usize, total: usize, item: &WorkItem, outcome: &ItemOutcome) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if self.echoed {
            println!();
            self.echoed = false;
        }

        match outcome {
            ItemOutcome::SkippedExisting => {
                info!("[{}/{}] Skipping file: {}", index, total, item.source_path.display());
            }
            ItemOutcome::SkippedEmpty => {
                info!("[{}/{}] Skipping empty file: {}", index, total, item.source_path.display());
            }
            ItemOutcome::Planned => {
                info!(
                    "[{}/{}] Would translate: {} -> {}",
                    index,
                    total,
                    item.source_path.display(),
                    item.destination_path.display()
                );
            }
            ItemOutcome::Written => {
                info!("  -> Translated to: {}", item.destination_path.display());
                info!("{}", "--".repeat(20));
            }
            ItemOutcome::Failed(reason) => {
                error!("[{}/{}] Failed: {}: {}", index, total, item.source_path.display(), reason);
            }
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        info!("{}", summary);
    }
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn item_started(&mut self, _index: usize, _total: usize, _item: &WorkItem) {}

    fn fragment(&mut self, _text: &str) {}

    fn item_finished(&mut self, _index: usize, _total: usize, _item: &WorkItem, _outcome: &ItemOutcome) {}
}
