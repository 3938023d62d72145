// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use doctran::app_config::{self, Config, TranslationProvider};
use doctran::{ConsoleReporter, Controller, RunOptions};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "huggingface", alias = "hf")]
    HuggingFace,
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "lmstudio")]
    LMStudio,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::HuggingFace => TranslationProvider::HuggingFace,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a documentation tree (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for doctran
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateArgs {
    /// Source-language root directory (defaults to `input_dir` from the config)
    #[arg(value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code, also the source directory segment (e.g. 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code, also the target directory segment (e.g. 'vi')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", env = "DOCTRAN_CONFIG")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Keep going after a file fails
    #[arg(long)]
    continue_on_error: bool,

    /// List what would be translated without calling the provider
    #[arg(long)]
    dry_run: bool,

    /// Do not echo streamed fragments
    #[arg(short, long)]
    quiet: bool,
}

/// doctran - translate documentation trees with streaming language models
#[derive(Parser, Debug)]
#[command(name = "doctran")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Batch translation of documentation trees with LLMs")]
#[command(long_about = "doctran walks a source-language documentation tree and writes a translated
copy of every eligible document into the matching target-language tree.

EXAMPLES:
    doctran units/en                          # Translate using default config
    doctran -p ollama -m deepseek-r1 units/en # Use specific provider and model
    doctran -s en -t ja units/en              # Translate from English to Japanese
    doctran --dry-run units/en                # Show what would be translated
    doctran completions bash > doctran.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    huggingface - Hugging Face inference router (reads HF_TOKEN)
    openai      - OpenAI API (reads OPENAI_API_KEY)
    lmstudio    - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)
    ollama      - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation, filtered by log::max_level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctran", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

// Load the config file, or write a default one if it doesn't exist yet
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::from_file(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config
        .save(config_path)
        .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if options.continue_on_error {
        config.run.continue_on_error = true;
    }

    if options.quiet {
        config.run.echo_fragments = false;
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // Apply a command line log level before anything gets logged
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    let input_dir = options
        .input_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input_dir));
    if !input_dir.is_dir() {
        return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
    }

    let mut reporter = ConsoleReporter::new(config.run.echo_fragments);

    let controller = if options.dry_run {
        Controller::for_dry_run(config)?
    } else {
        let run_options = RunOptions {
            continue_on_error: config.run.continue_on_error,
            dry_run: false,
        };
        Controller::with_config(config)?.with_options(run_options)
    };
    let summary = controller.run(&input_dir, &mut reporter).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} file(s) failed to translate", summary.failed));
    }

    Ok(())
}
