use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::discovery::EligibilityRules;
use crate::escaper::{default_reserved_markers, ReservedMarker};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), also the input directory segment
    pub source_language: String,

    /// Target language code (ISO), also the output directory segment
    pub target_language: String,

    /// Root of the source-language tree
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Which files are translated
    #[serde(default)]
    pub discovery: EligibilityRules,

    /// Translation config
    pub translation: TranslationConfig,

    /// Run behavior
    #[serde(default)]
    pub run: RunConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Hugging Face inference router (OpenAI-compatible)
    #[default]
    HuggingFace,
    // @provider: OpenAI
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HuggingFace => "Hugging Face",
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::HuggingFace => "huggingface".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    // @returns: Environment variable holding the API key, if the provider takes one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::HuggingFace => Some("HF_TOKEN"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::LMStudio | Self::Ollama => None,
        }
    }

    pub fn all() -> [TranslationProvider; 4] {
        [Self::HuggingFace, Self::OpenAI, Self::LMStudio, Self::Ollama]
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, falls back to the provider's environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Whole-request timeout, streaming included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for text generation
    /// Zero keeps the output as deterministic as the backend allows
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// JSON prompt policy file; the built-in policy is used when unset
    #[serde(default)]
    pub prompt_policy_path: Option<String>,

    /// Drop everything up to the last reasoning-trace closing delimiter
    #[serde(default = "default_true")]
    pub strip_reasoning: bool,

    /// Closing delimiter of the reasoning trace
    #[serde(default = "default_reasoning_close_delimiter")]
    pub reasoning_close_delimiter: String,

    /// Markers protected from the model by sentinel substitution
    #[serde(default = "default_reserved_markers")]
    pub reserved_markers: Vec<ReservedMarker>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            prompt_policy_path: None,
            strip_reasoning: true,
            reasoning_close_delimiter: default_reasoning_close_delimiter(),
            reserved_markers: default_reserved_markers(),
        }
    }
}

/// How a run treats per-file failures and progress output
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Keep going after a file fails instead of aborting the run
    #[serde(default)]
    pub continue_on_error: bool,

    /// Echo fragments to stdout while they stream in
    #[serde(default = "default_true")]
    pub echo_fragments: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            echo_fragments: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_dir() -> String {
    "units/en".to_string()
}

fn default_timeout_secs() -> u64 {
    // Reasoning models can stream for many minutes on long documents
    1800
}

fn default_temperature() -> f32 {
    0.0
}

fn default_true() -> bool {
    true
}

fn default_reasoning_close_delimiter() -> String {
    "</think>".to_string()
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::HuggingFace => "https://router.huggingface.co/v1".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
    }
}

fn default_model(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::HuggingFace => "deepseek-ai/DeepSeek-R1".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
        TranslationProvider::Ollama => "deepseek-r1".to_string(),
    }
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Languages are also the directory segments the path mapper swaps
        crate::language_utils::validate_language_segment(&self.source_language)?;
        crate::language_utils::validate_language_segment(&self.target_language)?;
        if self.source_language == self.target_language {
            return Err(anyhow!(
                "Source and target language are both '{}'; output would overwrite input paths",
                self.source_language
            ));
        }

        if self.discovery.extensions.is_empty() && self.discovery.file_names.is_empty() {
            return Err(anyhow!("No eligible extensions or file names configured"));
        }

        let common = &self.translation.common;
        if !(0.0..=2.0).contains(&common.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", common.temperature));
        }
        if common.strip_reasoning && common.reasoning_close_delimiter.is_empty() {
            return Err(anyhow!("Reasoning stripping is enabled but the closing delimiter is empty"));
        }

        let endpoint = self.translation.get_endpoint();
        Url::parse(&endpoint)
            .with_context(|| format!("Invalid endpoint URL for {}: {}", self.translation.provider.display_name(), endpoint))?;

        if self.translation.get_model().is_empty() {
            return Err(anyhow!("No model configured for {}", self.translation.provider.display_name()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "vi".to_string(),
            input_dir: default_input_dir(),
            discovery: EligibilityRules::default(),
            translation: TranslationConfig::default(),
            run: RunConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created with
    /// defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => &mut self.available_providers[index],
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                let last = self.available_providers.len() - 1;
                &mut self.available_providers[last]
            }
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.model.is_empty() => p.model.clone(),
            _ => default_model(self.provider),
        }
    }

    /// Get the API key for the active provider.
    ///
    /// A key in the config wins; otherwise the provider's environment
    /// variable is consulted.
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.endpoint.is_empty() => p.endpoint.clone(),
            _ => default_endpoint(self.provider),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(p) if p.timeout_secs > 0 => p.timeout_secs,
            _ => default_timeout_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::all()
                .into_iter()
                .map(ProviderConfig::new)
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
