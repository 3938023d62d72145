/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::str::FromStr;
use doctran::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use doctran::escaper::default_reserved_markers;
use crate::common;

/// Test the defaults a fresh install runs with
#[test]
fn test_default_config_shouldTranslateEnglishToVietnamese() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "vi");
    assert_eq!(config.input_dir, "units/en");
    assert_eq!(config.discovery.extensions, vec!["mdx"]);
    assert_eq!(config.discovery.file_names, vec!["_toctree.yml"]);
    assert_eq!(config.translation.provider, TranslationProvider::HuggingFace);
    assert_eq!(config.translation.common.temperature, 0.0);
    assert!(config.translation.common.strip_reasoning);
    assert_eq!(config.translation.common.reasoning_close_delimiter, "</think>");
    assert_eq!(config.translation.common.reserved_markers, default_reserved_markers());
    assert!(!config.run.continue_on_error);
    assert!(config.run.echo_fragments);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test the default provider settings
#[test]
fn test_default_config_shouldConfigureHuggingFaceRouter() {
    let config = Config::default();

    assert_eq!(config.translation.get_model(), "deepseek-ai/DeepSeek-R1");
    assert_eq!(config.translation.get_endpoint(), "https://router.huggingface.co/v1");
    assert_eq!(config.translation.get_timeout_secs(), 1800);
    assert_eq!(config.translation.available_providers.len(), 4);
}

/// Test that default config validates
#[test]
fn test_validate_withDefaultConfig_shouldSucceed() {
    assert!(Config::default().validate().is_ok());
}

/// Test that identical languages are rejected
#[test]
fn test_validate_withSameLanguages_shouldFail() {
    let mut config = Config::default();
    config.target_language = "en".to_string();

    assert!(config.validate().is_err());
}

/// Test that unknown language codes are rejected
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "klingon".to_string();

    assert!(config.validate().is_err());
}

/// Test that regional directory segments are accepted
#[test]
fn test_validate_withRegionalTargetSegment_shouldSucceed() {
    let mut config = Config::default();
    config.target_language = "zh-CN".to_string();
    assert!(config.validate().is_ok());

    config.target_language = "pt_BR".to_string();
    assert!(config.validate().is_ok());
}

/// Test that a language segment spanning several path components is rejected
#[test]
fn test_validate_withMultiComponentSegment_shouldFail() {
    let mut config = Config::default();
    config.target_language = "vi/extra".to_string();

    assert!(config.validate().is_err());
}

/// Test the temperature bounds
#[test]
fn test_validate_withOutOfRangeTemperature_shouldFail() {
    let mut config = Config::default();
    config.translation.common.temperature = 2.5;

    assert!(config.validate().is_err());
}

/// Test that stripping requires a delimiter
#[test]
fn test_validate_withStrippingAndEmptyDelimiter_shouldFail() {
    let mut config = Config::default();
    config.translation.common.reasoning_close_delimiter = String::new();

    assert!(config.validate().is_err());

    config.translation.common.strip_reasoning = false;
    assert!(config.validate().is_ok());
}

/// Test that a bad endpoint is caught before any request
#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();

    assert!(config.validate().is_err());
}

/// Test that a run with nothing eligible is rejected
#[test]
fn test_validate_withNoEligibilityRules_shouldFail() {
    let mut config = Config::default();
    config.discovery.extensions.clear();
    config.discovery.file_names.clear();

    assert!(config.validate().is_err());
}

/// Test saving and loading a configuration file
#[test]
fn test_save_and_from_file_shouldPreserveSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().model = "qwen3:8b".to_string();
    config.run.continue_on_error = true;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.translation.provider, TranslationProvider::Ollama);
    assert_eq!(loaded.translation.get_model(), "qwen3:8b");
    assert_eq!(loaded.translation.get_endpoint(), "http://localhost:11434");
    assert!(loaded.run.continue_on_error);

    Ok(())
}

/// Test that a minimal file is completed with defaults
#[test]
fn test_from_file_withMinimalJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "en",
            "target_language": "vi",
            "translation": { "provider": "lmstudio" }
        }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.input_dir, "units/en");
    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
    assert_eq!(config.translation.get_model(), "local-model");
    assert!(config.translation.common.strip_reasoning);
    assert!(config.run.echo_fragments);
    assert!(config.validate().is_ok());

    Ok(())
}

/// Test that malformed files surface an error
#[test]
fn test_from_file_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());

    Ok(())
}

/// Test that a key in the config wins over the environment
#[test]
fn test_get_api_key_withConfiguredKey_shouldUseIt() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "hf_from_config".to_string();

    assert_eq!(config.translation.get_api_key(), "hf_from_config");
}

/// Test that local providers need no key
#[test]
fn test_get_api_key_withLocalProvider_shouldBeEmpty() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    assert_eq!(config.translation.get_api_key(), "");
}

/// Test provider parsing and naming
#[test]
fn test_translation_provider_fromStr_shouldAcceptAliases() {
    assert_eq!(TranslationProvider::from_str("hf").unwrap(), TranslationProvider::HuggingFace);
    assert_eq!(TranslationProvider::from_str("HuggingFace").unwrap(), TranslationProvider::HuggingFace);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("anthropic").is_err());
    assert_eq!(TranslationProvider::OpenAI.to_string(), "openai");
    assert_eq!(TranslationProvider::HuggingFace.api_key_env_var(), Some("HF_TOKEN"));
}

/// Test that a missing provider entry is created on demand
#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::OpenAI;

    let entry = config.translation.active_provider_config_mut();
    assert_eq!(*entry, ProviderConfig::new(TranslationProvider::OpenAI));
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
}
