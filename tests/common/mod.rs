/*!
 * Common test utilities for the doctran test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use doctran::app_config::Config;

static INIT_LOGGER: Once = Once::new();

/// Route library logs to the test output, once per test binary
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative_path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a small `units/en` documentation tree and returns its root
pub fn create_test_tree(dir: &Path) -> Result<PathBuf> {
    let root = dir.join("units").join("en");
    create_test_file(&root, "introduction.mdx", "# Welcome\n\nHello world.\n")?;
    create_test_file(&root, "unit1/what-are-agents.mdx", "# What are agents?\n\nAgents use <think> tags.\n")?;
    create_test_file(&root, "_toctree.yml", "- title: Introduction\n  local: introduction\n")?;
    create_test_file(&root, "notes.txt", "not a document\n")?;
    Ok(root)
}

/// Config pointing at the mock-friendly defaults (en -> vi)
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.run.echo_fragments = false;
    config
}
