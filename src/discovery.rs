/*!
 * Work discovery: find the documents a run has to translate.
 *
 * The input tree is walked recursively and a file is kept when its extension
 * or its exact file name is eligible. Each kept file becomes a `WorkItem`
 * whose destination comes from the path mapper.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::DiscoveryError;
use crate::paths::LanguagePathMapper;

/// Which files in the input tree are translated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRules {
    /// File extensions without the leading dot, compared case-sensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Exact file names, compared case-sensitively
    #[serde(default = "default_file_names")]
    pub file_names: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["mdx".to_string()]
}

fn default_file_names() -> Vec<String> {
    vec!["_toctree.yml".to_string()]
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            file_names: default_file_names(),
        }
    }
}

impl EligibilityRules {
    /// Check whether a path names an eligible file
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.file_names.iter().any(|f| f == name) {
                return true;
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.') == ext),
            None => false,
        }
    }
}

/// One source-to-destination translation task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
}

/// Recursively collect eligible files under `root`, siblings sorted by name.
pub fn discover<P: AsRef<Path>>(root: P, rules: &EligibilityRules) -> Result<Vec<PathBuf>, DiscoveryError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && rules.matches(entry.path()) {
            debug!("  + {}", entry.path().display());
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Discover sources and pair each with its destination.
///
/// Fails if any source cannot be mapped or if two sources would share a
/// destination.
pub fn discover_work_items<P: AsRef<Path>>(
    root: P,
    rules: &EligibilityRules,
    mapper: &LanguagePathMapper,
) -> Result<Vec<WorkItem>, DiscoveryError> {
    let sources = discover(root, rules)?;

    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(sources.len());
    let mut items = Vec::with_capacity(sources.len());
    for source_path in sources {
        let destination_path = mapper.map(&source_path)?;
        if let Some(first) = claimed.insert(destination_path.clone(), source_path.clone()) {
            return Err(DiscoveryError::DestinationCollision {
                first,
                second: source_path,
                destination: destination_path,
            });
        }
        items.push(WorkItem { source_path, destination_path });
    }

    Ok(items)
}
