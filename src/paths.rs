/*!
 * Source-to-destination path mapping.
 *
 * Output trees mirror the input tree, with the language directory segment
 * swapped: `units/en/unit1/intro.mdx` becomes `units/vi/unit1/intro.mdx`.
 */

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::errors::PathMapError;

/// Maps a path by substituting exactly one language component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePathMapper {
    source_segment: String,
    target_segment: String,
}

impl LanguagePathMapper {
    pub fn new(source_segment: impl Into<String>, target_segment: impl Into<String>) -> Self {
        Self {
            source_segment: source_segment.into(),
            target_segment: target_segment.into(),
        }
    }

    pub fn source_segment(&self) -> &str {
        &self.source_segment
    }

    pub fn target_segment(&self) -> &str {
        &self.target_segment
    }

    /// Map a source path to its destination path.
    ///
    /// The path must contain exactly one component equal to the source
    /// segment. Components are compared whole, so `english/` never matches `en`.
    pub fn map<P: AsRef<Path>>(&self, source_path: P) -> Result<PathBuf, PathMapError> {
        let source_path = source_path.as_ref();
        let segment = OsStr::new(&self.source_segment);

        let count = source_path
            .components()
            .filter(|c| matches!(c, Component::Normal(name) if *name == segment))
            .count();

        match count {
            0 => Err(PathMapError::MissingSegment {
                path: source_path.to_path_buf(),
                segment: self.source_segment.clone(),
            }),
            1 => Ok(source_path
                .components()
                .map(|c| match c {
                    Component::Normal(name) if name == segment => {
                        OsStr::new(&self.target_segment)
                    }
                    other => other.as_os_str(),
                })
                .collect()),
            count => Err(PathMapError::AmbiguousSegment {
                path: source_path.to_path_buf(),
                segment: self.source_segment.clone(),
                count,
            }),
        }
    }
}

impl From<&crate::app_config::Config> for LanguagePathMapper {
    fn from(config: &crate::app_config::Config) -> Self {
        Self::new(config.source_language.clone(), config.target_language.clone())
    }
}
