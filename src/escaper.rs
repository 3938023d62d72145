/*!
 * Reversible escaping of reserved control markers.
 *
 * Reasoning models treat `<think>` / `</think>` as structure, and the
 * trace stripper cuts on `</think>`. Documents that merely talk about those
 * tags (tutorials on chat templates do) would otherwise be mangled, so the
 * markers are swapped for private sentinels before the request and swapped
 * back afterwards.
 */

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::EscaperError;

/// One reserved marker and the sentinel that stands in for it on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedMarker {
    pub marker: String,
    pub sentinel: String,
}

impl ReservedMarker {
    pub fn new(marker: impl Into<String>, sentinel: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            sentinel: sentinel.into(),
        }
    }
}

/// Reasoning-trace delimiters used by DeepSeek-R1 style models
pub fn default_reserved_markers() -> Vec<ReservedMarker> {
    vec![
        ReservedMarker::new("<think>", "<%%think%%>"),
        ReservedMarker::new("</think>", "<%%/think%%>"),
    ]
}

// Compiled-size ceiling for the alternation patterns
const PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

static DEFAULT_ESCAPER: Lazy<TokenEscaper> = Lazy::new(|| {
    TokenEscaper::new(default_reserved_markers())
        .unwrap_or_else(|e| unreachable!("default markers are valid: {}", e))
});

/// Bidirectional marker/sentinel substitution
#[derive(Debug, Clone)]
pub struct TokenEscaper {
    markers: Vec<ReservedMarker>,
    escape_pattern: Option<Regex>,
    unescape_pattern: Option<Regex>,
    to_sentinel: HashMap<String, String>,
    to_marker: HashMap<String, String>,
}

impl TokenEscaper {
    /// Build an escaper for the given marker set.
    ///
    /// An empty set is allowed and makes both directions the identity.
    pub fn new(markers: Vec<ReservedMarker>) -> Result<Self, EscaperError> {
        let mut seen = HashSet::new();
        for m in &markers {
            if m.marker.is_empty() || m.sentinel.is_empty() {
                return Err(EscaperError::EmptyMarker);
            }
            if m.marker == m.sentinel {
                return Err(EscaperError::SentinelEqualsMarker(m.marker.clone()));
            }
            for s in [&m.marker, &m.sentinel] {
                if !seen.insert(s.clone()) {
                    return Err(EscaperError::Duplicate(s.clone()));
                }
            }
        }

        let to_sentinel = markers
            .iter()
            .map(|m| (m.marker.clone(), m.sentinel.clone()))
            .collect();
        let to_marker = markers
            .iter()
            .map(|m| (m.sentinel.clone(), m.marker.clone()))
            .collect();

        let escape_pattern = Self::alternation(markers.iter().map(|m| m.marker.as_str()), PATTERN_SIZE_LIMIT)?;
        let unescape_pattern = Self::alternation(markers.iter().map(|m| m.sentinel.as_str()), PATTERN_SIZE_LIMIT)?;

        Ok(Self {
            escape_pattern,
            unescape_pattern,
            markers,
            to_sentinel,
            to_marker,
        })
    }

    pub fn markers(&self) -> &[ReservedMarker] {
        &self.markers
    }

    /// Replace every reserved marker with its sentinel
    pub fn escape(&self, document: &str) -> String {
        Self::substitute(self.escape_pattern.as_ref(), &self.to_sentinel, document)
    }

    /// Replace every sentinel with its reserved marker
    pub fn unescape(&self, text: &str) -> String {
        Self::substitute(self.unescape_pattern.as_ref(), &self.to_marker, text)
    }

    fn substitute(pattern: Option<&Regex>, table: &HashMap<String, String>, text: &str) -> String {
        match pattern {
            Some(re) => re
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    table.get(&caps[0]).cloned().unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned(),
            None => text.to_string(),
        }
    }

    // Longest alternatives first: the regex engine is leftmost-first, so a
    // marker that is a prefix of another must not shadow it.
    fn alternation<'a>(
        needles: impl Iterator<Item = &'a str>,
        size_limit: usize,
    ) -> Result<Option<Regex>, EscaperError> {
        let mut needles: Vec<&str> = needles.collect();
        if needles.is_empty() {
            return Ok(None);
        }
        needles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let pattern = needles
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&pattern)
            .size_limit(size_limit)
            .build()
            .map(Some)
            .map_err(|e| EscaperError::Pattern(e.to_string()))
    }
}

impl Default for TokenEscaper {
    fn default() -> Self {
        DEFAULT_ESCAPER.clone()
    }
}
