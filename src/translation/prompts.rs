/*!
 * Prompt policy for document translation.
 *
 * The instructions sent with each document are data: a template with
 * placeholders plus glossary rules, loaded from JSON or built from defaults.
 * Supported placeholders are `{source_language}`, `{target_language}`,
 * `{glossary}` and `{content}`.
 */

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(source_language|target_language|glossary)\}")
        .unwrap_or_else(|e| unreachable!("placeholder pattern is valid: {}", e))
});

/// A term with the translation the model must use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermTranslation {
    pub term: String,
    pub translation: String,
}

/// Terminology rules rendered into the `{glossary}` placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryRules {
    /// Terms left untranslated
    #[serde(default)]
    pub keep: Vec<String>,

    /// Terms left untranslated but explained in parentheses on first use
    #[serde(default)]
    pub keep_with_translation: Vec<String>,

    /// Terms with a mandated translation
    #[serde(default)]
    pub fixed_translations: Vec<TermTranslation>,
}

impl GlossaryRules {
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty() && self.keep_with_translation.is_empty() && self.fixed_translations.is_empty()
    }

    /// Render the rules as prompt text, empty when there are none
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        if !self.keep.is_empty() {
            sections.push(format!(
                "KEEP THESE TERMS (DO NOT TRANSLATE, do NOT add translation in parentheses): {}",
                self.keep.join(", ")
            ));
        }

        if !self.keep_with_translation.is_empty() {
            sections.push(format!(
                "Also KEEP these terms but PROVIDE TRANSLATION in parentheses for the first time it appears in the text: {}",
                self.keep_with_translation.join(", ")
            ));
        }

        if !self.fixed_translations.is_empty() {
            let lines: Vec<String> = self
                .fixed_translations
                .iter()
                .map(|t| format!("- {}: {}", t.term, t.translation))
                .collect();
            sections.push(format!(
                "For these terms, use the pre-defined translation:\n{}",
                lines.join("\n")
            ));
        }

        sections.join("\n\n")
    }
}

/// Template and glossary used to build the prompt for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPolicy {
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default)]
    pub glossary: GlossaryRules,
}

impl PromptPolicy {
    /// The default instructions, parameterized by language names.
    pub const DEFAULT_TEMPLATE: &'static str = r#"You are a translator for the {target_language} translation team. You are tasked with translating the following text from {source_language} into {target_language}. You must follow these instructions:
- Translate the text into {target_language}, while keeping the original formatting (either Markdown, MDX or HTML)
- Inside code blocks, translate the comments but leave the code as-is
- Do not translate inline code, the URLs and file paths
- If the term is abbreviated, keep the original term and provide the translation in parentheses for the first time it appears in the text.

{glossary}

IMPORTANT: Only output the translated text and nothing else, no explanation or instruction. The input text is between "=== BEGIN OF TEXT ===" and "=== END OF TEXT ===".

Please translate the following text to {target_language}:

=== BEGIN OF TEXT ===
{content}
=== END OF TEXT ==="#;

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            glossary: GlossaryRules::default(),
        }
    }

    pub fn with_glossary(mut self, glossary: GlossaryRules) -> Self {
        self.glossary = glossary;
        self
    }

    /// Load a policy from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open prompt policy: {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse prompt policy: {:?}", path))
    }

    /// Whether the template has a slot for the document
    pub fn has_content_placeholder(&self) -> bool {
        self.template.contains("{content}")
    }

    /// Render the prompt for one document.
    ///
    /// Placeholders are substituted in the template only; the document is
    /// spliced in afterwards, so braces or blank lines inside it are never
    /// touched.
    pub fn render(&self, content: &str, source_language: &str, target_language: &str) -> String {
        let glossary = self.glossary.render();
        let pieces: Vec<String> = self
            .template
            .trim()
            .split("{content}")
            .map(|piece| {
                let piece = PLACEHOLDER.replace_all(piece, |caps: &Captures<'_>| match &caps[1] {
                    "source_language" => source_language.to_string(),
                    "target_language" => target_language.to_string(),
                    _ => glossary.clone(),
                });
                // An empty glossary leaves a run of blank lines behind
                collapse_blank_lines(&piece)
            })
            .collect();

        pieces.join(content)
    }
}

impl Default for PromptPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEMPLATE)
    }
}

fn default_template() -> String {
    PromptPolicy::DEFAULT_TEMPLATE.to_string()
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for (i, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}
