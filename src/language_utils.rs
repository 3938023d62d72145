use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Language codes double as directory segments (`units/en`, `units/vi`), so
/// they are validated before a run and turned into English names for the
/// prompt.

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve a 2- or 3-letter code to a language
pub fn parse_language(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == normalized)
                .map(|(_, t)| *t)
                .unwrap_or(normalized.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    parse_language(code).map(|_| ())
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    Ok(parse_language(code)?.to_639_3().to_string())
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (parse_language(code1), parse_language(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// Split `zh-CN` / `pt_BR` into the primary subtag and the remainder
fn split_tag(tag: &str) -> (&str, Option<&str>) {
    match tag.find(['-', '_']) {
        Some(idx) => (&tag[..idx], Some(&tag[idx + 1..])),
        None => (tag, None),
    }
}

/// Validate a language directory segment such as `vi`, `zh-CN` or `pt_BR`.
///
/// The segment must be a single path component and its primary subtag must be
/// an ISO 639-1 or ISO 639-2 code. Region and script subtags are not checked.
pub fn validate_language_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.trim() != segment {
        return Err(anyhow!("Invalid language segment: '{}'", segment));
    }
    if segment.contains(['/', '\\']) || segment == "." || segment == ".." {
        return Err(anyhow!("Language segment must be a single path component: '{}'", segment));
    }

    let (primary, rest) = split_tag(segment);
    if rest.is_some_and(|r| r.is_empty()) {
        return Err(anyhow!("Invalid language segment: '{}'", segment));
    }
    validate_language_code(primary).map_err(|_| anyhow!("Invalid language code: {}", segment))
}

/// Get the English language name from a code or tag (`zh-CN` -> `Chinese (CN)`)
pub fn get_language_name(code: &str) -> Result<String> {
    let (primary, rest) = split_tag(code.trim());
    let name = parse_language(primary)?.to_name();
    Ok(match rest {
        Some(region) if !region.is_empty() => format!("{} ({})", name, region),
        _ => name.to_string(),
    })
}
