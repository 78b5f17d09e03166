//! Related-files extraction and path normalization
//!
//! Documentation authors declare the source files an article pertains to
//! in a "Related Files" section. The section heading may be followed by
//! explanatory prose before the bulleted list; list entries come either
//! backtick-quoted or as slash-prefixed plain paths. When no such section
//! exists, quoted file paths inside structured (JSON/YAML) code blocks
//! serve as a fallback.

use super::blocks::extract_code_blocks;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Directory roots that never hold reviewable source files
const EXCLUDED_DIRS: &[&str] = &["node_modules/", "dist/", "build/", "coverage/", ".git/"];

fn section_patterns() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            // Bulleted list of backtick-quoted entries
            Regex::new(r"(?mi)^##?[ \t]*Related Files[^\n]*\n(?:[^\n]*\n)*?((?:[-*][ \t]*`[^`\n]+`[^\n]*\n)+)")
                .expect("valid regex"),
            // Bulleted list of plain slash-prefixed entries
            Regex::new(r"(?mi)^##?[ \t]*Related Files[^\n]*\n(?:[^\n]*\n)*?((?:[-*][ \t]*/[^\n]+\n)+)")
                .expect("valid regex"),
            // Mixed-format list
            Regex::new(r"(?mi)^##?[ \t]*Related Files[^\n]*\n(?:[^\n]*\n)*?((?:[-*][ \t]*(?:`[^`\n]+`|/[^\n]+)[^\n]*\n)+)")
                .expect("valid regex"),
        ]
    })
}

fn list_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)(?:`([^`\n]+)`|[-*][ \t]*(/[^\s]+))").expect("valid regex"))
}

fn quoted_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:"([^"\n]+\.[A-Za-z]+)"|'([^'\n]+\.[A-Za-z]+)')"#).expect("valid regex")
    })
}

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[A-Za-z]+$").expect("valid regex"))
}

/// Extract the file paths declared in a "Related Files" section.
///
/// Falls back to quoted paths inside JSON/YAML code blocks when the
/// section is missing or yields nothing. Returns a sorted, deduplicated
/// list; empty when neither source produced a usable path.
pub fn extract_related_files(content: &str) -> Vec<String> {
    // Bullet-list regexes require line-terminated entries
    let text = ensure_trailing_newline(content);

    let mut related: BTreeSet<String> = BTreeSet::new();

    for pattern in section_patterns() {
        for captures in pattern.captures_iter(&text) {
            let Some(file_list) = captures.get(1) else {
                continue;
            };
            for entry in list_entry_re().captures_iter(file_list.as_str()) {
                let raw = entry
                    .get(1)
                    .or_else(|| entry.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if let Some(clean) = normalize_path(raw) {
                    related.insert(clean);
                }
            }
        }
    }

    if related.is_empty() {
        tracing::debug!("no Related Files section entries, checking structured code blocks");
        for block in extract_code_blocks(&text) {
            let lang = block.language.as_deref().unwrap_or("").to_lowercase();
            if !matches!(lang.as_str(), "json" | "yaml" | "yml") {
                continue;
            }
            for captures in quoted_path_re().captures_iter(&block.content) {
                let raw = captures
                    .get(1)
                    .or_else(|| captures.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if let Some(clean) = normalize_path(raw) {
                    related.insert(clean);
                }
            }
        }
    }

    related.into_iter().collect()
}

/// Normalize a file path found in documentation.
///
/// Strips a single leading `./` or `/`, rejects entries without a
/// trailing dot-extension, and rejects entries rooted under generated or
/// dependency directories.
pub fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let path = trimmed
        .strip_prefix("./")
        .or_else(|| trimmed.strip_prefix('/'))
        .unwrap_or(trimmed);

    if !extension_re().is_match(path) {
        return None;
    }

    if EXCLUDED_DIRS.iter().any(|dir| path.starts_with(dir)) {
        return None;
    }

    Some(path.to_string())
}

fn ensure_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}
