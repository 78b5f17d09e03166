//! Textual snippet matching
//!
//! Determines whether a documentation code block still appears in a
//! candidate file. A verbatim substring test runs first; failing that, a
//! sliding window of the file's lines is compared after normalization
//! (all whitespace removed, trailing line comments stripped). A final
//! similarity-scored pass catches examples whose content diverged beyond
//! normalization, such as a changed operator or renamed argument.

use regex::Regex;
use similar::TextDiff;

/// Result of matching one documentation block against file content
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Block appears verbatim; nothing to report
    Verbatim,
    /// Block matches a window after normalization; formatting/comment drift only
    NearMatch {
        /// Original (non-normalized) window text
        window: String,
    },
    /// A window resembles the block but its content differs
    Diverged {
        /// Original (non-normalized) window text
        window: String,
    },
    /// No window resembles the block at all
    Absent,
}

/// Matches documentation code blocks against candidate file content
pub struct SnippetMatcher {
    comment_re: Regex,
    divergence_threshold: f64,
}

impl SnippetMatcher {
    /// Create a matcher with the default divergence threshold
    pub fn new() -> Self {
        Self::with_threshold(0.6)
    }

    /// Create a matcher reporting divergence at the given similarity ratio
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            comment_re: Regex::new(r"(?m)(#|//).*$").expect("valid regex"),
            divergence_threshold: threshold,
        }
    }

    /// Match a (pre-trimmed) documentation block against file content.
    ///
    /// The first qualifying window in file order wins; windows are the
    /// block's line count tall and slide one line at a time.
    pub fn match_block(&self, block: &str, file_content: &str) -> MatchOutcome {
        if file_content.contains(block) {
            return MatchOutcome::Verbatim;
        }

        let normalized_block = self.normalize(block);
        if normalized_block.is_empty() {
            return MatchOutcome::Absent;
        }

        let lines: Vec<&str> = file_content.lines().collect();
        let window_len = block.lines().count().max(1);
        if lines.len() < window_len {
            return MatchOutcome::Absent;
        }

        // Containment pass: normalization-only drift
        for start in 0..=(lines.len() - window_len) {
            let window = lines[start..start + window_len].join("\n");
            if self.normalize(&window).contains(&normalized_block) {
                return MatchOutcome::NearMatch { window };
            }
        }

        // Scoring pass: the example region exists but its content changed
        for start in 0..=(lines.len() - window_len) {
            let window = lines[start..start + window_len].join("\n");
            let normalized_window = self.normalize(&window);
            if normalized_window.is_empty() {
                continue;
            }
            let ratio =
                TextDiff::from_chars(normalized_block.as_str(), normalized_window.as_str()).ratio();
            if f64::from(ratio) >= self.divergence_threshold {
                return MatchOutcome::Diverged { window };
            }
        }

        MatchOutcome::Absent
    }

    /// Strip trailing line comments, then remove all whitespace
    fn normalize(&self, code: &str) -> String {
        let without_comments = self.comment_re.replace_all(code, "");
        without_comments
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

impl Default for SnippetMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_short_circuits() {
        let matcher = SnippetMatcher::new();
        let block = "def f():\n    return 1";
        let content = "import os\n\ndef f():\n    return 1\n";
        assert_eq!(matcher.match_block(block, content), MatchOutcome::Verbatim);
    }

    #[test]
    fn test_normalization_is_whitespace_and_comment_insensitive() {
        let matcher = SnippetMatcher::new();
        let a = matcher.normalize("def f():\n    return 1");
        let b = matcher.normalize("def f():   return 1  # note");
        assert_eq!(a, b);
    }

    #[test]
    fn test_near_match_reports_original_window() {
        let matcher = SnippetMatcher::new();
        // Indentation differs, so the verbatim test fails
        let block = "def f():\n        return 1";
        let content = "def f():\n    return 1  # now with a comment\n";

        match matcher.match_block(block, content) {
            MatchOutcome::NearMatch { window } => {
                assert!(window.contains("# now with a comment"));
            }
            other => panic!("expected near match, got {:?}", other),
        }
    }

    #[test]
    fn test_first_window_wins() {
        let matcher = SnippetMatcher::new();
        let block = "x  =  1";
        let content = "x = 1  # first\nfiller\nx = 1  # second\n";

        match matcher.match_block(block, content) {
            MatchOutcome::NearMatch { window } => assert!(window.contains("first")),
            other => panic!("expected near match, got {:?}", other),
        }
    }

    #[test]
    fn test_diverged_example_detected() {
        let matcher = SnippetMatcher::new();
        let block = "def add(a, b):\n    return a + b";
        let content = "def add(a, b):\n    return a - b\n";

        match matcher.match_block(block, content) {
            MatchOutcome::Diverged { window } => {
                assert!(window.contains("return a - b"));
            }
            other => panic!("expected diverged, got {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_content_is_absent() {
        let matcher = SnippetMatcher::new();
        let block = "def add(a, b):\n    return a + b";
        let content = "class Widget:\n    color = 'blue'\n";
        assert_eq!(matcher.match_block(block, content), MatchOutcome::Absent);
    }

    #[test]
    fn test_block_taller_than_file_is_absent() {
        let matcher = SnippetMatcher::new();
        let block = "a\nb\nc\nd";
        let content = "a\nb\n";
        assert_eq!(matcher.match_block(block, content), MatchOutcome::Absent);
    }
}
