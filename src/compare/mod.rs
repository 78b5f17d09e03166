//! Documentation-vs-code comparison
//!
//! Three comparators produce discrepancy records:
//! - textual snippet matching (verbatim, then normalized sliding-window)
//! - structured value diffing for JSON blocks
//! - an optional semantic comparison service for everything else

pub mod semantic;
pub mod snippet;
pub mod structured;

pub use semantic::{
    ComparatorConfig, LlmComparator, MockComparator, SemanticComparator, SemanticFinding,
};
pub use snippet::{MatchOutcome, SnippetMatcher};
pub use structured::{compare_json, scoped_snippet, ValueChange};

use serde::{Deserialize, Serialize};

/// Kind of a detected discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// The documented example exists in the file but its content diverged
    VerbatimMismatch,
    /// The documented example matches only after whitespace/comment normalization
    NearMatch,
    /// A structured (JSON) value differs from the real file
    StructuredValueMismatch,
    /// The semantic comparison service flagged a difference
    SemanticMismatch,
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscrepancyKind::VerbatimMismatch => write!(f, "verbatim mismatch"),
            DiscrepancyKind::NearMatch => write!(f, "near match"),
            DiscrepancyKind::StructuredValueMismatch => write!(f, "structured value mismatch"),
            DiscrepancyKind::SemanticMismatch => write!(f, "semantic mismatch"),
        }
    }
}

/// Severity reported for a discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

impl Severity {
    /// Parse a severity label, defaulting to medium for unknown input
    pub fn parse_lossy(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "high" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

/// Extra context attached to structured and semantic discrepancies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscrepancyContext {
    /// Dotted/bracketed path to the changed leaf (structured diffs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Documentation-side leaf value, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_value: Option<String>,
    /// Actual leaf value, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,
    /// Finding category from the semantic comparator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Reported severity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Human-readable explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A detected mismatch between documentation and the codebase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscrepancyRecord {
    /// Unique identifier
    pub id: String,
    /// Target file path, relative to the repository root
    pub file: String,
    /// Discrepancy kind
    pub kind: DiscrepancyKind,
    /// Fence language of the documentation block (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Documentation-side snippet
    pub doc_snippet: String,
    /// Actual-code-side snippet
    pub code_snippet: String,
    /// Structured context for value-level and semantic findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<DiscrepancyContext>,
}

impl DiscrepancyRecord {
    /// Create a new discrepancy record
    pub fn new(file: &str, kind: DiscrepancyKind, doc_snippet: &str, code_snippet: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file: file.to_string(),
            kind,
            language: None,
            doc_snippet: doc_snippet.to_string(),
            code_snippet: code_snippet.to_string(),
            context: None,
        }
    }

    /// Set the fence language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Attach structured context
    pub fn with_context(mut self, context: DiscrepancyContext) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = DiscrepancyRecord::new(
            "src/util.py",
            DiscrepancyKind::NearMatch,
            "return a + b",
            "return a + b  # total",
        )
        .with_language("python");

        assert_eq!(record.file, "src/util.py");
        assert_eq!(record.kind, DiscrepancyKind::NearMatch);
        assert_eq!(record.language.as_deref(), Some("python"));
        assert!(record.context.is_none());
    }

    #[test]
    fn test_severity_parse_lossy() {
        assert_eq!(Severity::parse_lossy("HIGH"), Severity::High);
        assert_eq!(Severity::parse_lossy("low"), Severity::Low);
        assert_eq!(Severity::parse_lossy("unknown"), Severity::Medium);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&DiscrepancyKind::StructuredValueMismatch).unwrap();
        assert_eq!(json, "\"structured_value_mismatch\"");
    }
}
