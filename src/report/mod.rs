//! Review report rendering
//!
//! Renders the discrepancy records of one run into a single Markdown
//! report: header, related-files listing, one subsection per affected
//! file, and a fixed recommendations list. A run with no discrepancies
//! renders a short success notice whose text is stable across runs.

use crate::compare::{DiscrepancyKind, DiscrepancyRecord};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;

/// Fixed recommendations appended to every non-clean report
const RECOMMENDATIONS: &[&str] = &[
    "Update the documentation to match the current codebase implementation",
    "Add version information to code examples if they represent older versions",
    "Consider adding automated documentation testing to your CI/CD pipeline",
    "Review the 'Related Files' section to ensure all relevant files are listed",
];

/// Render the report for one review run.
///
/// Records are grouped per file (file keys sorted for deterministic
/// output); within a file they keep their pipeline order.
pub fn build_report(
    source: &str,
    related_files: &[String],
    records: &[DiscrepancyRecord],
) -> String {
    let mut report = String::new();

    report.push_str("# Documentation Review Report\n\n");
    report.push_str(&format!("## Reviewed Documentation\n{}\n\n", source));

    report.push_str("## Related Files\n");
    if related_files.is_empty() {
        report.push_str("*No related files explicitly mentioned in documentation*\n");
    } else {
        for file in related_files {
            report.push_str(&format!("- `{}`\n", file));
        }
    }

    if records.is_empty() {
        report.push_str("\n✅ **No discrepancies found between documentation and codebase.**\n");
        return report;
    }

    report.push_str(&format!("\n## Found Discrepancies ({})\n", records.len()));

    let mut by_file: BTreeMap<&str, Vec<&DiscrepancyRecord>> = BTreeMap::new();
    for record in records {
        by_file.entry(record.file.as_str()).or_default().push(record);
    }

    for (file, file_records) in &by_file {
        report.push_str(&format!("\n### File: `{}`\n", file));

        for (index, record) in file_records.iter().enumerate() {
            report.push_str(&format!("\n#### Discrepancy {}\n", index + 1));
            render_record(&mut report, record);
        }
    }

    report.push_str("\n## Recommendations\n");
    for (index, recommendation) in RECOMMENDATIONS.iter().enumerate() {
        report.push_str(&format!("{}. {}\n", index + 1, recommendation));
    }

    report
}

fn render_record(report: &mut String, record: &DiscrepancyRecord) {
    match record.kind {
        DiscrepancyKind::StructuredValueMismatch => render_structured(report, record),
        DiscrepancyKind::SemanticMismatch => render_semantic(report, record),
        DiscrepancyKind::NearMatch | DiscrepancyKind::VerbatimMismatch => {
            render_textual(report, record)
        }
    }
}

fn render_structured(report: &mut String, record: &DiscrepancyRecord) {
    let context = record.context.as_ref();

    if let Some(path) = context.and_then(|c| c.path.as_deref()) {
        report.push_str(&format!("*JSON Path: `{}`*\n\n", path));
    }

    let doc_value = context
        .and_then(|c| c.doc_value.as_deref())
        .unwrap_or_default();
    let actual_value = context
        .and_then(|c| c.actual_value.as_deref())
        .unwrap_or_default();

    report.push_str("```diff\n");
    report.push_str(&format!("- Documentation version: {}\n", doc_value));
    report.push_str(&format!("+ Actual value: {}\n", actual_value));
    report.push_str("```\n");

    report.push_str("\nJSON Context:\n");
    report.push_str("```json\n");
    report.push_str(&format!("# Documentation version:\n{}\n", record.doc_snippet));
    report.push_str(&format!("\n# Actual version:\n{}\n", record.code_snippet));
    report.push_str("```\n");
}

fn render_semantic(report: &mut String, record: &DiscrepancyRecord) {
    if let Some(ref context) = record.context {
        if let Some(ref category) = context.category {
            report.push_str(&format!("*Type: {}*\n", category));
        }
        if let Some(severity) = context.severity {
            report.push_str(&format!("*Severity: {}*\n", severity));
        }
    }
    if let Some(ref language) = record.language {
        report.push_str(&format!("*Language: {}*\n", language));
    }
    report.push('\n');

    report.push_str(&render_diff(&record.doc_snippet, &record.code_snippet));

    if let Some(explanation) = record
        .context
        .as_ref()
        .and_then(|c| c.explanation.as_deref())
    {
        report.push_str(&format!("\nExplanation: {}\n", explanation));
    }
}

fn render_textual(report: &mut String, record: &DiscrepancyRecord) {
    if let Some(ref language) = record.language {
        report.push_str(&format!("*Language: {}*\n\n", language));
    }
    report.push_str(&render_diff(&record.doc_snippet, &record.code_snippet));
}

/// Render a line diff between the documentation and code snippets
fn render_diff(doc_snippet: &str, code_snippet: &str) -> String {
    let diff = TextDiff::from_lines(doc_snippet, code_snippet);

    let mut out = String::from("```diff\n");
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str("```\n");
    out
}
