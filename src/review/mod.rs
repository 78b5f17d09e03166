//! Documentation review pipeline
//!
//! A strictly linear run: fetch the documentation, extract references,
//! determine candidate files, compare each candidate's content against
//! the documentation's code samples, and render a report. File-level and
//! block-level failures are downgraded to logged skips; only a missing
//! documentation source fails the run.

use crate::compare::{
    compare_json, scoped_snippet, DiscrepancyContext, DiscrepancyKind, DiscrepancyRecord,
    MatchOutcome, SemanticComparator, SnippetMatcher,
};
use crate::config::ReviewConfig;
use crate::extract::{extract_code_blocks, extract_references, group_blocks_by_language};
use crate::locate::Locator;
use crate::report::build_report;
use serde::Serialize;
use std::path::Path;

/// Error surfaced by a review run.
///
/// Candidate-file and code-block failures never reach this level; they
/// are logged and skipped inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The documentation source does not exist
    #[error("documentation source not found: {path}")]
    SourceNotFound {
        /// The path that was requested
        path: String,
    },

    /// Any other run-level failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Pipeline stage, for observer notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    ExtractReferences,
    LocateCandidates,
    Verify,
    BuildReport,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::ExtractReferences => write!(f, "extract-references"),
            Stage::LocateCandidates => write!(f, "locate-candidates"),
            Stage::Verify => write!(f, "verify"),
            Stage::BuildReport => write!(f, "build-report"),
        }
    }
}

/// Observer notified at pipeline stage boundaries.
///
/// The comparison algorithms themselves are never instrumented; this is
/// the only hook external tracing should attach to.
pub trait ReviewObserver {
    /// A stage is about to run
    fn stage_started(&self, stage: Stage) {
        let _ = stage;
    }

    /// A stage finished normally
    fn stage_completed(&self, stage: Stage) {
        let _ = stage;
    }

    /// A stage failed; the run is about to return an error
    fn stage_failed(&self, stage: Stage, message: &str) {
        let _ = (stage, message);
    }
}

/// One documentation artifact under review
#[derive(Debug, Clone)]
pub struct Document {
    /// Source identifier (the path it was loaded from)
    pub source: String,
    /// Raw text content
    pub body: String,
}

impl Document {
    /// Load a documentation file from disk
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        if !path.exists() {
            return Err(ReviewError::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        let body = std::fs::read_to_string(path).map_err(|err| {
            ReviewError::Internal(anyhow::Error::new(err).context(format!(
                "Failed to read documentation file {:?}",
                path
            )))
        })?;

        Ok(Self {
            source: path.display().to_string(),
            body,
        })
    }

    /// Create a document from in-memory content
    pub fn from_content(source: &str, body: &str) -> Self {
        Self {
            source: source.to_string(),
            body: body.to_string(),
        }
    }
}

/// Aggregate result of one review run
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResult {
    /// False only when report delivery failed
    pub success: bool,
    /// Source identifier of the reviewed documentation
    pub source: String,
    /// Related files declared by the documentation
    pub related_files: Vec<String>,
    /// Discrepancies found, in pipeline order
    pub discrepancies: Vec<DiscrepancyRecord>,
    /// Rendered report text
    pub report: String,
}

/// Runs the documentation review pipeline
pub struct Reviewer {
    config: ReviewConfig,
    matcher: SnippetMatcher,
    locator: Locator,
    comparator: Option<Box<dyn SemanticComparator>>,
    observer: Option<Box<dyn ReviewObserver>>,
}

impl Reviewer {
    /// Create a reviewer with the given configuration
    pub fn new(config: ReviewConfig) -> Self {
        let matcher = SnippetMatcher::with_threshold(config.near_match_threshold);
        let locator = Locator::from_config(&config);
        Self {
            config,
            matcher,
            locator,
            comparator: None,
            observer: None,
        }
    }

    /// Attach a semantic comparison service
    pub fn with_comparator(mut self, comparator: Box<dyn SemanticComparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Attach a stage observer
    pub fn with_observer(mut self, observer: Box<dyn ReviewObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Review one documentation file against a repository tree
    pub fn review(&self, doc_path: &Path, repo_root: &Path) -> Result<ReviewResult, ReviewError> {
        let document = self.fetch(doc_path)?;
        self.review_document(&document, repo_root, None)
    }

    /// Review one documentation file, verifying only an explicit target file
    pub fn review_target(
        &self,
        doc_path: &Path,
        repo_root: &Path,
        target: &str,
    ) -> Result<ReviewResult, ReviewError> {
        let document = self.fetch(doc_path)?;
        self.review_document(&document, repo_root, Some(target))
    }

    /// Review already-loaded documentation content
    pub fn review_document(
        &self,
        document: &Document,
        repo_root: &Path,
        target: Option<&str>,
    ) -> Result<ReviewResult, ReviewError> {
        tracing::info!("starting documentation review for {}", document.source);

        // Extract references
        self.notify_start(Stage::ExtractReferences);
        let references = extract_references(&document.body);
        tracing::info!(
            "extracted {} related file(s), {} keyword(s)",
            references.related_files.len(),
            references.keywords.len()
        );
        self.notify_end(Stage::ExtractReferences);

        // Determine candidate files
        self.notify_start(Stage::LocateCandidates);
        let candidates = match target {
            Some(target) => vec![target.to_string()],
            None => self.locate_candidates(&references.related_files, &references.keywords, repo_root),
        };
        self.notify_end(Stage::LocateCandidates);

        // Verify each candidate
        self.notify_start(Stage::Verify);
        let mut discrepancies = Vec::new();
        for candidate in &candidates {
            discrepancies.extend(self.verify_candidate(document, candidate, repo_root));
        }
        tracing::info!("analysis complete, {} discrepancy(ies) found", discrepancies.len());
        self.notify_end(Stage::Verify);

        // Render the report
        self.notify_start(Stage::BuildReport);
        let report = build_report(&document.source, &references.related_files, &discrepancies);
        self.notify_end(Stage::BuildReport);

        Ok(ReviewResult {
            success: true,
            source: document.source.clone(),
            related_files: references.related_files,
            discrepancies,
            report,
        })
    }

    fn fetch(&self, doc_path: &Path) -> Result<Document, ReviewError> {
        self.notify_start(Stage::Fetch);
        match Document::load(doc_path) {
            Ok(document) => {
                self.notify_end(Stage::Fetch);
                Ok(document)
            }
            Err(err) => {
                self.notify_error(Stage::Fetch, &err.to_string());
                Err(err)
            }
        }
    }

    /// Related files drive verification; the keyword bag searches the
    /// codebase only when the documentation declared nothing.
    fn locate_candidates(
        &self,
        related_files: &[String],
        keywords: &[String],
        repo_root: &Path,
    ) -> Vec<String> {
        if !related_files.is_empty() {
            return related_files
                .iter()
                .filter(|rel| {
                    let exists = repo_root.join(rel).exists();
                    if !exists {
                        tracing::warn!("related file not found in repository: {}", rel);
                    }
                    exists
                })
                .cloned()
                .collect();
        }

        if keywords.is_empty() {
            tracing::info!("no related files and no keywords, nothing to verify");
            return Vec::new();
        }

        self.locator.search(repo_root, keywords)
    }

    /// Compare the documentation's code samples against one candidate file
    fn verify_candidate(
        &self,
        document: &Document,
        rel_path: &str,
        repo_root: &Path,
    ) -> Vec<DiscrepancyRecord> {
        let full_path = repo_root.join(rel_path);
        let content = match std::fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("skipping unreadable candidate {:?}: {}", full_path, err);
                return Vec::new();
            }
        };

        let blocks = extract_code_blocks(&document.body);
        let grouped = group_blocks_by_language(&blocks, &self.config.skip_languages);

        let mut records = Vec::new();

        for (lang, group) in &grouped {
            if self.config.is_structured_language(lang) {
                match compare_json(&group[0], &content) {
                    Ok(changes) => {
                        for change in changes {
                            records.push(self.structured_record(rel_path, lang, &change));
                        }
                        continue;
                    }
                    Err(err) => {
                        // Fall through to the textual/semantic path
                        tracing::warn!(
                            "structured comparison failed for {}: {:#}",
                            rel_path,
                            err
                        );
                    }
                }
            }

            let mut unresolved = Vec::new();

            for block in group {
                match self.matcher.match_block(block, &content) {
                    MatchOutcome::Verbatim => {}
                    MatchOutcome::NearMatch { window } => {
                        unresolved.push(block.clone());
                        records.push(
                            DiscrepancyRecord::new(
                                rel_path,
                                DiscrepancyKind::NearMatch,
                                block,
                                &window,
                            )
                            .with_language(lang),
                        );
                    }
                    MatchOutcome::Diverged { window } => {
                        unresolved.push(block.clone());
                        records.push(
                            DiscrepancyRecord::new(
                                rel_path,
                                DiscrepancyKind::VerbatimMismatch,
                                block,
                                &window,
                            )
                            .with_language(lang),
                        );
                    }
                    MatchOutcome::Absent => {
                        // The example may have moved to another file;
                        // absence alone is not a discrepancy
                        unresolved.push(block.clone());
                    }
                }
            }

            if let Some(ref comparator) = self.comparator {
                if !unresolved.is_empty() {
                    match comparator.compare(lang, rel_path, &content, &unresolved) {
                        Ok(findings) => {
                            for finding in findings {
                                records.push(
                                    DiscrepancyRecord::new(
                                        rel_path,
                                        DiscrepancyKind::SemanticMismatch,
                                        &finding.doc_snippet,
                                        &finding.code_snippet,
                                    )
                                    .with_language(lang)
                                    .with_context(DiscrepancyContext {
                                        category: Some(finding.category),
                                        severity: Some(finding.severity),
                                        explanation: Some(finding.explanation),
                                        ..Default::default()
                                    }),
                                );
                            }
                        }
                        Err(err) => {
                            tracing::warn!(
                                "semantic comparison unavailable for {}: {:#}",
                                rel_path,
                                err
                            );
                        }
                    }
                }
            }
        }

        records
    }

    fn structured_record(
        &self,
        rel_path: &str,
        lang: &str,
        change: &crate::compare::ValueChange,
    ) -> DiscrepancyRecord {
        DiscrepancyRecord::new(
            rel_path,
            DiscrepancyKind::StructuredValueMismatch,
            &scoped_snippet(&change.path, &change.doc_value),
            &scoped_snippet(&change.path, &change.actual_value),
        )
        .with_language(lang)
        .with_context(DiscrepancyContext {
            path: Some(change.path.clone()),
            doc_value: Some(change.doc_value.to_string()),
            actual_value: Some(change.actual_value.to_string()),
            ..Default::default()
        })
    }

    fn notify_start(&self, stage: Stage) {
        tracing::debug!("stage {} started", stage);
        if let Some(ref observer) = self.observer {
            observer.stage_started(stage);
        }
    }

    fn notify_end(&self, stage: Stage) {
        tracing::debug!("stage {} completed", stage);
        if let Some(ref observer) = self.observer {
            observer.stage_completed(stage);
        }
    }

    fn notify_error(&self, stage: Stage, message: &str) {
        tracing::warn!("stage {} failed: {}", stage, message);
        if let Some(ref observer) = self.observer {
            observer.stage_failed(stage, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{MockComparator, SemanticFinding, Severity};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn reviewer() -> Reviewer {
        Reviewer::new(ReviewConfig::default())
    }

    #[test]
    fn test_missing_source_is_a_run_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = reviewer().review(&dir.path().join("missing.md"), dir.path());
        assert!(matches!(result, Err(ReviewError::SourceNotFound { .. })));
    }

    #[test]
    fn test_related_files_drive_verification() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/util.py",
            "def add(a, b):\n    return a - b\n",
        );
        write(
            dir.path(),
            "guide.md",
            "# Guide\n\n## Related Files\n\n- `src/util.py`\n\n```python\ndef add(a, b):\n    return a + b\n```\n",
        );

        let result = reviewer().review(&dir.path().join("guide.md"), dir.path()).unwrap();

        assert!(result.success);
        assert_eq!(result.related_files, vec!["src/util.py"]);
        assert_eq!(result.discrepancies.len(), 1);

        let record = &result.discrepancies[0];
        assert_eq!(record.file, "src/util.py");
        assert!(matches!(
            record.kind,
            DiscrepancyKind::VerbatimMismatch | DiscrepancyKind::NearMatch
        ));
        assert!(record.doc_snippet.contains("return a + b"));
        assert!(record.code_snippet.contains("return a - b"));
    }

    #[test]
    fn test_keyword_fallback_when_nothing_declared() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/app.py",
            "def greet():\n    return \"hello\"\n",
        );
        write(
            dir.path(),
            "guide.md",
            "# Guide\n\nCall `greet` like this:\n\n```python\ndef greet():\n    return \"hi\"\n```\n",
        );

        let result = reviewer().review(&dir.path().join("guide.md"), dir.path()).unwrap();

        assert!(result.related_files.is_empty());
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.discrepancies[0].file, "src/app.py");
    }

    #[test]
    fn test_identical_example_produces_no_records() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/util.py",
            "def add(a, b):\n    return a + b\n",
        );
        write(
            dir.path(),
            "guide.md",
            "## Related Files\n\n- `src/util.py`\n\n```python\ndef add(a, b):\n    return a + b\n```\n",
        );

        let result = reviewer().review(&dir.path().join("guide.md"), dir.path()).unwrap();
        assert!(result.discrepancies.is_empty());
        assert!(result.report.contains("No discrepancies found"));
    }

    #[test]
    fn test_structured_block_compared_by_value() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "settings.json", "{\"retries\": 5, \"debug\": false}\n");
        write(
            dir.path(),
            "guide.md",
            "## Related Files\n\n- `settings.json`\n\n```json\n{\"retries\": 3, \"debug\": false}\n```\n",
        );

        let result = reviewer().review(&dir.path().join("guide.md"), dir.path()).unwrap();

        assert_eq!(result.discrepancies.len(), 1);
        let record = &result.discrepancies[0];
        assert_eq!(record.kind, DiscrepancyKind::StructuredValueMismatch);

        let context = record.context.as_ref().unwrap();
        assert_eq!(context.path.as_deref(), Some("retries"));
        assert_eq!(context.doc_value.as_deref(), Some("3"));
        assert_eq!(context.actual_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_semantic_findings_appended() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/api.py", "def fetch(url, timeout):\n    pass\n");
        write(
            dir.path(),
            "guide.md",
            "## Related Files\n\n- `src/api.py`\n\n```python\nresult = fetch(url)\n```\n",
        );

        let mut mock = MockComparator::new();
        mock.add_finding(SemanticFinding {
            category: "parameter_mismatch".to_string(),
            severity: Severity::High,
            doc_snippet: "fetch(url)".to_string(),
            code_snippet: "fetch(url, timeout)".to_string(),
            explanation: "timeout argument is now required".to_string(),
        });

        let result = Reviewer::new(ReviewConfig::default())
            .with_comparator(Box::new(mock))
            .review(&dir.path().join("guide.md"), dir.path())
            .unwrap();

        let semantic: Vec<_> = result
            .discrepancies
            .iter()
            .filter(|r| r.kind == DiscrepancyKind::SemanticMismatch)
            .collect();
        assert_eq!(semantic.len(), 1);
        assert_eq!(
            semantic[0].context.as_ref().unwrap().severity,
            Some(Severity::High)
        );
    }

    #[test]
    fn test_comparator_failure_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/api.py", "def fetch(url, timeout):\n    pass\n");
        write(
            dir.path(),
            "guide.md",
            "## Related Files\n\n- `src/api.py`\n\n```python\nresult = fetch(url)\n```\n",
        );

        let result = Reviewer::new(ReviewConfig::default())
            .with_comparator(Box::new(MockComparator::failing()))
            .review(&dir.path().join("guide.md"), dir.path());

        // The run completes; the failed comparison contributes nothing
        assert!(result.unwrap().success);
    }

    #[test]
    fn test_explicit_target_restricts_verification() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.py", "def f():\n    return 1\n");
        write(dir.path(), "src/b.py", "def f():\n    return 2\n");
        write(
            dir.path(),
            "guide.md",
            "## Related Files\n\n- `src/a.py`\n- `src/b.py`\n\n```python\ndef f():\n    return 9\n```\n",
        );

        let result = reviewer()
            .review_target(&dir.path().join("guide.md"), dir.path(), "src/b.py")
            .unwrap();

        assert!(result.discrepancies.iter().all(|r| r.file == "src/b.py"));
    }

    #[test]
    fn test_observer_sees_stage_boundaries() {
        struct Counter(Arc<AtomicUsize>);

        impl ReviewObserver for Counter {
            fn stage_completed(&self, _stage: Stage) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "guide.md", "# Empty guide\n");

        let completed = Arc::new(AtomicUsize::new(0));
        let reviewer = Reviewer::new(ReviewConfig::default())
            .with_observer(Box::new(Counter(Arc::clone(&completed))));

        reviewer.review(&dir.path().join("guide.md"), dir.path()).unwrap();

        // fetch, extract-references, locate-candidates, verify, build-report
        assert_eq!(completed.load(Ordering::SeqCst), 5);
    }
}
