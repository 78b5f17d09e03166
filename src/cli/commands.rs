//! Command implementations

use super::{LocateArgs, RefsArgs, ReviewArgs, ReviewDirArgs, VerifyArgs};
use crate::compare::{ComparatorConfig, LlmComparator};
use crate::config::ReviewConfig;
use crate::extract::{extract_references, DocReferences};
use crate::locate::Locator;
use crate::publish::DiscussionClient;
use crate::review::{Document, ReviewResult, Reviewer};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;

/// Review one documentation file, optionally publishing the report
pub fn review(repo_root: &Path, args: &ReviewArgs) -> Result<ReviewResult> {
    let config = ReviewConfig::load_or_default(repo_root)?;
    let reviewer = build_reviewer(config)?;

    let doc_path = Path::new(&args.doc);
    let mut result = match args.target {
        Some(ref target) => reviewer.review_target(doc_path, repo_root, target)?,
        None => reviewer.review(doc_path, repo_root)?,
    };

    if args.post {
        let token = args
            .token
            .as_deref()
            .context("GitHub token is required when posting (set --token or GITHUB_TOKEN)")?;
        let repo_name = args
            .repo_name
            .as_deref()
            .context("--repo-name is required when posting")?;
        let category_id = args
            .category_id
            .as_deref()
            .context("--category-id is required when posting")?;

        // A malformed repository name or category id is a caller error,
        // not a delivery failure
        if repo_name.split_once('/').is_none() {
            anyhow::bail!("Invalid repository name '{}', expected owner/name", repo_name);
        }
        if category_id.trim().is_empty() {
            anyhow::bail!("Category id must not be empty");
        }

        let client = DiscussionClient::new(token)?;
        match client.post_report(repo_name, category_id, &result.source, &result.report) {
            Ok(published) => {
                println!("✓ Report published at {}", published.comment_url);
            }
            Err(err) => {
                tracing::error!("failed to publish report: {:#}", err);
                eprintln!("⚠ Failed to publish report: {:#}", err);
                result.success = false;
            }
        }
    }

    Ok(result)
}

/// Review every markdown file under a directory
pub fn review_dir(repo_root: &Path, args: &ReviewDirArgs) -> Result<Vec<ReviewResult>> {
    let dir = Path::new(&args.dir);
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let config = ReviewConfig::load_or_default(repo_root)?;
    let reviewer = build_reviewer(config)?;

    let mut doc_paths = Vec::new();
    for entry in WalkBuilder::new(dir).require_git(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if matches!(ext, "md" | "mdx") {
            doc_paths.push(entry.into_path());
        }
    }
    doc_paths.sort();

    println!("Reviewing {} documentation file(s) in {:?}\n", doc_paths.len(), dir);

    let mut results = Vec::new();
    for doc_path in doc_paths {
        match reviewer.review(&doc_path, repo_root) {
            Ok(result) => {
                println!(
                    "  {} {}: {} discrepancy(ies)",
                    if result.discrepancies.is_empty() { "✓" } else { "⚠" },
                    result.source,
                    result.discrepancies.len()
                );
                results.push(result);
            }
            Err(err) => {
                tracing::warn!("review failed for {:?}: {:#}", doc_path, anyhow::Error::from(err));
            }
        }
    }

    Ok(results)
}

/// Show the references a documentation file makes
pub fn refs(doc: &RefsArgs) -> Result<DocReferences> {
    let document = Document::load(Path::new(&doc.doc))?;
    Ok(extract_references(&document.body))
}

/// Find repository files containing the given keywords
pub fn locate(repo_root: &Path, args: &LocateArgs) -> Result<Vec<String>> {
    let config = ReviewConfig::load_or_default(repo_root)?;
    let locator = Locator::from_config(&config);
    Ok(locator.search(repo_root, &args.keywords))
}

/// Verify a documentation file against one specific source file
pub fn verify(repo_root: &Path, args: &VerifyArgs) -> Result<ReviewResult> {
    let config = ReviewConfig::load_or_default(repo_root)?;
    let reviewer = build_reviewer(config)?;
    Ok(reviewer.review_target(Path::new(&args.doc), repo_root, &args.file)?)
}

/// Build a reviewer, attaching the semantic comparator when configured
fn build_reviewer(config: ReviewConfig) -> Result<Reviewer> {
    let comparator = match (&config.semantic.endpoint, &config.semantic.model) {
        (Some(endpoint), Some(model)) => Some(LlmComparator::new(ComparatorConfig {
            endpoint: endpoint.clone(),
            model: model.clone(),
            api_key: config.semantic.api_key.clone(),
            max_tokens: config.semantic.max_tokens,
            temperature: config.semantic.temperature,
        })?),
        _ => None,
    };

    let mut reviewer = Reviewer::new(config);
    if let Some(comparator) = comparator {
        reviewer = reviewer.with_comparator(Box::new(comparator));
    }
    Ok(reviewer)
}

/// Print a review result in JSON format
pub fn print_result_json(result: &ReviewResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

/// Print a review result in text format
pub fn print_result_text(result: &ReviewResult) {
    println!("{}", result.report);

    if !result.success {
        eprintln!("⚠ Report delivery failed; the analysis above is complete.");
    }
}

/// Print extracted references in text format
pub fn print_refs_text(references: &DocReferences) {
    println!("Related files:");
    if references.related_files.is_empty() {
        println!("  (none declared)");
    } else {
        for file in &references.related_files {
            println!("  - {}", file);
        }
    }

    println!("\nKeywords:");
    if references.keywords.is_empty() {
        println!("  (none found)");
    } else {
        for keyword in &references.keywords {
            println!("  - {}", keyword);
        }
    }
}
