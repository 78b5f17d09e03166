//! Codebase search for keyword references
//!
//! Given a keyword set extracted from documentation, find the files in a
//! repository tree that mention any of them. The walk honors the root's
//! ignore files, skips hidden entries, and reads only an allow-list of
//! text/source extensions.

use crate::config::ReviewConfig;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::Path;

/// Searches a repository tree for files containing keywords
pub struct Locator {
    searchable_extensions: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl Locator {
    /// Create a locator with the default extension filters
    pub fn new() -> Self {
        Self::from_config(&ReviewConfig::default())
    }

    /// Create a locator from a review configuration
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            searchable_extensions: config.searchable_extensions.clone(),
            excluded_extensions: config.excluded_extensions.clone(),
        }
    }

    /// Find files under `root` whose content contains at least one keyword.
    ///
    /// A file is added on its first matching keyword; remaining keywords
    /// are not checked for that file. Unreadable files are skipped.
    /// Returns root-relative paths, sorted and deduplicated.
    pub fn search(&self, root: &Path, keywords: &[String]) -> Vec<String> {
        if keywords.is_empty() {
            return Vec::new();
        }

        tracing::info!(
            "searching {:?} for {} keyword(s)",
            root,
            keywords.len()
        );

        let mut matches: BTreeSet<String> = BTreeSet::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .build();

        for entry in walker {
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

            let path = entry.path();
            if !self.is_searchable(path) {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!("failed to read {:?}: {}", path, err);
                    continue;
                }
            };

            if keywords.iter().any(|keyword| content.contains(keyword)) {
                let relative = path
                    .strip_prefix(root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string();
                tracing::debug!("keyword match in {}", relative);
                matches.insert(relative);
            }
        }

        tracing::info!("search complete, {} file(s) matched", matches.len());
        matches.into_iter().collect()
    }

    /// Apply the extension filters, excluded list first
    fn is_searchable(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let extension = extension.to_lowercase();

        if self.excluded_extensions.iter().any(|e| e == &extension) {
            return false;
        }

        self.searchable_extensions.iter().any(|e| e == &extension)
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_search_finds_keyword_match() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/util.py", "def add(a, b):\n    return a + b\n");
        write(dir.path(), "src/other.py", "def sub(a, b):\n    return a - b\n");

        let locator = Locator::new();
        let found = locator.search(dir.path(), &["add".to_string()]);
        assert_eq!(found, vec!["src/util.py"]);
    }

    #[test]
    fn test_search_first_keyword_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "alpha and beta\n");

        let locator = Locator::new();
        let keywords = vec!["alpha".to_string(), "beta".to_string()];
        // File appears once even though both keywords match
        assert_eq!(locator.search(dir.path(), &keywords), vec!["a.py"]);
    }

    #[test]
    fn test_search_respects_extension_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "keyword here\n");
        write(dir.path(), "noext", "keyword here\n");
        write(dir.path(), "code.py", "keyword here\n");

        let locator = Locator::new();
        let found = locator.search(dir.path(), &["keyword".to_string()]);
        assert_eq!(found, vec!["code.py"]);
    }

    #[test]
    fn test_search_honors_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "generated/out.py", "keyword here\n");
        write(dir.path(), "src/kept.py", "keyword here\n");

        let locator = Locator::new();
        let found = locator.search(dir.path(), &["keyword".to_string()]);
        assert_eq!(found, vec!["src/kept.py"]);
    }

    #[test]
    fn test_search_empty_keywords() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "anything\n");

        let locator = Locator::new();
        assert!(locator.search(dir.path(), &[]).is_empty());
    }
}
