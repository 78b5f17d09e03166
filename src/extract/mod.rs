//! Reference and code sample extraction from documentation
//!
//! This module pulls the reviewable material out of a documentation file:
//! - file paths declared in a "Related Files" section
//! - fenced code blocks, grouped by language for comparison
//! - identifier-like keywords used to search the codebase

pub mod blocks;
pub mod refs;

pub use blocks::{extract_code_blocks, extract_keywords, group_blocks_by_language, CodeBlock};
pub use refs::{extract_related_files, normalize_path};

/// References extracted from one documentation file
#[derive(Debug, Clone, Default)]
pub struct DocReferences {
    /// Normalized file paths from the "Related Files" section (or the
    /// structured-block fallback). Sorted and deduplicated.
    pub related_files: Vec<String>,
    /// Bare identifier keywords from code spans. Sorted and deduplicated.
    pub keywords: Vec<String>,
}

impl DocReferences {
    /// True when neither extraction pass produced anything
    pub fn is_empty(&self) -> bool {
        self.related_files.is_empty() && self.keywords.is_empty()
    }
}

/// Run both extraction passes over documentation content
pub fn extract_references(content: &str) -> DocReferences {
    DocReferences {
        related_files: extract_related_files(content),
        keywords: extract_keywords(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_references_empty_doc() {
        let refs = extract_references("Just prose, no code at all.");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_extract_references_both_passes() {
        let content = r#"# Guide

## Related Files

- `src/util.py`

```python
def add(a, b):
    return a + b
```
"#;
        let refs = extract_references(content);
        assert_eq!(refs.related_files, vec!["src/util.py"]);
        assert!(refs.keywords.contains(&"add".to_string()));
    }
}
