//! Code block and keyword extraction using Markdown parsing

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// A code block found in documentation
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// Language identifier (if specified)
    pub language: Option<String>,
    /// Code content
    pub content: String,
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:class|def|function|const|let|var)\s+(\w+)").expect("valid regex")
    })
}

/// Extract fenced and indented code blocks from Markdown content
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let parser = Parser::new(content);

    let mut in_code_block = false;
    let mut code_content = String::new();
    let mut code_lang = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_content.clear();
                code_lang = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        let lang_str = lang.to_string();
                        if lang_str.is_empty() {
                            None
                        } else {
                            Some(lang_str)
                        }
                    }
                    CodeBlockKind::Indented => None,
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                blocks.push(CodeBlock {
                    language: code_lang.take(),
                    content: code_content.clone(),
                });
            }
            Event::Text(text) if in_code_block => {
                code_content.push_str(&text);
            }
            _ => {}
        }
    }

    blocks
}

/// Extract identifier-like keywords from all code spans.
///
/// Fenced blocks contribute declaration names (`class X`, `def x`,
/// `function x`, `const x`, `let x`, `var x`); inline code spans
/// contribute their full text as a term. Returns a sorted, deduplicated
/// bag; used for codebase search when no related files are declared.
pub fn extract_keywords(content: &str) -> Vec<String> {
    let mut keywords: BTreeSet<String> = BTreeSet::new();
    let parser = Parser::new(content);

    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if in_code_block => {
                for captures in declaration_re().captures_iter(&text) {
                    if let Some(name) = captures.get(1) {
                        keywords.insert(name.as_str().to_string());
                    }
                }
            }
            Event::Code(code) => {
                let term = code.trim();
                if !term.is_empty() {
                    keywords.insert(term.to_string());
                }
            }
            _ => {}
        }
    }

    keywords.into_iter().collect()
}

/// Group trimmed code blocks by lowercased language tag.
///
/// Untagged blocks and languages in the skip list (shell transcripts,
/// command output) are dropped; they are not comparable code samples.
pub fn group_blocks_by_language(
    blocks: &[CodeBlock],
    skip_languages: &[String],
) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for block in blocks {
        let Some(ref language) = block.language else {
            continue;
        };
        let lang = language.to_lowercase();
        if lang.is_empty() || skip_languages.iter().any(|s| s == &lang) {
            continue;
        }

        let body = block.content.trim();
        if body.is_empty() {
            continue;
        }

        grouped.entry(lang).or_default().push(body.to_string());
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_blocks() {
        let content = r#"
# Example

```rust
fn main() {
    println!("Hello");
}
```

```python
print("Hello")
```
"#;
        let blocks = extract_code_blocks(content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, Some("rust".to_string()));
        assert_eq!(blocks[1].language, Some("python".to_string()));
        assert!(blocks[1].content.contains("print"));
    }

    #[test]
    fn test_extract_keywords_declarations() {
        let content = r#"
```python
class Parser:
    pass

def parse(text):
    pass
```

```js
const MAX_RETRIES = 3;
let cursor = 0;
function render() {}
var legacy = true;
```
"#;
        let keywords = extract_keywords(content);
        for expected in ["Parser", "parse", "MAX_RETRIES", "cursor", "render", "legacy"] {
            assert!(keywords.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_extract_keywords_inline_code() {
        let content = "Call `init_session` before `close`.";
        let keywords = extract_keywords(content);
        assert_eq!(keywords, vec!["close", "init_session"]);
    }

    #[test]
    fn test_extract_keywords_deduplicates() {
        let content = "Use `run` then `run` again.";
        assert_eq!(extract_keywords(content), vec!["run"]);
    }

    #[test]
    fn test_group_blocks_by_language() {
        let blocks = vec![
            CodeBlock {
                language: Some("Python".to_string()),
                content: "x = 1\n".to_string(),
            },
            CodeBlock {
                language: Some("python".to_string()),
                content: "y = 2\n".to_string(),
            },
            CodeBlock {
                language: Some("bash".to_string()),
                content: "ls\n".to_string(),
            },
            CodeBlock {
                language: None,
                content: "plain\n".to_string(),
            },
        ];

        let skip = vec!["bash".to_string(), "shell".to_string()];
        let grouped = group_blocks_by_language(&blocks, &skip);

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["python"], vec!["x = 1", "y = 2"]);
    }
}
