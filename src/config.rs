//! Review configuration for DocAudit

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file name at the repository root
pub const CONFIG_FILE: &str = ".docaudit.toml";

/// Configuration for a documentation review run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// File extensions eligible for codebase search (without dot)
    #[serde(default = "default_searchable_extensions")]
    pub searchable_extensions: Vec<String>,

    /// Binary/compiled extensions always excluded from search (without dot)
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Fence languages skipped during verification (shell transcripts etc.)
    #[serde(default = "default_skip_languages")]
    pub skip_languages: Vec<String>,

    /// Fence languages compared by value instead of by text
    #[serde(default = "default_structured_languages")]
    pub structured_languages: Vec<String>,

    /// Similarity ratio above which a diverged code example is reported (0.0 - 1.0)
    #[serde(default = "default_near_match_threshold")]
    pub near_match_threshold: f64,

    /// Semantic comparison service configuration
    #[serde(default)]
    pub semantic: SemanticConfig,
}

/// Semantic comparison service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SemanticConfig {
    /// API endpoint URL (e.g., http://localhost:11434 for Ollama)
    pub endpoint: Option<String>,

    /// Model name to use
    pub model: Option<String>,

    /// API key (if required)
    pub api_key: Option<String>,

    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_searchable_extensions() -> Vec<String> {
    ["py", "js", "ts", "jsx", "tsx", "md", "mdx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "pyc", "pyo", "pyd", "so", "dll", "dylib", "class", "exe", "bin", "pkl", "db",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_languages() -> Vec<String> {
    ["bash", "shell", "console", "output"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_structured_languages() -> Vec<String> {
    vec!["json".to_string()]
}

fn default_near_match_threshold() -> f64 {
    0.6
}

fn default_max_tokens() -> usize {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            searchable_extensions: default_searchable_extensions(),
            excluded_extensions: default_excluded_extensions(),
            skip_languages: default_skip_languages(),
            structured_languages: default_structured_languages(),
            near_match_threshold: default_near_match_threshold(),
            semantic: SemanticConfig::default(),
        }
    }
}

impl ReviewConfig {
    /// Load configuration from the repository root or return defaults
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: ReviewConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the repository root
    pub fn save(&self, repo_root: &Path) -> Result<()> {
        let config_path = repo_root.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Check if a fence language is compared by value
    pub fn is_structured_language(&self, lang: &str) -> bool {
        self.structured_languages.iter().any(|s| s == lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReviewConfig::default();
        assert!(config.searchable_extensions.contains(&"py".to_string()));
        assert!(config.excluded_extensions.contains(&"pyc".to_string()));
        assert!(config.is_structured_language("json"));
        assert!(!config.is_structured_language("python"));
        assert!(config.near_match_threshold > 0.0);
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReviewConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.skip_languages, ReviewConfig::default().skip_languages);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ReviewConfig::default();
        config.near_match_threshold = 0.8;
        config.save(dir.path()).unwrap();

        let reloaded = ReviewConfig::load_or_default(dir.path()).unwrap();
        assert!((reloaded.near_match_threshold - 0.8).abs() < f64::EPSILON);
    }
}
