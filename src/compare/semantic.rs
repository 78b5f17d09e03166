//! Semantic comparison through an external language-model service
//!
//! Non-structured code blocks whose drift goes beyond formatting need a
//! judgment call: renamed parameters, changed APIs, deprecated patterns.
//! That judgment is delegated to an external comparison service behind
//! the `SemanticComparator` trait; the pipeline treats its failures as
//! soft and contributes zero findings for the affected blocks.

use super::Severity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One finding returned by the semantic comparison service
#[derive(Debug, Clone)]
pub struct SemanticFinding {
    /// Finding category (api_change, parameter_mismatch, ...)
    pub category: String,
    /// Reported severity
    pub severity: Severity,
    /// Relevant code from the documentation
    pub doc_snippet: String,
    /// Relevant code from the implementation
    pub code_snippet: String,
    /// Explanation of the difference
    pub explanation: String,
}

/// Compares documentation code blocks against real code by meaning
pub trait SemanticComparator {
    /// Compare the given documentation blocks against the actual file content.
    ///
    /// Returns an empty list when the code is equivalent.
    fn compare(
        &self,
        language: &str,
        file_path: &str,
        actual_code: &str,
        doc_blocks: &[String],
    ) -> Result<Vec<SemanticFinding>>;
}

/// Configuration for the language-model comparator
#[derive(Debug, Clone)]
pub struct ComparatorConfig {
    /// API endpoint URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// API key (optional)
    pub api_key: Option<String>,
    /// Maximum tokens for response
    pub max_tokens: usize,
    /// Temperature for generation
    pub temperature: f32,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            api_key: None,
            max_tokens: 4096,
            temperature: 0.0,
        }
    }
}

/// Language-model-backed semantic comparator
pub struct LlmComparator {
    config: ComparatorConfig,
    client: reqwest::blocking::Client,
}

impl LlmComparator {
    /// Create a new comparator
    pub fn new(config: ComparatorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Create with an OpenAI-compatible endpoint
    pub fn openai_compatible(endpoint: &str, model: &str, api_key: Option<&str>) -> Result<Self> {
        Self::new(ComparatorConfig {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            ..Default::default()
        })
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        if self.config.endpoint.contains("11434") {
            self.complete_ollama(prompt)
        } else {
            self.complete_openai(prompt)
        }
    }

    /// Generate completion using the Ollama API
    fn complete_ollama(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.endpoint);

        let request = OllamaGenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens as i32,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Ollama request failed: {} - {}", status, body);
        }

        let result: OllamaGenerateResponse =
            response.json().context("Failed to parse Ollama response")?;

        Ok(result.response)
    }

    /// Generate completion using an OpenAI-compatible API
    fn complete_openai(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);

        let request = OpenAIChatRequest {
            model: self.config.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let mut req_builder = self.client.post(&url).json(&request);

        if let Some(ref key) = self.config.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = req_builder
            .send()
            .context("Failed to send request to OpenAI-compatible API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Comparison request failed: {} - {}", status, body);
        }

        let result: OpenAIChatResponse = response
            .json()
            .context("Failed to parse comparison response")?;

        Ok(result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

impl SemanticComparator for LlmComparator {
    fn compare(
        &self,
        language: &str,
        file_path: &str,
        actual_code: &str,
        doc_blocks: &[String],
    ) -> Result<Vec<SemanticFinding>> {
        let prompt = build_comparison_prompt(language, file_path, actual_code, doc_blocks);
        let content = self.complete(&prompt)?;

        let analysis: AnalysisResponse = serde_json::from_str(content.trim())
            .context("Failed to parse comparison analysis as JSON")?;

        Ok(analysis
            .discrepancies
            .into_iter()
            .map(|entry| SemanticFinding {
                category: entry.category,
                severity: Severity::parse_lossy(&entry.severity),
                doc_snippet: entry.docs_version,
                code_snippet: entry.code_version,
                explanation: entry.explanation,
            })
            .collect())
    }
}

const COMPARISON_SYSTEM_PROMPT: &str = "You are performing a documentation verification task. \
You need to compare code examples from documentation against the actual codebase implementation.";

const COMPARISON_INSTRUCTIONS: &str = r#"Analyze the differences and provide a structured response in the following format:
{
    "discrepancies": [
        {
            "type": "semantic_difference|api_change|parameter_mismatch|deprecated_feature|best_practice|other",
            "severity": "high|medium|low",
            "docs_version": "relevant code from docs",
            "code_version": "relevant code from implementation",
            "explanation": "detailed explanation of the difference"
        }
    ]
}

Only include actual discrepancies. If the code is equivalent, return an empty list."#;

/// Build the comparison prompt for one language group
fn build_comparison_prompt(
    language: &str,
    file_path: &str,
    actual_code: &str,
    doc_blocks: &[String],
) -> String {
    let mut prompt = String::new();

    prompt.push_str(COMPARISON_SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Language: {}\n", language));
    prompt.push_str(&format!("File: {}\n\n", file_path));

    prompt.push_str("Your task is to:\n");
    prompt.push_str("1. Compare the documentation code examples against the actual implementation\n");
    prompt.push_str("2. Identify any semantic differences, inconsistencies, or outdated patterns\n");
    prompt.push_str("3. Consider both exact matches and logically equivalent code\n");
    prompt.push_str("4. Pay special attention to API changes, parameter differences, type changes, structural changes, and deprecated features\n\n");

    prompt.push_str("Actual codebase implementation:\n");
    prompt.push_str(&format!("```{}\n{}\n```\n\n", language, actual_code));

    prompt.push_str("Documentation code examples:\n");
    for (i, block) in doc_blocks.iter().enumerate() {
        prompt.push_str(&format!(
            "\nExample {}:\n```{}\n{}\n```\n",
            i + 1,
            language,
            block
        ));
    }

    prompt.push('\n');
    prompt.push_str(COMPARISON_INSTRUCTIONS);

    prompt
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

// Service response schema

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    discrepancies: Vec<AnalysisEntry>,
}

#[derive(Debug, Deserialize)]
struct AnalysisEntry {
    #[serde(rename = "type", default)]
    category: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    docs_version: String,
    #[serde(default)]
    code_version: String,
    #[serde(default)]
    explanation: String,
}

/// Mock comparator for testing
pub struct MockComparator {
    findings: Vec<SemanticFinding>,
    fail: bool,
}

impl MockComparator {
    /// Create a mock that returns no findings
    pub fn new() -> Self {
        Self {
            findings: Vec::new(),
            fail: false,
        }
    }

    /// Create a mock that errors on every call
    pub fn failing() -> Self {
        Self {
            findings: Vec::new(),
            fail: true,
        }
    }

    /// Add a canned finding
    pub fn add_finding(&mut self, finding: SemanticFinding) {
        self.findings.push(finding);
    }
}

impl SemanticComparator for MockComparator {
    fn compare(
        &self,
        _language: &str,
        _file_path: &str,
        _actual_code: &str,
        _doc_blocks: &[String],
    ) -> Result<Vec<SemanticFinding>> {
        if self.fail {
            anyhow::bail!("comparison service unavailable");
        }
        Ok(self.findings.clone())
    }
}

impl Default for MockComparator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_all_blocks() {
        let blocks = vec!["x = 1".to_string(), "y = 2".to_string()];
        let prompt = build_comparison_prompt("python", "src/conf.py", "x = 3\ny = 4\n", &blocks);

        assert!(prompt.contains("Language: python"));
        assert!(prompt.contains("File: src/conf.py"));
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.contains("Example 2:"));
        assert!(prompt.contains("x = 1"));
        assert!(prompt.contains("y = 4"));
    }

    #[test]
    fn test_analysis_response_parsing() {
        let raw = r#"{
            "discrepancies": [
                {
                    "type": "api_change",
                    "severity": "high",
                    "docs_version": "old()",
                    "code_version": "new()",
                    "explanation": "renamed"
                }
            ]
        }"#;

        let parsed: AnalysisResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.discrepancies.len(), 1);
        assert_eq!(parsed.discrepancies[0].category, "api_change");
    }

    #[test]
    fn test_mock_comparator() {
        let mut mock = MockComparator::new();
        mock.add_finding(SemanticFinding {
            category: "api_change".to_string(),
            severity: Severity::High,
            doc_snippet: "old()".to_string(),
            code_snippet: "new()".to_string(),
            explanation: "renamed".to_string(),
        });

        let findings = mock.compare("python", "a.py", "new()", &["old()".to_string()]).unwrap();
        assert_eq!(findings.len(), 1);

        assert!(MockComparator::failing()
            .compare("python", "a.py", "", &[])
            .is_err());
    }
}
