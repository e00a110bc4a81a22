//! Prompt library for remote narrative generation
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/fintrack/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXPENSE_ANALYSIS: &str = include_str!("../../../prompts/expense_analysis.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Period summary with spending patterns and recommendations
    ExpenseAnalysis,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpenseAnalysis => "expense_analysis",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::ExpenseAnalysis]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::ExpenseAnalysis => defaults::EXPENSE_ANALYSIS,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Path to the override file this came from, if any
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section; `None` when the prompt has none
    pub fn render_system(&self, vars: &HashMap<&str, String>) -> Option<String> {
        self.system_section().map(|s| render_template(s, vars))
    }

    /// Render the user section, or the whole content if there are no sections
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        render_template(self.user_section().unwrap_or(&self.content), vars)
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a prompt library with the default override directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Embedded prompts only, ignoring any override files
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::InvalidData(format!("Prompt {} not cached", id.as_str())))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(ref override_dir) = self.override_dir {
            let override_path = override_dir.join(format!("{}.md", id.as_str()));
            if override_path.exists() {
                let content = fs::read_to_string(&override_path)?;
                let (metadata, body) = parse_prompt(&content)?;
                tracing::debug!(path = %override_path.display(), "Using prompt override");
                return Ok(Prompt {
                    metadata,
                    content: body,
                    override_path: Some(override_path),
                });
            }
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            override_path: None,
        })
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("prompts").join("overrides"))
}

/// Split a prompt file into frontmatter metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content.strip_prefix("---").ok_or_else(|| {
        Error::InvalidData("Prompt must start with YAML frontmatter (---)".into())
    })?;

    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];
    let end = after_header.find("\n# ").unwrap_or(after_header.len());
    Some(after_header[..end].trim())
}

/// Replace `{{var}}` placeholders and resolve `{{#if var}}...{{/if}}` blocks
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = resolve_conditionals(template, vars);
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

fn resolve_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim().to_string();
        let block_start = var_start + var_end + 2;
        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_end = block_start + endif_pos;
        let full_end = block_end + 7;

        let keep = vars.get(var_name.as_str()).is_some_and(|v| !v.is_empty());
        let replacement = if keep {
            result[block_start..block_end].to_string()
        } else {
            String::new()
        };
        result = format!("{}{}{}", &result[..if_start], replacement, &result[full_end..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_embedded_prompt_parses() {
        let mut library = PromptLibrary::embedded_only();
        let prompt = library.get(PromptId::ExpenseAnalysis).unwrap();

        assert_eq!(prompt.metadata.id, "expense_analysis");
        assert!(prompt.override_path.is_none());
        assert!(prompt
            .system_section()
            .unwrap()
            .contains("financial advisor"));
        assert!(prompt.user_section().unwrap().contains("Category Breakdown"));
    }

    #[test]
    fn test_render_user_substitutes_vars() {
        let mut library = PromptLibrary::embedded_only();
        let prompt = library.get(PromptId::ExpenseAnalysis).unwrap();
        let rendered = prompt.render_user(&vars(&[
            ("start_date", "2024-01-01"),
            ("end_date", "2024-01-31"),
            ("total", "₹250.00"),
            ("count", "3"),
            ("average", "₹83.33"),
            ("category_breakdown", "- FOOD: ₹200.00\n- TRANSPORTATION: ₹50.00"),
        ]));

        assert!(rendered.contains("Period: 2024-01-01 to 2024-01-31"));
        assert!(rendered.contains("Total Expenses: ₹250.00"));
        assert!(rendered.contains("Number of Transactions: 3"));
        assert!(rendered.contains("Average Transaction: ₹83.33"));
        assert!(rendered.contains("- FOOD: ₹200.00"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_conditional_block_removed_when_missing() {
        let rendered = render_template("a{{#if x}} [{{x}}]{{/if}} b", &vars(&[]));
        assert_eq!(rendered, "a b");

        let rendered = render_template("a{{#if x}} [{{x}}]{{/if}} b", &vars(&[("x", "1")]));
        assert_eq!(rendered, "a [1] b");
    }

    #[test]
    fn test_override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("expense_analysis.md"),
            "---\nid: expense_analysis\nversion: 9\n---\n\n# System\n\nBe brief.\n\n# User\n\nSpent {{total}}.",
        )
        .unwrap();

        let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = library.get(PromptId::ExpenseAnalysis).unwrap();

        assert_eq!(prompt.metadata.version, 9);
        assert!(prompt.override_path.is_some());
        assert_eq!(prompt.render_user(&vars(&[("total", "₹1.00")])), "Spent ₹1.00.");
        assert_eq!(
            prompt.render_system(&vars(&[])).as_deref(),
            Some("Be brief.")
        );
    }

    #[test]
    fn test_missing_frontmatter_rejected() {
        assert!(parse_prompt("# User\n\nhello").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n").is_err());
    }
}
