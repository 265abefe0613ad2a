//! Prompt book loading and placeholder substitution.

use regex::Regex;
use scenarist_core::FactsAlgorithm;
use scenarist_error::{WorkflowError, WorkflowErrorKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

const BUNDLED_PROMPTS: &str = include_str!("../prompts.toml");

#[derive(Debug, Deserialize)]
struct PromptFile {
    prompts: HashMap<String, String>,
    #[serde(default)]
    lenses: HashMap<String, Vec<String>>,
}

/// Named prompt templates with `{placeholder}` substitution.
///
/// Templates live under `[prompts]`; per-algorithm lens focuses under
/// `[lenses]`, keyed by the algorithm's prompt key.
///
/// # Example
///
/// ```
/// use scenarist_workflow::PromptBook;
///
/// let book: PromptBook = r#"
/// [prompts]
/// structure = "Design {num_series} episodes about {topic}."
/// "#
/// .parse()
/// .unwrap();
///
/// let prompt = book.render("structure", &[("num_series", "4")]).unwrap();
/// assert_eq!(prompt, "Design 4 episodes about {topic}.");
/// ```
#[derive(Debug, Clone)]
pub struct PromptBook {
    prompts: HashMap<String, String>,
    lenses: HashMap<String, Vec<String>>,
    placeholder: Regex,
}

impl PromptBook {
    /// The prompt book shipped with the crate.
    pub fn bundled() -> Result<Self, WorkflowError> {
        BUNDLED_PROMPTS.parse()
    }

    /// Load a prompt book from a TOML file.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::new(WorkflowErrorKind::PromptBookParse(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        content.parse()
    }

    /// The file at `path` when given, else the bundled book.
    pub fn load(path: Option<&Path>) -> Result<Self, WorkflowError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Whether a template exists.
    pub fn contains(&self, key: &str) -> bool {
        self.prompts.contains_key(key)
    }

    /// Raw template text.
    ///
    /// # Errors
    ///
    /// `MissingPrompt` when the key is absent.
    pub fn get(&self, key: &str) -> Result<&str, WorkflowError> {
        self.prompts
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::MissingPrompt(key.to_string())))
    }

    /// Fill `{name}` placeholders from `vars` in a single pass.
    ///
    /// Substituted values are not rescanned, and placeholders without a value
    /// are kept verbatim.
    pub fn render(&self, key: &str, vars: &[(&str, &str)]) -> Result<String, WorkflowError> {
        let template = self.get(key)?;
        let rendered = self
            .placeholder
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                vars.iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| (*v).to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            });
        Ok(rendered.trim().to_string())
    }

    /// Focus of lens `lens_number` (1-based); cycles when there are more
    /// lenses than focuses, empty when none are configured.
    pub fn lens_focus(&self, algorithm: FactsAlgorithm, lens_number: u32) -> &str {
        match self.lenses.get(algorithm.prompt_key()) {
            Some(focuses) if !focuses.is_empty() => {
                let index = (lens_number.saturating_sub(1) as usize) % focuses.len();
                &focuses[index]
            }
            _ => "",
        }
    }
}

impl FromStr for PromptBook {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let file: PromptFile = toml::from_str(s).map_err(|e| {
            WorkflowError::new(WorkflowErrorKind::PromptBookParse(e.to_string()))
        })?;
        let placeholder = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            WorkflowError::new(WorkflowErrorKind::PromptBookParse(format!(
                "Invalid placeholder pattern: {}",
                e
            )))
        })?;
        Ok(Self {
            prompts: file.prompts,
            lenses: file.lenses,
            placeholder,
        })
    }
}
