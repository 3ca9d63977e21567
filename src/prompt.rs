//! Interactive prompt surface.
//!
//! The pipeline prompts only for the handful of decisions listed in the
//! design: missing identity fields, repository name and version
//! confirmation, the rebuild-on-missing-installer question, and the
//! redistributable fallback. Everything else is derived or configured.

use crate::error::PromptError;
use dialoguer::{Confirm, Input};

/// Seam for interactive input, so stages stay testable without a TTY.
pub trait Prompter: Send + Sync {
    /// Ask for a free-form value, with an optional default.
    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Ask a yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;
}

/// Terminal prompter backed by `dialoguer`.
///
/// With `assume_yes`, confirmations auto-accept and inputs fall back to
/// their defaults, failing when a value has no default.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    /// Create a terminal prompter.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        if self.assume_yes {
            return match default {
                Some(value) => Ok(value.to_string()),
                None => Err(PromptError::NonInteractive {
                    field: message.to_string(),
                }),
            };
        }

        let mut prompt = Input::<String>::new().with_prompt(message);
        if let Some(value) = default {
            prompt = prompt.default(value.to_string());
        }
        Ok(prompt.interact_text()?)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        if self.assume_yes {
            return Ok(true);
        }
        Ok(Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()?)
    }
}
