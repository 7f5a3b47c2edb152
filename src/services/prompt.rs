use anyhow::{Context, Result};

/// Asks the operator yes/no questions.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Answers yes to everything. Used with `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoAccept;

impl Prompter for AutoAccept {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Interactive prompt on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact()
            .context("Failed to read answer from terminal")
    }
}
