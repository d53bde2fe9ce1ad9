//! Interactive input for `configure`.
//!
//! Commands ask a [`Prompter`] for missing values so that tests can script
//! the answers. [`TerminalPrompter`] uses `inquire` when a person is at the
//! keyboard and refuses otherwise.

use anyhow::{Result, anyhow};
use inquire::{Password, PasswordDisplayMode, Text};
use is_terminal::IsTerminal;

use crate::error::CliError;

/// Environment variable that disables prompting even on a terminal.
pub const NON_INTERACTIVE_ENV: &str = "QTOOL_NON_INTERACTIVE";

/// Source of answers for values missing from the command line.
pub trait Prompter {
    /// Ask for a line of text, offering `default` when present.
    fn text(&self, label: &str, default: Option<&str>) -> Result<String>;

    /// Ask for a password without echoing it.
    fn password(&self, label: &str) -> Result<String>;
}

/// [`Prompter`] for the real terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    /// Detect whether prompting is possible: stdin must be a terminal and
    /// [`NON_INTERACTIVE_ENV`] must be unset.
    pub fn detect() -> Self {
        let forced_off = std::env::var_os(NON_INTERACTIVE_ENV).is_some();
        Self {
            interactive: !forced_off && std::io::stdin().is_terminal(),
        }
    }

    fn refuse(label: &str) -> anyhow::Error {
        CliError::usage(anyhow!(
            "{label} is required; pass it as a flag when not running interactively"
        ))
        .into()
    }
}

impl Prompter for TerminalPrompter {
    fn text(&self, label: &str, default: Option<&str>) -> Result<String> {
        if !self.interactive {
            return Err(Self::refuse(label));
        }
        let mut prompt = Text::new(label);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        Ok(prompt.prompt()?)
    }

    fn password(&self, label: &str) -> Result<String> {
        if !self.interactive {
            return Err(Self::refuse(label));
        }
        Ok(Password::new(label)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?)
    }
}
