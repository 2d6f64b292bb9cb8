// src/descriptor.rs

//! Immutable declaration of a runnable command.

use serde::Deserialize;

use crate::errors::{ProcdockError, Result};

/// One entry of a descriptor's parameter list.
///
/// In the manifest TOML this is either a plain string or a table:
///
/// ```toml
/// parameters = ["build", { parameter = "--features=$", answer = "default" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandParameter {
    /// Passed to the process unchanged.
    Literal(String),
    /// A template with a placeholder awaiting a resolved value.
    Placeholder {
        parameter: String,
        #[serde(default)]
        answer: Option<String>,
    },
}

impl CommandParameter {
    /// Raw display form, used for `command_line()` rendering.
    ///
    /// Placeholders show their unresolved template.
    pub fn raw(&self) -> &str {
        match self {
            CommandParameter::Literal(s) => s,
            CommandParameter::Placeholder { parameter, .. } => parameter,
        }
    }
}

/// Validated declaration of a command a supervisor can run.
///
/// Constructed either directly via [`CommandDescriptor::new`] or from a
/// manifest entry (see `config::model`). Once handed to a supervisor it is
/// immutable, except for injecting placeholder answers before `run()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    command: String,
    parameters: Vec<CommandParameter>,
    description: Option<String>,
    alias: String,
}

impl CommandDescriptor {
    /// Validate and build a descriptor.
    ///
    /// - `command` must be non-empty (whitespace-only counts as empty).
    /// - A missing `alias` is replaced with a generated unique identifier.
    pub fn new(
        command: impl Into<String>,
        parameters: Vec<CommandParameter>,
        description: Option<String>,
        alias: Option<String>,
    ) -> Result<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ProcdockError::Validation(
                "descriptor is missing a non-empty `command`".to_string(),
            ));
        }

        let alias = match alias {
            Some(a) if !a.trim().is_empty() => a,
            _ => uuid::Uuid::new_v4().simple().to_string(),
        };

        Ok(Self {
            command,
            parameters,
            description,
            alias,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn parameters(&self) -> &[CommandParameter] {
        &self.parameters
    }

    pub(crate) fn set_parameters(&mut self, parameters: Vec<CommandParameter>) {
        self.parameters = parameters;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The command concatenated with its raw parameter list, for display.
    pub fn command_line(&self) -> String {
        let mut out = self.command.clone();
        for p in &self.parameters {
            out.push(' ');
            out.push_str(p.raw());
        }
        out
    }
}
