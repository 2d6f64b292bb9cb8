// src/config/model.rs

use serde::Deserialize;

use crate::descriptor::{CommandDescriptor, CommandParameter};
use crate::errors::Result;

/// Top-level manifest as read from a TOML file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    /// All `[[command]]` entries, in file order.
    #[serde(default)]
    pub command: Vec<RawCommandEntry>,
}

/// One `[[command]]` entry.
///
/// Only `command` is required; `alias` defaults to a generated unique
/// identifier during validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommandEntry {
    /// The executable or shell command line.
    pub command: String,

    /// Ordered parameter list; literals and placeholder tables.
    #[serde(default)]
    pub parameters: Vec<CommandParameter>,

    /// Human description shown in listings.
    #[serde(default)]
    pub description: Option<String>,

    /// Short name used to select this command.
    #[serde(default)]
    pub alias: Option<String>,
}

impl RawCommandEntry {
    pub(crate) fn into_descriptor(self) -> Result<CommandDescriptor> {
        CommandDescriptor::new(self.command, self.parameters, self.description, self.alias)
    }
}

/// Validated manifest: every entry became a [`CommandDescriptor`], aliases
/// are unique, and there is at least one command.
#[derive(Debug, Clone)]
pub struct Manifest {
    commands: Vec<CommandDescriptor>,
}

impl Manifest {
    /// Construct without re-validating. Only `validate` should call this.
    pub(crate) fn new_unchecked(commands: Vec<CommandDescriptor>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn find(&self, alias: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|d| d.alias() == alias)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
