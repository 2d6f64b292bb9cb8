#![allow(dead_code)]

use procdock::config::{Manifest, RawCommandEntry, RawManifest};
use procdock::descriptor::{CommandDescriptor, CommandParameter};

/// Builder for `CommandDescriptor` to simplify test setup.
pub struct DescriptorBuilder {
    command: String,
    parameters: Vec<CommandParameter>,
    description: Option<String>,
    alias: Option<String>,
}

impl DescriptorBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            parameters: Vec::new(),
            description: None,
            alias: None,
        }
    }

    pub fn literal(mut self, value: &str) -> Self {
        self.parameters.push(CommandParameter::Literal(value.to_string()));
        self
    }

    pub fn placeholder(mut self, template: &str, answer: Option<&str>) -> Self {
        self.parameters.push(CommandParameter::Placeholder {
            parameter: template.to_string(),
            answer: answer.map(str::to_string),
        });
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn build(self) -> CommandDescriptor {
        CommandDescriptor::new(self.command, self.parameters, self.description, self.alias)
            .expect("Failed to build valid descriptor from builder")
    }

    /// Like `build`, but surfaces the validation error for negative tests.
    pub fn try_build(self) -> procdock::errors::Result<CommandDescriptor> {
        CommandDescriptor::new(self.command, self.parameters, self.description, self.alias)
    }
}

/// Builder for `Manifest` via its raw (deserialized) form.
pub struct ManifestBuilder {
    raw: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawManifest::default(),
        }
    }

    pub fn with_command(mut self, entry: RawCommandEntry) -> Self {
        self.raw.command.push(entry);
        self
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.raw).expect("Failed to build valid manifest from builder")
    }

    pub fn try_build(self) -> procdock::errors::Result<Manifest> {
        Manifest::try_from(self.raw)
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a raw manifest entry.
pub fn raw_entry(command: &str, alias: Option<&str>) -> RawCommandEntry {
    RawCommandEntry {
        command: command.to_string(),
        parameters: Vec::new(),
        description: None,
        alias: alias.map(str::to_string),
    }
}
