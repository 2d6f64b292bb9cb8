// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{ProcdockError, Result};

impl TryFrom<RawManifest> for Manifest {
    type Error = crate::errors::ProcdockError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        ensure_has_commands(&raw)?;

        let commands = raw
            .command
            .into_iter()
            .map(|entry| entry.into_descriptor())
            .collect::<Result<Vec<_>>>()?;

        ensure_unique_aliases(&commands)?;

        Ok(Manifest::new_unchecked(commands))
    }
}

fn ensure_has_commands(raw: &RawManifest) -> Result<()> {
    if raw.command.is_empty() {
        return Err(ProcdockError::Validation(
            "manifest must contain at least one [[command]] entry".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_aliases(commands: &[crate::descriptor::CommandDescriptor]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for descriptor in commands {
        if !seen.insert(descriptor.alias()) {
            return Err(ProcdockError::Validation(format!(
                "duplicate command alias '{}' in manifest",
                descriptor.alias()
            )));
        }
    }
    Ok(())
}
