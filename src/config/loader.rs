// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a manifest file from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (descriptor fields, alias uniqueness). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let manifest: RawManifest = toml::from_str(&contents)?;

    Ok(manifest)
}

/// Load a manifest file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Checks that there is at least one command.
/// - Validates every entry into a `CommandDescriptor` (non-empty `command`,
///   generated alias where absent).
/// - Rejects duplicate aliases.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    let manifest = Manifest::try_from(raw)?;
    Ok(manifest)
}

/// Helper to resolve a default manifest path.
///
/// Currently this just returns `Procdock.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `PROCDOCK_MANIFEST`).
/// - Look for multiple default locations.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Procdock.toml")
}
