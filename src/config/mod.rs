// src/config/mod.rs

//! Manifest loading and validation.
//!
//! Manifests are TOML files declaring the commands available to procdock:
//!
//! ```toml
//! [[command]]
//! command = "cargo"
//! alias = "build"
//! description = "Build the project"
//! parameters = ["build", { parameter = "--features=$", answer = "default" }]
//! ```
//!
//! - [`model`] holds the raw (deserialized) and validated manifest types.
//! - [`loader`] reads manifests from disk.
//! - [`validate`] turns a `RawManifest` into a validated [`Manifest`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path};
pub use model::{Manifest, RawCommandEntry, RawManifest};
