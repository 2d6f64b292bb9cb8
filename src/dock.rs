// src/dock.rs

//! Thin aggregation layer over a manifest's supervisors.
//!
//! A [`Dock`] holds one [`CommandSupervisor`] per manifest command, paired
//! with the caller-side stream ends. Supervisors are fully independent; the
//! dock only provides construction and alias lookup.

use crate::config::Manifest;
use crate::errors::{ProcdockError, Result};
use crate::supervisor::{
    stream_pair, CallerStreams, CommandSupervisor, SupervisorOptions,
};

/// Per-channel buffer capacity for supervisors built by the dock.
const CHANNEL_CAPACITY: usize = 64;

/// One supervisor plus the caller's ends of its stream channels.
pub struct DockEntry {
    pub supervisor: CommandSupervisor,
    pub streams: CallerStreams,
}

/// All supervisors built from one manifest.
pub struct Dock {
    entries: Vec<DockEntry>,
}

impl Dock {
    /// Build one supervisor (with default spawn options) per manifest
    /// command, in manifest order.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::from_manifest_with_options(manifest, SupervisorOptions::default())
    }

    pub fn from_manifest_with_options(manifest: &Manifest, options: SupervisorOptions) -> Self {
        let entries = manifest
            .commands()
            .iter()
            .map(|descriptor| {
                let (handles, streams) = stream_pair(CHANNEL_CAPACITY);
                DockEntry {
                    supervisor: CommandSupervisor::with_options(
                        descriptor.clone(),
                        handles,
                        options.clone(),
                    ),
                    streams,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, alias: &str) -> Option<&DockEntry> {
        self.entries.iter().find(|e| e.supervisor.alias() == alias)
    }

    pub fn get_mut(&mut self, alias: &str) -> Option<&mut DockEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.supervisor.alias() == alias)
    }

    /// Remove and return the entry for `alias`, handing the caller exclusive
    /// ownership of that supervisor.
    pub fn take(&mut self, alias: &str) -> Result<DockEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.supervisor.alias() == alias)
            .ok_or_else(|| ProcdockError::AliasNotFound(alias.to_string()))?;
        Ok(self.entries.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DockEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
