//! Persistent registry storage.
//!
//! Two tables make up the persisted state:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `modules` | module name | [`RegistryEntry`] (enabled flag + descriptor snapshot) |
//! | `settings` | setting key | arbitrary JSON value |
//!
//! Backends implement [`RegistryStore`] and [`SettingsStore`].  Two are
//! provided: [`RedbStore`] (durable, one transaction per write) and
//! [`MemoryStore`] (process-local, used by tests and throwaway runs).
//!
//! Stores are constructed explicitly and create their schema once when
//! opened; a missing table is never recreated as a side effect of a read or
//! write.

mod memory;
#[cfg(feature = "redb")]
mod redb_store;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::ModuleDescriptor;
use crate::error::{StoreError, StoreResult};

pub use memory::MemoryStore;
#[cfg(feature = "redb")]
pub use redb_store::RedbStore;

// ─── RegistryEntry ────────────────────────────────────────────────────────────

/// One persisted row of the module registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Whether the module may be activated.
    pub enabled: bool,
    /// Descriptor snapshot from the most recent discovery pass.
    #[serde(flatten)]
    pub descriptor: ModuleDescriptor,
}

impl RegistryEntry {
    /// Creates an entry for a module seen for the first time (enabled).
    pub fn discovered(descriptor: ModuleDescriptor) -> Self {
        Self {
            enabled: true,
            descriptor,
        }
    }

    /// Returns a copy carrying `descriptor` but keeping this entry's flag.
    pub fn refreshed(&self, descriptor: &ModuleDescriptor) -> Self {
        Self {
            enabled: self.enabled,
            descriptor: descriptor.clone(),
        }
    }
}

// ─── Store traits ─────────────────────────────────────────────────────────────

/// Durable table of module name → [`RegistryEntry`].
///
/// Pure storage: no dependency policy lives here.  Every write is atomic on
/// its own.  Status queries for names never written are fail-open and report
/// the module as enabled.
pub trait RegistryStore: Send + Sync {
    /// Returns the entry for `name`, if one was ever written.
    fn get(&self, name: &str) -> StoreResult<Option<RegistryEntry>>;

    /// Inserts or replaces the entry for `name`.
    fn set(&self, name: &str, entry: &RegistryEntry) -> StoreResult<()>;

    /// Deletes the entry for `name`; returns whether it existed.
    fn remove(&self, name: &str) -> StoreResult<bool>;

    /// Returns every entry, ordered by name.
    fn list(&self) -> StoreResult<BTreeMap<String, RegistryEntry>>;

    /// Flips the enabled flag of an existing entry.
    ///
    /// Returns `false` and writes nothing when `name` has no entry.
    fn set_enabled(&self, name: &str, enabled: bool) -> StoreResult<bool> {
        match self.get(name)? {
            Some(mut entry) => {
                entry.enabled = enabled;
                self.set(name, &entry)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enabled status of `name`; `true` when the name is unknown.
    fn is_enabled(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get(name)?.is_none_or(|entry| entry.enabled))
    }

    /// Upserts several entries.  Backends may commit them together.
    fn set_many(&self, entries: &[(String, RegistryEntry)]) -> StoreResult<()> {
        for (name, entry) in entries {
            self.set(name, entry)?;
        }
        Ok(())
    }
}

/// Durable key → JSON value table for global settings.
pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;

    fn set_setting(&self, key: &str, value: &serde_json::Value) -> StoreResult<()>;

    /// Deletes `key`; returns whether it existed.
    fn delete_setting(&self, key: &str) -> StoreResult<bool>;

    /// Deletes every setting.
    fn clear_settings(&self) -> StoreResult<()>;
}

/// A backend that provides both tables.
pub trait Store: RegistryStore + SettingsStore {}

impl<T: RegistryStore + SettingsStore> Store for T {}

// ─── Backend selection ────────────────────────────────────────────────────────

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// On-disk redb database.
    #[default]
    Redb,
    /// Process-local map; nothing survives a restart.
    Memory,
}

/// Opens a store of the requested backend.
///
/// `path` is the database file for [`StoreBackend::Redb`] and is ignored for
/// [`StoreBackend::Memory`].
pub fn open_store(backend: StoreBackend, path: Option<&Path>) -> StoreResult<Arc<dyn Store>> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "redb")]
        StoreBackend::Redb => {
            let path =
                path.ok_or_else(|| StoreError::backend("redb backend requires a database path"))?;
            Ok(Arc::new(RedbStore::open(path)?))
        }
        #[cfg(not(feature = "redb"))]
        StoreBackend::Redb => {
            let _ = path;
            Err(StoreError::backend(
                "redb backend not available (feature not enabled)",
            ))
        }
    }
}
