//! redb-backed store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use super::{RegistryEntry, RegistryStore, SettingsStore};
use crate::error::{StoreError, StoreResult};

type StrTable = TableDefinition<'static, &'static str, &'static str>;

const MODULES_TABLE: StrTable = TableDefinition::new("modules");
const SETTINGS_TABLE: StrTable = TableDefinition::new("settings");

macro_rules! impl_from_redb {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for StoreError {
                fn from(e: $err) -> Self {
                    StoreError::Database(e.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Durable store kept in a single redb database file.
///
/// Each mutating call runs in its own write transaction, so every entry write
/// is atomic and durable once the call returns.  Records are stored as JSON
/// documents; list-valued descriptor fields are serialised as JSON arrays.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Opens (or creates) the database at `path` and ensures both tables exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path)?;

        let txn = db.begin_write()?;
        {
            txn.open_table(MODULES_TABLE)?;
            txn.open_table(SETTINGS_TABLE)?;
        }
        txn.commit()?;

        debug!(path = %path.display(), "Registry database opened");
        Ok(Self { db, path })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self, def: StrTable, key: &str) -> StoreResult<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(def)?;
        let value = table.get(key)?.map(|v| v.value().to_string());
        Ok(value)
    }

    fn write_raw(&self, def: StrTable, key: &str, value: &str) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(def)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove_raw(&self, def: StrTable, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(def)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }
}

impl RegistryStore for RedbStore {
    fn get(&self, name: &str) -> StoreResult<Option<RegistryEntry>> {
        self.read_raw(MODULES_TABLE, name)?
            .map(|raw| serde_json::from_str(&raw).map_err(StoreError::from))
            .transpose()
    }

    fn set(&self, name: &str, entry: &RegistryEntry) -> StoreResult<()> {
        let encoded = serde_json::to_string(entry)?;
        self.write_raw(MODULES_TABLE, name, &encoded)
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        self.remove_raw(MODULES_TABLE, name)
    }

    fn list(&self) -> StoreResult<BTreeMap<String, RegistryEntry>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MODULES_TABLE)?;

        let mut entries = BTreeMap::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let entry: RegistryEntry = serde_json::from_str(value.value())?;
            entries.insert(key.value().to_string(), entry);
        }
        Ok(entries)
    }

    /// Read-modify-write inside one transaction.
    fn set_enabled(&self, name: &str, enabled: bool) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let found = {
            let mut table = txn.open_table(MODULES_TABLE)?;
            let current = table.get(name)?.map(|v| v.value().to_string());
            match current {
                Some(raw) => {
                    let mut entry: RegistryEntry = serde_json::from_str(&raw)?;
                    entry.enabled = enabled;
                    let encoded = serde_json::to_string(&entry)?;
                    table.insert(name, encoded.as_str())?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(found)
    }

    fn set_many(&self, entries: &[(String, RegistryEntry)]) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MODULES_TABLE)?;
            for (name, entry) in entries {
                let encoded = serde_json::to_string(entry)?;
                table.insert(name.as_str(), encoded.as_str())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

impl SettingsStore for RedbStore {
    fn get_setting(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        self.read_raw(SETTINGS_TABLE, key)?
            .map(|raw| serde_json::from_str(&raw).map_err(StoreError::from))
            .transpose()
    }

    fn set_setting(&self, key: &str, value: &serde_json::Value) -> StoreResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.write_raw(SETTINGS_TABLE, key, &encoded)
    }

    fn delete_setting(&self, key: &str) -> StoreResult<bool> {
        self.remove_raw(SETTINGS_TABLE, key)
    }

    fn clear_settings(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        txn.delete_table(SETTINGS_TABLE)?;
        txn.open_table(SETTINGS_TABLE)?;
        txn.commit()?;
        Ok(())
    }
}
