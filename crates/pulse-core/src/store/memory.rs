//! In-memory store backend.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{RegistryEntry, RegistryStore, SettingsStore};
use crate::error::StoreResult;

/// Process-local store.  Cheap to create; contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    modules: RwLock<BTreeMap<String, RegistryEntry>>,
    settings: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn get(&self, name: &str) -> StoreResult<Option<RegistryEntry>> {
        Ok(self.modules.read().get(name).cloned())
    }

    fn set(&self, name: &str, entry: &RegistryEntry) -> StoreResult<()> {
        self.modules.write().insert(name.to_string(), entry.clone());
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        Ok(self.modules.write().remove(name).is_some())
    }

    fn list(&self) -> StoreResult<BTreeMap<String, RegistryEntry>> {
        Ok(self.modules.read().clone())
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> StoreResult<bool> {
        Ok(match self.modules.write().get_mut(name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        })
    }
}

impl SettingsStore for MemoryStore {
    fn get_setting(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.settings.read().get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &serde_json::Value) -> StoreResult<()> {
        self.settings.write().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> StoreResult<bool> {
        Ok(self.settings.write().remove(key).is_some())
    }

    fn clear_settings(&self) -> StoreResult<()> {
        self.settings.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleDescriptor;
    use serde_json::json;

    #[test]
    fn unknown_names_are_enabled() {
        let store = MemoryStore::new();
        assert!(store.is_enabled("ghost").unwrap());
        assert!(!store.set_enabled("ghost", false).unwrap());
        assert!(store.get("ghost").unwrap().is_none());
    }

    #[test]
    fn disable_keeps_metadata() {
        let store = MemoryStore::new();
        let entry = RegistryEntry::discovered(ModuleDescriptor::new("a").author("me"));
        store.set("a", &entry).unwrap();

        assert!(store.set_enabled("a", false).unwrap());
        let stored = store.get("a").unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.descriptor.author, "me");
        assert!(!store.is_enabled("a").unwrap());
    }

    #[test]
    fn remove_reports_presence() {
        let store = MemoryStore::new();
        store
            .set("a", &RegistryEntry::discovered(ModuleDescriptor::new("a")))
            .unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
    }

    #[test]
    fn settings_roundtrip() {
        let store = MemoryStore::new();
        store.set_setting("origins", &json!(["a", "b"])).unwrap();
        store.set_setting("level", &json!("debug")).unwrap();

        assert_eq!(store.get_setting("origins").unwrap(), Some(json!(["a", "b"])));
        assert!(store.delete_setting("level").unwrap());
        assert!(!store.delete_setting("level").unwrap());

        store.clear_settings().unwrap();
        assert!(store.get_setting("origins").unwrap().is_none());
    }
}
