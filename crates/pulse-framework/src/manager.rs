//! Module lifecycle management.
//!
//! [`ModuleManager`] is the activation sequencer.  On every
//! [`start_all`](ModuleManager::start_all) it:
//!
//! 1. Collects entries from the manually registered list and every
//!    [`Discovery`] source.
//! 2. Reads the disabled set from the registry store.
//! 3. Validates and orders the modules with
//!    [`GraphBuilder`](pulse_core::GraphBuilder) and
//!    [`topological_order`](pulse_core::topological_order).  Rejected modules
//!    are reported, never activated.
//! 4. Records every discovered module in the registry: new names are written
//!    enabled, known names get a fresh descriptor snapshot and keep their flag.
//! 5. Walks the order, re-reading each module's enabled flag, skipping
//!    disabled modules and activating the rest.  Each initializer sees a
//!    snapshot of the namespace built so far.  A module whose required
//!    dependency was disabled mid-run is rejected.
//!
//! Per-module validation problems never abort a run.  Cycles, store failures,
//! duplicate names and initializer errors do.  Modules activated before a
//! failing initializer stay alive and are unloaded by
//! [`stop_all`](ModuleManager::stop_all).
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = ModuleManager::new(store).with_discovery(LinkedDiscovery);
//! let result = manager.start_all().await?;
//! let greeter = result.namespace.get_as::<Greeter>("greeter");
//! // …later…
//! manager.stop_all().await;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use pulse_core::{
    DependencyGraph, GraphBuilder, ModuleDescriptor, OptionalDependency, PulseError, PulseResult,
    RegistryEntry, Rejection, Store, topological_order,
};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::discovery::Discovery;
use crate::module::{ModuleContext, ModuleEntry};
use crate::namespace::{ActiveModule, Namespace};

// =============================================================================
// ActivationResult
// =============================================================================

/// Where a module ended up after one activation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Initialized and present in the namespace.
    Active,
    /// Valid but disabled in the registry; not initialized.
    Skipped,
    /// Excluded by dependency validation; see [`ActivationResult::rejected`].
    Rejected,
    /// Not part of this run's discovery set.
    Unknown,
}

/// Outcome of a successful [`ModuleManager::start_all`].
#[derive(Debug, Clone)]
pub struct ActivationResult {
    /// Live instances, in activation order.
    pub namespace: Arc<Namespace>,
    /// Every valid module (activated or skipped), dependencies first.
    pub order: Vec<String>,
    /// Modules initialized in this run, in activation order.
    pub activated: Vec<String>,
    /// Valid modules left out because they are disabled.
    pub skipped: BTreeSet<String>,
    /// Modules excluded by validation, with the reason.
    pub rejected: BTreeMap<String, Rejection>,
    /// Optional dependency groups that had no available member.
    pub unresolved_optional: BTreeMap<String, Vec<OptionalDependency>>,
}

impl ActivationResult {
    pub fn state_of(&self, name: &str) -> ModuleState {
        if self.namespace.contains(name) {
            ModuleState::Active
        } else if self.skipped.contains(name) {
            ModuleState::Skipped
        } else if self.rejected.contains_key(name) {
            ModuleState::Rejected
        } else {
            ModuleState::Unknown
        }
    }

    /// Rejections converted into their error form, ordered by module name.
    pub fn rejection_errors(&self) -> Vec<PulseError> {
        self.rejected
            .iter()
            .map(|(name, reason)| reason.clone().into_error(name.clone()))
            .collect()
    }
}

// =============================================================================
// ModuleManager
// =============================================================================

/// State of the most recent run, kept for [`ModuleManager::stop_all`].
#[derive(Default)]
struct LiveRun {
    namespace: Arc<Namespace>,
}

/// Discovers, validates, orders and activates modules.
///
/// # Module configuration
///
/// `configs` maps module name → raw JSON section (`modules.<name>` in the
/// runtime configuration).  Each initializer receives its own section, or an
/// empty object.
pub struct ModuleManager {
    store: Arc<dyn Store>,
    sources: Vec<Box<dyn Discovery>>,
    registered: RwLock<Vec<ModuleEntry>>,
    configs: HashMap<String, Value>,
    live: RwLock<Option<LiveRun>>,
}

impl ModuleManager {
    /// Creates a manager backed by `store`, with no discovery sources.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            sources: Vec::new(),
            registered: RwLock::new(Vec::new()),
            configs: HashMap::new(),
            live: RwLock::new(None),
        }
    }

    /// Adds a discovery source.  Sources are queried in the order added.
    pub fn with_discovery(mut self, source: impl Discovery + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Sets the per-module configuration sections.
    pub fn with_configs(mut self, configs: HashMap<String, Value>) -> Self {
        self.configs = configs;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // ─── Registration ────────────────────────────────────────────────────────

    /// Adds an entry ahead of every discovery source.
    ///
    /// Takes effect on the next [`start_all`](Self::start_all).
    pub fn register(&self, entry: ModuleEntry) {
        debug!(module = %entry.descriptor().name, "Module registered");
        self.registered.write().push(entry);
    }

    /// All entries visible to the next run, in discovery order.
    pub fn discover(&self) -> Vec<ModuleEntry> {
        let mut entries = self.registered.read().clone();
        for source in &self.sources {
            entries.extend(source.discover());
        }
        entries
    }

    /// Namespace of the current run, if one is live.
    pub fn namespace(&self) -> Option<Arc<Namespace>> {
        self.live.read().as_ref().map(|run| Arc::clone(&run.namespace))
    }

    // ─── Registry sync ───────────────────────────────────────────────────────

    /// Writes every discovered descriptor into the registry in one batch.
    ///
    /// Unknown names are inserted enabled; known names keep their flag and get
    /// the new descriptor when it changed.
    pub fn sync_registry(&self, descriptors: &[&ModuleDescriptor]) -> PulseResult<()> {
        let existing = self.store.list()?;
        let updates: Vec<(String, RegistryEntry)> = descriptors
            .iter()
            .filter(|desc| !desc.name.trim().is_empty())
            .filter_map(|&desc| match existing.get(&desc.name) {
                None => Some(RegistryEntry::discovered(desc.clone())),
                Some(entry) if entry.descriptor != *desc => Some(entry.refreshed(desc)),
                Some(_) => None,
            })
            .map(|entry| (entry.descriptor.name.clone(), entry))
            .collect();

        if !updates.is_empty() {
            debug!(count = updates.len(), "Registry entries written");
            self.store.set_many(&updates)?;
        }
        Ok(())
    }

    /// Names among `descriptors` whose registry entry is disabled.
    fn disabled_set(&self, descriptors: &[&ModuleDescriptor]) -> PulseResult<HashSet<String>> {
        let entries = self.store.list()?;
        Ok(descriptors
            .iter()
            .filter(|desc| entries.get(&desc.name).is_some_and(|e| !e.enabled))
            .map(|desc| desc.name.clone())
            .collect())
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Runs one activation pass.
    ///
    /// A run that is still live is stopped first.
    ///
    /// # Errors
    ///
    /// [`PulseError::DuplicateModule`], [`PulseError::CycleDetected`],
    /// [`PulseError::RegistryUnavailable`] or
    /// [`PulseError::ActivationFailure`].
    pub async fn start_all(&self) -> PulseResult<ActivationResult> {
        if self.live.read().is_some() {
            info!("Stopping previous module run before reactivation");
            self.stop_all().await;
        }

        let entries = self.discover();
        self.activate(entries)
            .instrument(info_span!("activate"))
            .await
    }

    async fn activate(&self, entries: Vec<ModuleEntry>) -> PulseResult<ActivationResult> {
        let descriptors: Vec<&ModuleDescriptor> = entries.iter().map(|e| e.descriptor()).collect();
        info!(discovered = descriptors.len(), "Module activation started");

        let disabled = self.disabled_set(&descriptors)?;
        let graph = GraphBuilder::new(descriptors.iter().copied())
            .disabled(disabled.iter().cloned())
            .build()?;
        self.sync_registry(&descriptors)?;
        let order = topological_order(&graph)?;

        let by_name: HashMap<&str, &ModuleEntry> = entries
            .iter()
            .map(|e| (e.descriptor().name.as_str(), e))
            .collect();

        let mut namespace = Namespace::new();
        let mut activated = Vec::new();
        let mut skipped = BTreeSet::new();
        let mut late_rejected = BTreeMap::new();

        for name in &order {
            let Some(&entry) = by_name.get(name.as_str()) else {
                continue;
            };
            let desc = entry.descriptor();

            let enabled = match self.current_status(desc) {
                Ok(enabled) => enabled,
                Err(err) => {
                    self.keep_live(namespace);
                    return Err(err);
                }
            };
            if !enabled {
                debug!(module = %name, "Module is disabled; skipped");
                skipped.insert(name.clone());
                continue;
            }

            let blocked: Vec<String> = desc
                .required_dependencies
                .iter()
                .filter(|dep| skipped.contains(*dep) || late_rejected.contains_key(*dep))
                .cloned()
                .collect();
            if !blocked.is_empty() {
                warn!(
                    module = %name,
                    disabled = ?blocked,
                    "Dependency disabled during run; module rejected"
                );
                late_rejected.insert(name.clone(), Rejection::DisabledDependency(blocked));
                continue;
            }

            let config = self
                .configs
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::default()));
            let ctx = ModuleContext::new(
                entry.shared_descriptor(),
                Arc::new(namespace.clone()),
                Arc::new(config),
                Arc::clone(&self.store),
            );

            let instance = match entry.instantiate(ctx).await {
                Ok(instance) => instance,
                Err(source) => {
                    error!(module = %name, error = %source, "Module failed to activate");
                    self.keep_live(namespace);
                    return Err(PulseError::ActivationFailure {
                        module: name.clone(),
                        source,
                    });
                }
            };

            namespace.insert(ActiveModule::new(entry.shared_descriptor(), instance));
            activated.push(name.clone());
            info!(
                module = %name,
                version = %desc.version,
                "Module activated"
            );
        }

        let namespace = Arc::new(namespace);
        *self.live.write() = Some(LiveRun {
            namespace: Arc::clone(&namespace),
        });

        let mut result = Self::summarize(namespace, order, activated, skipped, &graph);
        result.rejected.extend(late_rejected);
        info!(
            activated = result.activated.len(),
            skipped = result.skipped.len(),
            rejected = result.rejected.len(),
            "Module activation finished"
        );
        Ok(result)
    }

    /// Reads the module's enabled flag as it is now and, when enabled,
    /// upserts its descriptor snapshot without touching the flag.
    ///
    /// An earlier initializer may have changed the flag through its store
    /// handle, so the snapshot taken before sorting is not consulted here.
    fn current_status(&self, desc: &ModuleDescriptor) -> PulseResult<bool> {
        let current = self.store.get(&desc.name)?;
        match current {
            Some(existing) if !existing.enabled => return Ok(false),
            Some(existing) if existing.descriptor != *desc => {
                self.store.set(&desc.name, &existing.refreshed(desc))?;
            }
            Some(_) => {}
            None => self.store.set(&desc.name, &RegistryEntry::discovered(desc.clone()))?,
        }
        Ok(true)
    }

    fn keep_live(&self, namespace: Namespace) {
        *self.live.write() = Some(LiveRun {
            namespace: Arc::new(namespace),
        });
    }

    fn summarize(
        namespace: Arc<Namespace>,
        order: Vec<String>,
        activated: Vec<String>,
        skipped: BTreeSet<String>,
        graph: &DependencyGraph,
    ) -> ActivationResult {
        ActivationResult {
            namespace,
            order,
            activated,
            skipped,
            rejected: graph.rejections(),
            unresolved_optional: graph.unresolved_optional().clone(),
        }
    }

    /// Unloads the live run, dependents first.
    ///
    /// Does nothing when no run is live.
    pub async fn stop_all(&self) {
        let Some(run) = self.live.write().take() else {
            return;
        };

        for module in run.namespace.iter().rev() {
            module.instance().on_unload().await;
            info!(module = %module.name(), "Module unloaded");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pulse_core::{
        BoxError, MemoryStore, RegistryEntry, RegistryStore, SettingsStore, StoreError,
        StoreResult,
    };
    use serde_json::json;

    use super::*;
    use crate::discovery::StaticDiscovery;
    use crate::module::ModuleInstance;

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Records init and unload calls in a shared journal.
    struct Tracked {
        name: String,
        journal: Journal,
    }

    #[async_trait::async_trait]
    impl ModuleInstance for Tracked {
        async fn on_unload(&self) {
            self.journal.lock().push(format!("unload:{}", self.name));
        }
    }

    fn tracked(desc: ModuleDescriptor, journal: &Journal) -> ModuleEntry {
        let journal = Arc::clone(journal);
        ModuleEntry::new(desc, move |ctx: ModuleContext| {
            let journal = Arc::clone(&journal);
            async move {
                let name = ctx.name().to_string();
                journal.lock().push(format!("init:{name}"));
                Ok::<_, BoxError>(Tracked { name, journal })
            }
        })
    }

    fn manager(store: Arc<dyn Store>, entries: Vec<ModuleEntry>) -> ModuleManager {
        ModuleManager::new(store).with_discovery(entries.into_iter().collect::<StaticDiscovery>())
    }

    fn memory() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    fn scenario(journal: &Journal) -> Vec<ModuleEntry> {
        vec![
            tracked(
                ModuleDescriptor::new("C").requires(["B"]).optional_any_of(["A", "Z"]),
                journal,
            ),
            tracked(ModuleDescriptor::new("B").requires(["A"]), journal),
            tracked(ModuleDescriptor::new("A"), journal),
        ]
    }

    #[tokio::test]
    async fn activates_in_dependency_order_and_registers() {
        let journal = Journal::default();
        let store = memory();
        let mgr = manager(Arc::clone(&store), scenario(&journal));

        let result = mgr.start_all().await.unwrap();

        assert_eq!(result.order, ["A", "B", "C"]);
        assert_eq!(result.activated, ["A", "B", "C"]);
        assert_eq!(result.namespace.names().collect::<Vec<_>>(), ["A", "B", "C"]);
        assert_eq!(*journal.lock(), ["init:A", "init:B", "init:C"]);

        let registry = store.list().unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.values().all(|e| e.enabled));
    }

    #[tokio::test]
    async fn cycle_aborts_before_any_activation() {
        let journal = Journal::default();
        let mgr = manager(
            memory(),
            vec![
                tracked(ModuleDescriptor::new("X").requires(["Y"]), &journal),
                tracked(ModuleDescriptor::new("Y").requires(["X"]), &journal),
            ],
        );

        let err = mgr.start_all().await.unwrap_err();
        assert!(matches!(err, PulseError::CycleDetected { .. }));
        assert!(journal.lock().is_empty());
        assert!(mgr.namespace().is_none());
    }

    #[tokio::test]
    async fn missing_required_dependency_is_isolated() {
        let journal = Journal::default();
        let mgr = manager(
            memory(),
            vec![
                tracked(ModuleDescriptor::new("needy").requires(["ghost"]), &journal),
                tracked(ModuleDescriptor::new("fine"), &journal),
            ],
        );

        let result = mgr.start_all().await.unwrap();

        assert_eq!(result.activated, ["fine"]);
        assert_eq!(result.state_of("needy"), ModuleState::Rejected);
        assert_eq!(
            result.rejected["needy"],
            Rejection::MissingRequiredDependency(vec!["ghost".into()])
        );
        assert!(matches!(
            result.rejection_errors().as_slice(),
            [PulseError::MissingRequiredDependency { module, .. }] if module == "needy"
        ));
    }

    #[tokio::test]
    async fn disabled_dependency_cascades() {
        let journal = Journal::default();
        let store = memory();
        let entries = vec![
            tracked(ModuleDescriptor::new("M1"), &journal),
            tracked(ModuleDescriptor::new("M2").requires(["M1"]), &journal),
            tracked(ModuleDescriptor::new("M3").requires(["M2"]), &journal),
        ];
        store
            .set(
                "M1",
                &RegistryEntry {
                    enabled: false,
                    descriptor: ModuleDescriptor::new("M1"),
                },
            )
            .unwrap();

        let result = manager(Arc::clone(&store), entries).start_all().await.unwrap();

        assert!(result.namespace.is_empty());
        assert_eq!(result.state_of("M1"), ModuleState::Skipped);
        assert_eq!(result.state_of("M2"), ModuleState::Rejected);
        assert_eq!(
            result.rejected["M3"],
            Rejection::DisabledDependency(vec!["M2".into()])
        );
        assert!(!store.is_enabled("M1").unwrap());
    }

    #[tokio::test]
    async fn initializer_disabling_later_module_is_honoured() {
        let journal = Journal::default();
        let store = memory();
        let admin = {
            let journal = Arc::clone(&journal);
            ModuleEntry::new(ModuleDescriptor::new("admin"), move |ctx: ModuleContext| {
                let journal = Arc::clone(&journal);
                async move {
                    ctx.store().set_enabled("later", false)?;
                    ctx.store().set_enabled("admin", false)?;
                    journal.lock().push("init:admin".to_string());
                    Ok::<_, BoxError>(Tracked {
                        name: "admin".into(),
                        journal,
                    })
                }
            })
        };
        let entries = vec![
            admin,
            tracked(ModuleDescriptor::new("later"), &journal),
            tracked(ModuleDescriptor::new("tail").requires(["later"]), &journal),
        ];

        let result = manager(Arc::clone(&store), entries).start_all().await.unwrap();

        assert_eq!(result.order, ["admin", "later", "tail"]);
        assert_eq!(result.activated, ["admin"]);
        assert_eq!(result.state_of("later"), ModuleState::Skipped);
        assert_eq!(
            result.rejected["tail"],
            Rejection::DisabledDependency(vec!["later".into()])
        );
        assert_eq!(*journal.lock(), ["init:admin"]);
        assert!(!store.is_enabled("admin").unwrap());
        assert!(!store.is_enabled("later").unwrap());
    }

    #[tokio::test]
    async fn rerun_with_same_inputs_is_idempotent() {
        let journal = Journal::default();
        let store = memory();
        let mgr = manager(Arc::clone(&store), scenario(&journal));

        let first = mgr.start_all().await.unwrap();
        let registry_after_first = store.list().unwrap();
        let second = mgr.start_all().await.unwrap();

        assert_eq!(first.order, second.order);
        assert_eq!(
            first.namespace.names().collect::<Vec<_>>(),
            second.namespace.names().collect::<Vec<_>>()
        );
        assert_eq!(store.list().unwrap(), registry_after_first);
    }

    #[tokio::test]
    async fn disable_then_rerun() {
        let journal = Journal::default();
        let store = memory();
        let mgr = manager(Arc::clone(&store), scenario(&journal));

        mgr.start_all().await.unwrap();
        assert!(store.set_enabled("A", false).unwrap());
        let result = mgr.start_all().await.unwrap();

        assert!(result.namespace.is_empty());
        assert_eq!(result.skipped, BTreeSet::from(["A".to_string()]));
        assert_eq!(result.state_of("B"), ModuleState::Rejected);
        assert_eq!(result.state_of("C"), ModuleState::Rejected);
        // The flag survives the registry refresh.
        assert!(!store.is_enabled("A").unwrap());
    }

    #[tokio::test]
    async fn alternative_group_uses_available_member() {
        let journal = Journal::default();
        let mgr = manager(
            memory(),
            vec![
                tracked(ModuleDescriptor::new("user").optional_any_of(["A", "B"]), &journal),
                tracked(ModuleDescriptor::new("B"), &journal),
            ],
        );

        let result = mgr.start_all().await.unwrap();

        assert_eq!(result.activated, ["B", "user"]);
        assert!(result.unresolved_optional.is_empty());
    }

    #[tokio::test]
    async fn unresolved_optional_group_is_reported() {
        let journal = Journal::default();
        let mgr = manager(
            memory(),
            vec![tracked(ModuleDescriptor::new("solo").optional(["nobody"]), &journal)],
        );

        let result = mgr.start_all().await.unwrap();

        assert_eq!(result.state_of("solo"), ModuleState::Active);
        assert_eq!(
            result.unresolved_optional["solo"],
            [OptionalDependency::Single("nobody".into())]
        );
    }

    #[tokio::test]
    async fn duplicate_names_abort_without_registry_writes() {
        let journal = Journal::default();
        let store = memory();
        let mgr = manager(
            Arc::clone(&store),
            vec![
                tracked(ModuleDescriptor::new("twin"), &journal),
                tracked(ModuleDescriptor::new("twin"), &journal),
            ],
        );

        let err = mgr.start_all().await.unwrap_err();
        assert!(matches!(err, PulseError::DuplicateModule { .. }));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn activation_failure_is_fatal_without_rollback() {
        let journal = Journal::default();
        let failing = ModuleEntry::new(ModuleDescriptor::new("broken").requires(["A"]), |_ctx| async {
            Err::<Tracked, BoxError>("boom".into())
        });
        let mgr = manager(
            memory(),
            vec![
                tracked(ModuleDescriptor::new("A"), &journal),
                failing,
                tracked(ModuleDescriptor::new("after").requires(["broken"]), &journal),
            ],
        );

        let err = mgr.start_all().await.unwrap_err();
        match &err {
            PulseError::ActivationFailure { module, source } => {
                assert_eq!(module, "broken");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*journal.lock(), ["init:A"]);

        // A stays live and is unloaded by stop_all.
        assert!(mgr.namespace().unwrap().contains("A"));
        mgr.stop_all().await;
        assert_eq!(*journal.lock(), ["init:A", "unload:A"]);
    }

    #[tokio::test]
    async fn dependent_sees_dependency_in_namespace() {
        struct Base(u32);
        impl ModuleInstance for Base {}

        struct Top(u32);
        impl ModuleInstance for Top {}

        let base = ModuleEntry::new(ModuleDescriptor::new("base"), |_ctx| async {
            Ok::<_, BoxError>(Base(41))
        });
        let top = ModuleEntry::new(
            ModuleDescriptor::new("top").requires(["base"]),
            |ctx: ModuleContext| async move {
                let base = ctx
                    .module_as::<Base>("base")
                    .ok_or_else(|| BoxError::from("base not visible"))?;
                Ok::<_, BoxError>(Top(base.0 + 1))
            },
        );
        let mgr = manager(memory(), vec![top, base]);

        let result = mgr.start_all().await.unwrap();
        assert_eq!(result.namespace.get_as::<Top>("top").unwrap().0, 42);
    }

    #[tokio::test]
    async fn initializer_receives_its_config_section() {
        #[derive(serde::Deserialize)]
        struct Cfg {
            greeting: String,
        }
        struct Greeter(String);
        impl ModuleInstance for Greeter {}

        let entry = ModuleEntry::new(ModuleDescriptor::new("greeter"), |ctx: ModuleContext| async move {
            let cfg: Cfg = ctx.get_config()?;
            Ok::<_, BoxError>(Greeter(cfg.greeting))
        });
        let mgr = manager(memory(), vec![entry])
            .with_configs(HashMap::from([("greeter".to_string(), json!({ "greeting": "hi" }))]));

        let result = mgr.start_all().await.unwrap();
        assert_eq!(result.namespace.get_as::<Greeter>("greeter").unwrap().0, "hi");
    }

    #[tokio::test]
    async fn stop_all_unloads_in_reverse_order() {
        let journal = Journal::default();
        let mgr = manager(memory(), scenario(&journal));

        mgr.start_all().await.unwrap();
        mgr.stop_all().await;
        mgr.stop_all().await;

        assert_eq!(
            *journal.lock(),
            ["init:A", "init:B", "init:C", "unload:C", "unload:B", "unload:A"]
        );
        assert!(mgr.namespace().is_none());
    }

    #[tokio::test]
    async fn registered_entries_come_before_discovered_ones() {
        let journal = Journal::default();
        let mgr = manager(memory(), vec![tracked(ModuleDescriptor::new("found"), &journal)]);
        mgr.register(tracked(ModuleDescriptor::new("manual"), &journal));

        let result = mgr.start_all().await.unwrap();
        assert_eq!(result.activated, ["manual", "found"]);
    }

    /// Store whose registry reads always fail.
    #[derive(Default)]
    struct Unavailable {
        settings: MemoryStore,
    }

    impl RegistryStore for Unavailable {
        fn get(&self, _name: &str) -> StoreResult<Option<RegistryEntry>> {
            Err(StoreError::backend("offline"))
        }
        fn set(&self, _name: &str, _entry: &RegistryEntry) -> StoreResult<()> {
            Err(StoreError::backend("offline"))
        }
        fn remove(&self, _name: &str) -> StoreResult<bool> {
            Err(StoreError::backend("offline"))
        }
        fn list(&self) -> StoreResult<BTreeMap<String, RegistryEntry>> {
            Err(StoreError::backend("offline"))
        }
    }

    impl SettingsStore for Unavailable {
        fn get_setting(&self, key: &str) -> StoreResult<Option<Value>> {
            self.settings.get_setting(key)
        }
        fn set_setting(&self, key: &str, value: &Value) -> StoreResult<()> {
            self.settings.set_setting(key, value)
        }
        fn delete_setting(&self, key: &str) -> StoreResult<bool> {
            self.settings.delete_setting(key)
        }
        fn clear_settings(&self) -> StoreResult<()> {
            self.settings.clear_settings()
        }
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let journal = Journal::default();
        let mgr = manager(Arc::new(Unavailable::default()), scenario(&journal));

        let err = mgr.start_all().await.unwrap_err();
        assert!(matches!(err, PulseError::RegistryUnavailable(_)));
        assert!(journal.lock().is_empty());
    }
}
