//! Runtime orchestration: configuration, registry store and module lifecycle.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pulse_runtime::PulseRuntime;
//!
//! // Loads pulse.toml from the current directory, opens the registry and
//! // discovers every module linked into the binary.
//! let runtime = PulseRuntime::load()?;
//! runtime.run().await?;
//!
//! // Custom configuration path
//! let runtime = PulseRuntime::builder()
//!     .config_file("config/pulse.toml")
//!     .profile("production")
//!     .build()?;
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use pulse_core::{RegistryEntry, RegistryStore, SettingsStore, Store, open_store};
use pulse_framework::{
    ActivationResult, Discovery, LinkedDiscovery, ModuleEntry, ModuleManager, Namespace,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{ConfigLoader, PulseConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Pulse runtime.
///
/// Owns the loaded configuration, the registry store and the
/// [`ModuleManager`] that activates modules against it.
///
/// ```rust,ignore
/// let runtime = PulseRuntime::load()?;
///
/// runtime.disable_module("metrics").await?;
/// let result = runtime.start().await?;
/// println!("active: {:?}", result.activated);
/// ```
pub struct PulseRuntime {
    config: PulseConfig,
    manager: ModuleManager,
    running: Arc<RwLock<bool>>,
}

impl PulseRuntime {
    /// Loads configuration from the default locations and builds a runtime
    /// that discovers linked modules.
    pub fn load() -> RuntimeResult<Self> {
        RuntimeBuilder::new().build()
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration.
    ///
    /// Initializes logging, opens the configured registry store and uses
    /// [`LinkedDiscovery`] as the module source.
    pub fn from_config(config: &PulseConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        let store = Self::open_registry(config)?;
        Self::assemble(config, store, vec![Box::new(LinkedDiscovery)])
    }

    /// Creates a runtime over an already opened store.
    ///
    /// The `registry` section of `config` is ignored; `settings` are still
    /// written to `store`.
    pub fn with_store(config: &PulseConfig, store: Arc<dyn Store>) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        Self::assemble(config, store, vec![Box::new(LinkedDiscovery)])
    }

    fn open_registry(config: &PulseConfig) -> RuntimeResult<Arc<dyn Store>> {
        let path = config.registry.resolved_path();
        let store = open_store(config.registry.backend, path.as_deref())?;
        debug!(backend = ?config.registry.backend, path = ?path, "Registry store opened");
        Ok(store)
    }

    fn assemble(
        config: &PulseConfig,
        store: Arc<dyn Store>,
        sources: Vec<Box<dyn Discovery>>,
    ) -> RuntimeResult<Self> {
        Self::seed_settings(config, store.as_ref())?;
        let manager = sources
            .into_iter()
            .fold(ModuleManager::new(store), |manager, source| {
                manager.with_discovery(source)
            })
            .with_configs(config.modules.clone());

        info!(
            log_level = %config.logging.level,
            registry_backend = ?config.registry.backend,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            manager,
            running: Arc::new(RwLock::new(false)),
        })
    }

    /// Upserts the `[settings]` section into the store; keys not named there
    /// are left alone.
    fn seed_settings(config: &PulseConfig, store: &dyn Store) -> RuntimeResult<()> {
        for (key, value) in &config.settings {
            store.set_setting(key, value)?;
        }
        if !config.settings.is_empty() {
            debug!(count = config.settings.len(), "Settings seeded from configuration");
        }
        Ok(())
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        self.manager.store()
    }

    /// Namespace of the live run, if any.
    pub fn namespace(&self) -> Option<Arc<Namespace>> {
        self.manager.namespace()
    }

    /// Registers a module ahead of every discovery source.
    pub fn register(&self, entry: ModuleEntry) {
        self.manager.register(entry);
    }

    /// Returns whether the runtime is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Runs one activation pass and marks the runtime as running.
    ///
    /// Calling this again while running performs a fresh pass; the previous
    /// run is unloaded first.
    pub async fn start(&self) -> RuntimeResult<ActivationResult> {
        let mut running = self.running.write().await;
        if *running {
            info!("Runtime already running; reactivating modules");
        } else {
            info!("Starting Pulse runtime");
        }

        let result = self.manager.start_all().await?;
        *running = true;

        info!(
            active = result.activated.len(),
            skipped = result.skipped.len(),
            rejected = result.rejected.len(),
            "Runtime started"
        );
        Ok(result)
    }

    /// Unloads every active module.
    pub async fn stop(&self) -> RuntimeResult<()> {
        let mut running = self.running.write().await;
        if !*running && self.manager.namespace().is_none() {
            warn!("Runtime is not running");
            return Ok(());
        }
        *running = false;

        info!("Stopping Pulse runtime");
        self.manager.stop_all().await;
        info!("Runtime stopped");

        Ok(())
    }

    /// Activates modules and waits for Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start().await?;

        info!("Pulse runtime is now running. Press Ctrl+C to stop.");
        let waited = wait_for_shutdown().await;

        self.stop().await?;
        waited
    }

    /// Activates modules and runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        self.stop().await
    }

    // =========================================================================
    // Registry Administration
    // =========================================================================

    /// Marks a registered module as enabled.
    ///
    /// Takes effect on the next activation pass.
    pub async fn enable_module(&self, name: &str) -> RuntimeResult<()> {
        self.set_enabled(name, true)
    }

    /// Marks a registered module as disabled.
    ///
    /// Takes effect on the next activation pass; dependents that require it
    /// are rejected.
    pub async fn disable_module(&self, name: &str) -> RuntimeResult<()> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> RuntimeResult<()> {
        if !self.store().set_enabled(name, enabled)? {
            return Err(RuntimeError::UnknownModule(name.to_string()));
        }
        info!(module = %name, enabled, "Module status changed");
        Ok(())
    }

    /// Registry entry for `name`.
    pub async fn module_info(&self, name: &str) -> RuntimeResult<Option<RegistryEntry>> {
        Ok(self.store().get(name)?)
    }

    /// Every registry entry, ordered by name.
    pub async fn list_modules(&self) -> RuntimeResult<BTreeMap<String, RegistryEntry>> {
        Ok(self.store().list()?)
    }

    /// Deletes the registry entry for `name`; returns whether it existed.
    ///
    /// A module that is still discoverable is re-registered (enabled) on the
    /// next activation pass.
    pub async fn remove_module(&self, name: &str) -> RuntimeResult<bool> {
        let removed = self.store().remove(name)?;
        if removed {
            info!(module = %name, "Module removed from registry");
        }
        Ok(removed)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Reads a setting and decodes it as `T`.
    pub async fn setting<T: DeserializeOwned>(&self, key: &str) -> RuntimeResult<Option<T>> {
        let Some(value) = self.store().get_setting(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| RuntimeError::Setting {
                key: key.to_string(),
                source,
            })
    }

    pub async fn set_setting<T: Serialize>(&self, key: &str, value: &T) -> RuntimeResult<()> {
        let value = serde_json::to_value(value).map_err(|source| RuntimeError::Setting {
            key: key.to_string(),
            source,
        })?;
        self.store().set_setting(key, &value)?;
        Ok(())
    }

    /// Deletes a setting; returns whether it existed.
    pub async fn delete_setting(&self, key: &str) -> RuntimeResult<bool> {
        Ok(self.store().delete_setting(key)?)
    }

    pub async fn clear_settings(&self) -> RuntimeResult<()> {
        self.store().clear_settings()?;
        Ok(())
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`PulseRuntime`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = PulseRuntime::builder()
///     .config_file("config/pulse.toml")
///     .profile("production")
///     .with_discovery(StaticDiscovery::new().with(clock_entry()))
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    store: Option<Arc<dyn Store>>,
    sources: Vec<Box<dyn Discovery>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            store: None,
            sources: Vec::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: PulseConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `store` instead of opening the configured registry.
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Adds a discovery source.
    ///
    /// When none is added, modules linked with `register_module!` are used.
    pub fn with_discovery(mut self, source: impl Discovery + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> RuntimeResult<PulseRuntime> {
        let config = self.config_loader.load()?;
        logging::init_from_config(&config.logging);

        let store = match self.store {
            Some(store) => store,
            None => PulseRuntime::open_registry(&config)?,
        };
        let mut sources = self.sources;
        if sources.is_empty() {
            sources.push(Box::new(LinkedDiscovery));
        }
        PulseRuntime::assemble(&config, store, sources)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
