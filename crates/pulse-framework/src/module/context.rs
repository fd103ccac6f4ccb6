use std::sync::Arc;

use pulse_core::{ModuleDescriptor, Store};
use serde_json::Value;

use super::ModuleInstance;
use crate::namespace::{ActiveModule, Namespace};

/// Everything a module initializer can see.
///
/// Carries a snapshot of the namespace taken just before the module is
/// activated: every dependency that was activated ahead of it (required, or
/// optional and available) can be looked up by name.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(serde::Deserialize, Default)]
/// #[serde(default)]
/// struct GreeterConfig { greeting: String }
///
/// async fn init(ctx: ModuleContext) -> Result<Greeter, BoxError> {
///     let cfg: GreeterConfig = ctx.get_config()?;
///     let storage = ctx.module_as::<Storage>("storage");
///     Ok(Greeter::new(cfg.greeting, storage))
/// }
/// ```
#[derive(Clone)]
pub struct ModuleContext {
    descriptor: Arc<ModuleDescriptor>,
    namespace: Arc<Namespace>,
    config: Arc<Value>,
    store: Arc<dyn Store>,
}

impl ModuleContext {
    pub(crate) fn new(
        descriptor: Arc<ModuleDescriptor>,
        namespace: Arc<Namespace>,
        config: Arc<Value>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            descriptor,
            namespace,
            config,
            store,
        }
    }

    /// Descriptor of the module being activated.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Raw configuration section for this module (`modules.<name>`), or an
    /// empty object.
    pub fn config_value(&self) -> &Value {
        &self.config
    }

    /// Deserializes the module's configuration section into `T`.
    ///
    /// Use `#[serde(default)]` on `T` to tolerate a missing section.
    pub fn get_config<T>(&self) -> serde_json::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        T::deserialize(self.config.as_ref())
    }

    /// Already-activated module by name.
    pub fn module(&self, name: &str) -> Option<&ActiveModule> {
        self.namespace.get(name)
    }

    /// Already-activated module by name, downcast to `T`.
    pub fn module_as<T: ModuleInstance>(&self, name: &str) -> Option<Arc<T>> {
        self.namespace.get_as(name)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The registry and settings store of this run.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
