//! The namespace: name → live module instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pulse_core::ModuleDescriptor;

use crate::module::{ModuleInstance, downcast_instance};

/// One activated module: its instance plus the descriptor it was built from.
#[derive(Clone)]
pub struct ActiveModule {
    descriptor: Arc<ModuleDescriptor>,
    instance: Arc<dyn ModuleInstance>,
}

impl ActiveModule {
    pub(crate) fn new(descriptor: Arc<ModuleDescriptor>, instance: Arc<dyn ModuleInstance>) -> Self {
        Self {
            descriptor,
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn instance(&self) -> &Arc<dyn ModuleInstance> {
        &self.instance
    }

    /// Downcasts the instance to `T`.
    pub fn downcast<T: ModuleInstance>(&self) -> Option<Arc<T>> {
        downcast_instance(&self.instance)
    }
}

impl fmt::Debug for ActiveModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveModule")
            .field("name", &self.descriptor.name)
            .field("version", &self.descriptor.version)
            .finish_non_exhaustive()
    }
}

/// Live instances of every activated module, keyed by module name.
///
/// Iteration follows activation order, so every module appears after all of
/// its activated dependencies.  Each activation run builds a fresh namespace.
#[derive(Clone, Default, Debug)]
pub struct Namespace {
    modules: Vec<ActiveModule>,
    index: HashMap<String, usize>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module; a module of the same name is replaced in place.
    pub(crate) fn insert(&mut self, module: ActiveModule) {
        match self.index.get(module.name()) {
            Some(&slot) => self.modules[slot] = module,
            None => {
                self.index.insert(module.name().to_string(), self.modules.len());
                self.modules.push(module);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActiveModule> {
        self.index.get(name).map(|&slot| &self.modules[slot])
    }

    /// Looks up `name` and downcasts its instance to `T`.
    pub fn get_as<T: ModuleInstance>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(ActiveModule::downcast)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in activation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(ActiveModule::name)
    }

    /// Modules in activation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActiveModule> {
        self.modules.iter()
    }
}
