//! Module discovery sources.
//!
//! Discovery only enumerates what exists.  It never checks dependencies or
//! consults the registry; the [`ModuleManager`](crate::manager::ModuleManager)
//! does both on every run.

use linkme::distributed_slice;

use crate::module::ModuleEntry;

/// Link-time list of module constructors.
///
/// Every crate linked into the final binary can contribute entries with
/// [`register_module!`](crate::register_module).
#[distributed_slice]
pub static MODULES: [fn() -> ModuleEntry];

/// A source of module entries, queried once per activation run.
pub trait Discovery: Send + Sync {
    /// Returns every module this source knows about, in a stable order.
    fn discover(&self) -> Vec<ModuleEntry>;
}

impl<D: Discovery + ?Sized> Discovery for Box<D> {
    fn discover(&self) -> Vec<ModuleEntry> {
        (**self).discover()
    }
}

/// Reads the link-time [`MODULES`] list.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedDiscovery;

impl Discovery for LinkedDiscovery {
    fn discover(&self) -> Vec<ModuleEntry> {
        MODULES.iter().map(|ctor| ctor()).collect()
    }
}

/// A fixed list of entries supplied in code.
#[derive(Debug, Default, Clone)]
pub struct StaticDiscovery {
    entries: Vec<ModuleEntry>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entry: ModuleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: ModuleEntry) {
        self.entries.push(entry);
    }
}

impl FromIterator<ModuleEntry> for StaticDiscovery {
    fn from_iter<I: IntoIterator<Item = ModuleEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> Vec<ModuleEntry> {
        self.entries.clone()
    }
}
