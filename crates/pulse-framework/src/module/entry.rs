use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use pulse_core::{BoxError, ModuleDescriptor};

use super::{ModuleContext, ModuleInstance};

/// Future returned by a type-erased module initializer.
pub type InitFuture = BoxFuture<'static, Result<Arc<dyn ModuleInstance>, BoxError>>;

/// Type-erased module initializer.
pub type InitFn = Arc<dyn Fn(ModuleContext) -> InitFuture + Send + Sync>;

/// A discoverable module: its descriptor plus the function that builds it.
///
/// Usually produced by [`define_module!`](crate::define_module); can also be
/// assembled by hand:
///
/// ```rust,ignore
/// let entry = ModuleEntry::new(ModuleDescriptor::new("clock"), |_ctx| async {
///     Ok::<_, BoxError>(Clock::default())
/// });
/// ```
#[derive(Clone)]
pub struct ModuleEntry {
    descriptor: Arc<ModuleDescriptor>,
    init: InitFn,
}

impl ModuleEntry {
    /// Wraps an async initializer returning a concrete module type.
    pub fn new<F, Fut, M, E>(descriptor: ModuleDescriptor, init: F) -> Self
    where
        F: Fn(ModuleContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M, E>> + Send + 'static,
        M: ModuleInstance,
        E: Into<BoxError> + 'static,
    {
        Self {
            descriptor: Arc::new(descriptor),
            init: Arc::new(move |ctx| {
                init(ctx)
                    .map(|result| match result {
                        Ok(module) => Ok(Arc::new(module) as Arc<dyn ModuleInstance>),
                        Err(err) => Err(err.into()),
                    })
                    .boxed()
            }),
        }
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub(crate) fn shared_descriptor(&self) -> Arc<ModuleDescriptor> {
        Arc::clone(&self.descriptor)
    }

    /// Runs the initializer.
    pub(crate) fn instantiate(&self, ctx: ModuleContext) -> InitFuture {
        (self.init)(ctx)
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
