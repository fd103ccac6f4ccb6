use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

/// Type-erasure helper so live instances can be downcast to their concrete type.
///
/// Blanket-implemented for every `'static + Send + Sync` type; never
/// implement it by hand.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A live, activated module.
///
/// Whatever a module's initializer returns is stored in the namespace under
/// the module's name.  Dependents look it up and downcast it to the concrete
/// type they expect.
///
/// # Example
///
/// ```rust,ignore
/// struct Storage { root: PathBuf }
///
/// #[async_trait]
/// impl ModuleInstance for Storage {
///     async fn on_unload(&self) {
///         info!("storage closed");
///     }
/// }
/// ```
#[async_trait]
pub trait ModuleInstance: AsAny {
    /// Called once when the owning run is stopped, in reverse activation order.
    async fn on_unload(&self) {}
}

/// Downcasts a shared instance to `T`.
///
/// Returns `None` when the instance is of a different type.
pub fn downcast_instance<T>(instance: &Arc<dyn ModuleInstance>) -> Option<Arc<T>>
where
    T: ModuleInstance,
{
    Arc::clone(instance).into_any_arc().downcast::<T>().ok()
}
