//! Constructor-injection services with per-call scopes.
//!
//! The root [`Services`] container is built once at startup and shared across
//! calls (it is `Send + Sync`). Every dispatch creates a fresh
//! [`ServiceScope`]; instances resolved through a scope are memoized for its
//! lifetime and released when the scope drops, on every exit path of the call.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

type Factory = Arc<dyn Fn(&ServiceScope<'_>) -> Rc<dyn Any> + Send + Sync>;

/// Root container: type-keyed factories, immutable after startup.
#[derive(Default)]
pub struct Services {
    factories: HashMap<TypeId, Factory>,
}

impl Services {
    pub fn new() -> Self {
        Services::default()
    }

    /// Register a factory for `T`. The factory may resolve other services
    /// through the scope it receives, forming a constructor-injection chain.
    pub fn provide<T: 'static>(
        &mut self,
        factory: impl Fn(&ServiceScope<'_>) -> T + Send + Sync + 'static,
    ) -> &mut Self {
        self.factories
            .insert(TypeId::of::<T>(), Arc::new(move |scope| Rc::new(factory(scope))));
        self
    }

    /// Open a fresh scope for one call.
    pub fn scope(&self) -> ServiceScope<'_> {
        ServiceScope {
            services: self,
            instances: RefCell::new(HashMap::new()),
        }
    }
}

/// One call's worth of resolved instances.
///
/// Resolution is memoized: the first `resolve::<T>()` runs the factory,
/// later ones return the same `Rc`. Dropping the scope releases everything.
pub struct ServiceScope<'a> {
    services: &'a Services,
    instances: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

impl ServiceScope<'_> {
    /// Resolve an instance of `T`, or `None` when no factory is registered.
    pub fn resolve<T: 'static>(&self) -> Option<Rc<T>> {
        let key = TypeId::of::<T>();
        if let Some(existing) = self.instances.borrow().get(&key) {
            return existing.clone().downcast::<T>().ok();
        }
        let factory = self.services.factories.get(&key)?.clone();
        // The borrow is released before the factory runs so it can resolve
        // its own dependencies through this same scope.
        let instance = factory(self);
        self.instances.borrow_mut().insert(key, instance.clone());
        instance.downcast::<T>().ok()
    }
}

impl Drop for ServiceScope<'_> {
    fn drop(&mut self) {
        tracing::trace!(instances = self.instances.borrow().len(), "scope released");
    }
}
