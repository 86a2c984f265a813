//! Pluggable instance creation
//!
//! Two strategies: plain construction through the descriptor's constructor,
//! or contextual construction, which finds-or-creates a named container in
//! the context registry and finds-or-attaches the instance within it. Every
//! new instance fires one creation event. Creation can be suspended globally
//! while a reset is in progress to guard against reentrant construction
//! during teardown.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::{debug, error};

use crate::binding::AnyHandle;
use crate::descriptor::ServiceDescriptor;

/// Payload of a creation event.
pub struct CreatedInstance<'a> {
    /// Name of the constructed type.
    pub type_name: &'static str,
    /// The new instance, type-erased.
    pub instance: &'a AnyHandle,
}

/// Listener invoked once per newly created instance.
pub type CreationListener = Arc<dyn Fn(&CreatedInstance<'_>) + Send + Sync>;

/// Outcome of a successful creation request.
pub enum Creation {
    /// A fresh instance; one creation event was fired.
    New(AnyHandle),
    /// An instance already attached to the requested context. No event was
    /// fired and the instance was already injected when it was attached.
    Reused(AnyHandle),
}

impl Creation {
    /// The type-erased instance, either way.
    pub fn handle(&self) -> &AnyHandle {
        match self {
            Creation::New(handle) | Creation::Reused(handle) => handle,
        }
    }

    /// Consume the outcome, keeping the instance.
    pub fn into_handle(self) -> AnyHandle {
        match self {
            Creation::New(handle) | Creation::Reused(handle) => handle,
        }
    }

    /// Whether the instance was reused from a context.
    pub fn is_reused(&self) -> bool {
        matches!(self, Creation::Reused(_))
    }
}

/// Named containers of already-attached instances, keyed by type within
/// each container.
#[derive(Default)]
struct ContextRegistry {
    containers: DashMap<String, HashMap<TypeId, AnyHandle>>,
}

impl ContextRegistry {
    fn find(&self, container: &str, type_id: TypeId) -> Option<AnyHandle> {
        self.containers
            .get(container)
            .and_then(|entry| entry.value().get(&type_id).cloned())
    }

    fn attach(&self, container: &str, type_id: TypeId, instance: AnyHandle) {
        self.containers
            .entry(container.to_string())
            .or_default()
            .insert(type_id, instance);
    }

    fn clear(&self) {
        self.containers.clear();
    }
}

/// Object-creation strategy with creation events and a reset guard.
#[derive(Default)]
pub struct Instantiator {
    listeners: Mutex<Vec<CreationListener>>,
    reset_in_progress: AtomicBool,
    contexts: ContextRegistry,
}

impl Instantiator {
    /// Create an instantiator with no listeners and empty contexts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance for the descriptor.
    ///
    /// Returns `None` while a reset is in progress, or when the constructor
    /// fails; constructor failures are logged and converted, callers must
    /// check. Contextual descriptors reuse an instance already attached to
    /// their container without firing a creation event; the outcome says
    /// which branch was taken so callers do not re-inject a reused instance.
    pub fn create(
        &self,
        descriptor: &ServiceDescriptor,
        object_name: Option<&str>,
    ) -> Option<Creation> {
        if self.reset_in_progress.load(Ordering::Acquire) {
            debug!(
                type_name = descriptor.type_name(),
                "creation suppressed during reset"
            );
            return None;
        }

        match descriptor.context() {
            Some(default_container) => {
                let container = object_name.unwrap_or(default_container);
                if let Some(existing) = self.contexts.find(container, descriptor.type_id()) {
                    debug!(
                        type_name = descriptor.type_name(),
                        container, "reusing instance attached to context"
                    );
                    return Some(Creation::Reused(existing));
                }
                let instance = self.run_constructor(descriptor)?;
                self.contexts
                    .attach(container, descriptor.type_id(), Arc::clone(&instance));
                self.notify(descriptor.type_name(), &instance);
                Some(Creation::New(instance))
            }
            None => {
                let instance = self.run_constructor(descriptor)?;
                self.notify(descriptor.type_name(), &instance);
                Some(Creation::New(instance))
            }
        }
    }

    /// Subscribe a creation listener. Re-subscribing the same listener does
    /// not duplicate delivery.
    pub fn subscribe(&self, listener: &CreationListener) {
        let mut listeners = self.lock_listeners();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, listener)) {
            listeners.push(Arc::clone(listener));
        }
    }

    /// Remove a previously subscribed listener. Unknown listeners are
    /// ignored.
    pub fn unsubscribe(&self, listener: &CreationListener) {
        self.lock_listeners().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// While set, `create` is a no-op returning `None`.
    pub fn set_reset_in_progress(&self, in_progress: bool) {
        self.reset_in_progress.store(in_progress, Ordering::Release);
    }

    /// Whether creation is currently suspended.
    pub fn is_reset_in_progress(&self) -> bool {
        self.reset_in_progress.load(Ordering::Acquire)
    }

    pub(crate) fn clear_contexts(&self) {
        self.contexts.clear();
    }

    fn run_constructor(&self, descriptor: &ServiceDescriptor) -> Option<AnyHandle> {
        match descriptor.create() {
            Ok(instance) => Some(instance),
            Err(err) => {
                error!(
                    type_name = descriptor.type_name(),
                    error = %err,
                    "constructor failed; returning no instance"
                );
                None
            }
        }
    }

    fn notify(&self, type_name: &'static str, instance: &AnyHandle) {
        let listeners = self.lock_listeners().clone();
        let event = CreatedInstance {
            type_name,
            instance,
        };
        for listener in &listeners {
            listener(&event);
        }
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<CreationListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
