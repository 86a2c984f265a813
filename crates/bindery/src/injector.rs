//! Injection facade
//!
//! The injector resolves bindings through the binder, builds instances
//! through the instantiator plus per-target injection, and bootstraps eager
//! singletons in ascending rank order. Construction is re-entrant by design:
//! resolving A may, during A's own field injection, resolve B which resolves
//! back to A. Non-prototype instances are published into their binding
//! before their members are injected, so the cycle terminates with both
//! peers pointing at the real singletons.

use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use once_cell::sync::Lazy;
use tracing::{debug, error, info, warn};

use crate::binder::Binder;
use crate::binding::{AnyHandle, Binding};
use crate::descriptor::{Injectable, Service};
use crate::error::{Error, Result};
use crate::injection::Injection;
use crate::instantiator::Instantiator;
use crate::scope::Scope;

/// Lifecycle contract for external trackers that tear components down.
pub trait Resettable: Send + Sync {
    /// Discard all held state.
    fn reset(&self);
}

/// Facade over binder, instantiator and injection.
pub struct Injector {
    binder: Binder,
    instantiator: Instantiator,
}

impl Injector {
    /// Create an injector with an empty binder.
    pub fn new() -> Arc<Self> {
        Self::with_binder(Binder::new())
    }

    /// Create an injector around a pre-populated binder.
    pub fn with_binder(binder: Binder) -> Arc<Self> {
        Arc::new(Injector {
            binder,
            instantiator: Instantiator::new(),
        })
    }

    /// The binding registry.
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// The instance-creation strategy.
    pub fn instantiator(&self) -> &Instantiator {
        &self.instantiator
    }

    /// Configure all installed modules, then construct every eager singleton
    /// in ascending rank order. A failure in one eager singleton is logged
    /// and does not abort the remaining ones.
    pub fn bootstrap(self: &Arc<Self>) {
        self.binder.configure();
        let eager = self.binder.bindings_by_scope(Scope::EagerSingleton);
        info!(count = eager.len(), "bootstrapping eager singletons");
        for binding in eager {
            if binding.has_instance() {
                continue;
            }
            match self.construct(&binding, None) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    error!(
                        binding = %binding.key(),
                        "eager singleton produced no instance; continuing bootstrap"
                    );
                }
                Err(err) => {
                    error!(
                        binding = %binding.key(),
                        error = %err,
                        "eager singleton bootstrap failed; continuing with the rest"
                    );
                }
            }
        }
    }

    /// Resolve `S` through its type-keyed binding.
    pub fn get<S: ?Sized + Service>(self: &Arc<Self>) -> Result<Arc<S>> {
        self.get_with::<S>(None, None)
    }

    /// Resolve `S` through a name-keyed binding.
    pub fn get_named<S: ?Sized + Service>(self: &Arc<Self>, name: &str) -> Result<Arc<S>> {
        self.get_with::<S>(Some(name), None)
    }

    /// Resolve `S` with an optional binding name and object-name override.
    ///
    /// A lookup with a name consults the name map only. No binding is a
    /// fatal error for this call; a constructor failure surfaces as
    /// [`Error::ConstructionFailed`].
    pub fn get_with<S: ?Sized + Service>(
        self: &Arc<Self>,
        name: Option<&str>,
        object_name: Option<&str>,
    ) -> Result<Arc<S>> {
        let binding = self
            .binder
            .get_binding::<S>(name)
            .ok_or_else(|| match name {
                Some(name) => Error::lookup_failed(format!("\"{name}\"")),
                None => Error::lookup_failed(std::any::type_name::<S>()),
            })?;
        let exposed = self
            .resolve_binding(&binding, object_name)?
            .ok_or_else(|| {
                Error::construction_failed(
                    std::any::type_name::<S>(),
                    "constructor produced no instance",
                )
            })?;
        exposed
            .downcast_ref::<Arc<S>>()
            .cloned()
            .ok_or_else(|| Error::type_mismatch(binding.describe(), std::any::type_name::<S>()))
    }

    /// Ad-hoc entry point: inject an instance whose construction is not
    /// binding-managed.
    pub fn inject<T: Injectable>(self: &Arc<Self>, target: &Arc<T>) {
        let descriptor = Arc::new(T::descriptor());
        let handle: AnyHandle = target.clone();
        Injection::new(self, handle, descriptor).execute();
    }

    /// Human-readable dump of every binding, for debugging.
    pub fn info(&self) -> String {
        let mut bindings = self.binder.snapshot();
        bindings.sort_by_key(|b| b.describe());
        let mut report = String::new();
        let _ = writeln!(report, "{} bindings:", bindings.len());
        for binding in bindings {
            let _ = writeln!(report, "  {}", binding.describe());
        }
        report
    }

    /// Tear the container down: suspend creation, discard all bindings,
    /// modules and attached contexts, and release the process-wide handle if
    /// it points at this injector.
    pub fn reset(self: &Arc<Self>) {
        debug!("injector reset");
        self.instantiator.set_reset_in_progress(true);
        self.binder.reset();
        self.instantiator.clear_contexts();
        clear_global(self);
        self.instantiator.set_reset_in_progress(false);
    }

    /// Resolve a binding: return the cached instance, or construct.
    pub(crate) fn resolve_binding(
        self: &Arc<Self>,
        binding: &Arc<Binding>,
        object_name: Option<&str>,
    ) -> Result<Option<AnyHandle>> {
        if let Some(cached) = binding.cached_exposed() {
            return Ok(Some(cached));
        }
        self.construct(binding, object_name)
    }

    /// Construct an instance for the binding: instantiate, publish before
    /// injection for caching scopes, inject, return.
    fn construct(
        self: &Arc<Self>,
        binding: &Arc<Binding>,
        object_name: Option<&str>,
    ) -> Result<Option<AnyHandle>> {
        let (target, scope, hint) = binding.construction_plan();
        let target = target.ok_or_else(|| Error::not_concrete(binding.describe()))?;

        let effective_name = object_name.or(hint.as_deref());
        let Some(created) = self.instantiator.create(&target.descriptor, effective_name) else {
            warn!(binding = %binding.key(), "instantiator produced no instance");
            return Ok(None);
        };
        let reused = created.is_reused();
        let concrete = created.into_handle();

        let exposed = (target.expose)(Arc::clone(&concrete)).ok_or_else(|| {
            Error::type_mismatch(binding.describe(), target.descriptor.type_name())
        })?;

        if scope.caches_instance() {
            binding.publish(Arc::clone(&concrete), Arc::clone(&exposed));
        }

        // An instance reused from a context was injected when it was first
        // attached; running injection again would re-fire its hooks.
        if !reused {
            Injection::new(self, concrete, Arc::clone(&target.descriptor)).execute();
        }

        Ok(Some(exposed))
    }
}

impl Resettable for Arc<Injector> {
    fn reset(&self) {
        Injector::reset(self);
    }
}

// Process-wide handle, retained as a migration aid for code that cannot yet
// take an explicit `Arc<Injector>`. Debug builds warn on every access.
static PROCESS_HANDLE: Lazy<RwLock<Weak<Injector>>> = Lazy::new(|| RwLock::new(Weak::new()));

/// Publish an injector as the process-wide handle.
pub fn set_global(injector: &Arc<Injector>) {
    *PROCESS_HANDLE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(injector);
}

/// Fetch the process-wide injector, if one is published and still alive.
///
/// Prefer passing an explicit `Arc<Injector>` from the composition root;
/// this accessor exists for incremental migration only.
pub fn try_global() -> Option<Arc<Injector>> {
    #[cfg(debug_assertions)]
    warn!("process-wide injector accessed; prefer explicit handle passing");
    PROCESS_HANDLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .upgrade()
}

fn clear_global(injector: &Arc<Injector>) {
    let mut handle = PROCESS_HANDLE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(current) = handle.upgrade() {
        if Arc::ptr_eq(&current, injector) {
            *handle = Weak::new();
        }
    }
}
