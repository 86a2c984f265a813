//! Bindings: one registered mapping each
//!
//! A binding connects a key (a type or a name) to an implementation target,
//! a scope, a rank, an optional object-name hint and, once resolved, the
//! published instance. Instances travel through the container type-erased:
//! the concrete handle (`Arc<C>` behind `dyn Any`) feeds member injection,
//! the exposed handle (an `Arc<S>` boxed behind `dyn Any`) is what lookups
//! hand back.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::descriptor::{InterfaceOf, Injectable, Service, ServiceDescriptor};
use crate::scope::Scope;

/// Type-erased shared instance handle.
pub type AnyHandle = Arc<dyn std::any::Any + Send + Sync>;

/// Key of a binding: a type or a name, never both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// Keyed by interface or concrete type.
    Type {
        /// Type id of the requested service type.
        id: TypeId,
        /// Human-readable type name, for diagnostics.
        name: &'static str,
    },
    /// Keyed by binding name; resolved against the name map only.
    Name(String),
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKey::Type { name, .. } => f.write_str(name),
            BindingKey::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

pub(crate) struct BindingTarget {
    pub descriptor: Arc<ServiceDescriptor>,
    pub expose: Arc<dyn Fn(AnyHandle) -> Option<AnyHandle> + Send + Sync>,
}

impl Clone for BindingTarget {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            expose: Arc::clone(&self.expose),
        }
    }
}

impl BindingTarget {
    pub(crate) fn of<S, C>() -> Self
    where
        S: ?Sized + Service,
        C: Injectable + InterfaceOf<S>,
    {
        BindingTarget {
            descriptor: Arc::new(C::descriptor()),
            expose: Arc::new(|concrete| {
                let concrete = concrete.downcast::<C>().ok()?;
                let interface: Arc<S> = <C as InterfaceOf<S>>::upcast(concrete);
                Some(Arc::new(interface) as AnyHandle)
            }),
        }
    }
}

/// The instance pair published into a binding.
#[derive(Clone)]
pub(crate) struct Published {
    /// Concrete handle, used for member injection. `None` for pinned
    /// pre-built instances, which are never injected.
    pub concrete: Option<AnyHandle>,
    /// Interface-typed handle returned to callers.
    pub exposed: AnyHandle,
}

struct BindingState {
    target: Option<BindingTarget>,
    scope: Scope,
    rank: i32,
    object_name: Option<String>,
    instance: Option<Published>,
}

/// One registered mapping from a key to an implementation, scope, rank and
/// (once resolved) instance.
pub struct Binding {
    key: BindingKey,
    state: RwLock<BindingState>,
}

impl Binding {
    pub(crate) fn for_type<S: ?Sized + Service>() -> Self {
        Self::with_key(BindingKey::Type {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        })
    }

    pub(crate) fn for_name(name: &str) -> Self {
        Self::with_key(BindingKey::Name(name.to_string()))
    }

    fn with_key(key: BindingKey) -> Self {
        Binding {
            key,
            state: RwLock::new(BindingState {
                target: None,
                scope: Scope::default(),
                rank: 0,
                object_name: None,
                instance: None,
            }),
        }
    }

    /// The binding's key.
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// Current scope.
    pub fn scope(&self) -> Scope {
        self.read().scope
    }

    /// Current rank.
    pub fn rank(&self) -> i32 {
        self.read().rank
    }

    /// Current object-name hint.
    pub fn object_name(&self) -> Option<String> {
        self.read().object_name.clone()
    }

    /// Whether an instance has been published or pinned.
    pub fn has_instance(&self) -> bool {
        self.read().instance.is_some()
    }

    /// Name of the implementation type, if a target is set.
    pub fn implementation(&self) -> Option<&'static str> {
        self.read().target.as_ref().map(|t| t.descriptor.type_name())
    }

    pub(crate) fn set_target(&self, target: BindingTarget) {
        self.write().target = Some(target);
    }

    pub(crate) fn set_scope(&self, scope: Scope) {
        self.write().scope = scope;
    }

    pub(crate) fn set_rank(&self, rank: i32) {
        self.write().rank = rank;
    }

    pub(crate) fn set_object_name(&self, hint: &str) {
        self.write().object_name = Some(hint.to_string());
    }

    /// Pin a pre-built instance; lookups return it without construction.
    pub(crate) fn pin(&self, exposed: AnyHandle) {
        self.write().instance = Some(Published {
            concrete: None,
            exposed,
        });
    }

    /// Publish a constructed instance. Happens before the instance's own
    /// members are injected, which is what makes dependency cycles
    /// resolvable.
    pub(crate) fn publish(&self, concrete: AnyHandle, exposed: AnyHandle) {
        self.write().instance = Some(Published {
            concrete: Some(concrete),
            exposed,
        });
    }

    pub(crate) fn cached_exposed(&self) -> Option<AnyHandle> {
        self.read().instance.as_ref().map(|p| Arc::clone(&p.exposed))
    }

    /// Everything needed to construct: target, scope and hint, cloned out so
    /// no lock is held across re-entrant resolution.
    pub(crate) fn construction_plan(&self) -> (Option<BindingTarget>, Scope, Option<String>) {
        let state = self.read();
        (state.target.clone(), state.scope, state.object_name.clone())
    }

    /// One-line description for diagnostics.
    pub(crate) fn describe(&self) -> String {
        let state = self.read();
        let implementation = state
            .target
            .as_ref()
            .map_or("<unbound>", |t| t.descriptor.type_name());
        format!(
            "{} -> {} [{}, rank {}{}]",
            self.key,
            implementation,
            state.scope,
            state.rank,
            if state.instance.is_some() {
                ", instance"
            } else {
                ""
            }
        )
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BindingState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BindingState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("scope", &self.scope())
            .field("rank", &self.rank())
            .field("has_instance", &self.has_instance())
            .finish()
    }
}
