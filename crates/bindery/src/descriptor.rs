//! Declarative service descriptors
//!
//! The container does not rely on runtime reflection. Every injectable type
//! publishes a [`ServiceDescriptor`]: its constructor, an ordered table of
//! injectable members, and its post-construct methods. The injector walks
//! that table with type-erased closures generated where the concrete types
//! are still known.
//!
//! ```text
//! Injectable::descriptor()         Injection::execute()
//! ────────────────────────         ────────────────────
//! constructor                  →   Instantiator::create
//! FieldDescriptor table        →   resolve + assign into Dep slots
//! post-construct methods       →   invoked in declaration order
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::binding::AnyHandle;
use crate::error::Result;
use crate::injector::Injector;
use crate::provider::Provider;

/// Marker bound for everything the container can hand out: any `'static`
/// type or trait object whose trait requires `Send + Sync`.
pub trait Service: Send + Sync + 'static {}

impl<S: ?Sized + Send + Sync + 'static> Service for S {}

/// Upcast from a concrete implementation to one of its declared interfaces.
///
/// Implemented for every `(interface, implementation)` pair a binding may
/// connect; the [`implements!`](crate::implements) macro generates the
/// boilerplate. The blanket self-impl covers concrete self-bindings.
pub trait InterfaceOf<S: ?Sized + Service>: Send + Sync + Sized + 'static {
    /// Convert a shared handle to this type into an interface handle.
    fn upcast(this: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> InterfaceOf<T> for T {
    fn upcast(this: Arc<T>) -> Arc<T> {
        this
    }
}

/// Declare which interfaces a concrete type can be bound to.
///
/// ```
/// # use std::sync::Arc;
/// # use bindery::implements;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct EnglishGreeter;
///
/// impl Greeter for EnglishGreeter {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// implements!(EnglishGreeter: dyn Greeter);
/// ```
#[macro_export]
macro_rules! implements {
    ($impl:ty: $($iface:ty),+ $(,)?) => {
        $(
            impl $crate::InterfaceOf<$iface> for $impl {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$iface> {
                    this
                }
            }
        )+
    };
}

/// An injectable type: publishes its own descriptor.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Build the descriptor for this type.
    fn descriptor() -> ServiceDescriptor;
}

/// Once-settable slot for an injected member.
///
/// Fields of injectable types are `Dep<S>`; the injector assigns them after
/// the owning instance has been published into its binding, which is what
/// makes mutually dependent singletons resolvable. An unbound dependency
/// leaves the slot empty.
pub struct Dep<S: ?Sized> {
    slot: OnceCell<Arc<S>>,
    ready: AtomicBool,
}

impl<S: ?Sized> Default for Dep<S> {
    fn default() -> Self {
        Self {
            slot: OnceCell::new(),
            ready: AtomicBool::new(false),
        }
    }
}

impl<S: ?Sized> Dep<S> {
    /// Read the injected value, if any.
    ///
    /// In debug builds, reading a value that was assigned while its owner is
    /// still mid-construction logs a warning: the early-publish rule makes
    /// such reads possible inside dependency cycles, and they observe a
    /// partially injected peer.
    pub fn get(&self) -> Option<Arc<S>> {
        let value = self.slot.get().cloned();
        #[cfg(debug_assertions)]
        if value.is_some() && !self.ready.load(Ordering::Acquire) {
            tracing::warn!(
                dependency = std::any::type_name::<S>(),
                "injected field read before its owner finished construction"
            );
        }
        value
    }

    /// Whether a value has been injected.
    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    pub(crate) fn assign(&self, value: Arc<S>) -> bool {
        self.slot.set(value).is_ok()
    }

    pub(crate) fn seal(&self) {
        self.ready.store(true, Ordering::Release);
    }
}

impl<S: ?Sized> fmt::Debug for Dep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("type", &std::any::type_name::<S>())
            .field("set", &self.is_set())
            .finish()
    }
}

type AssignFn = Box<dyn Fn(&(dyn Any + Send + Sync), &AnyHandle) -> bool + Send + Sync>;
type SealFn = Box<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;
type InstallFn = Box<
    dyn Fn(&(dyn Any + Send + Sync), Weak<Injector>, Option<String>, Option<String>) -> bool
        + Send
        + Sync,
>;
type InvokeFn = Box<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;
type CreateFn = Box<dyn Fn() -> Result<AnyHandle> + Send + Sync>;

pub(crate) enum FieldBehavior {
    /// Resolve the dependency now and assign it into the `Dep` slot.
    Direct { assign: AssignFn, seal: SealFn },
    /// Wire a `Provider` for deferred resolution.
    Provider { install: InstallFn },
}

/// One injectable member of a service type.
pub struct FieldDescriptor {
    member: &'static str,
    dep_id: TypeId,
    dep_type: &'static str,
    binding_name: Option<&'static str>,
    object_name: Option<&'static str>,
    behavior: FieldBehavior,
}

impl FieldDescriptor {
    /// An eagerly injected member: `Dep<S>` on `C`, resolved at injection
    /// time from the binding for `S`.
    pub fn direct<C, S>(member: &'static str, access: fn(&C) -> &Dep<S>) -> Self
    where
        C: Send + Sync + 'static,
        S: ?Sized + Service,
    {
        FieldDescriptor {
            member,
            dep_id: TypeId::of::<S>(),
            dep_type: std::any::type_name::<S>(),
            binding_name: None,
            object_name: None,
            behavior: FieldBehavior::Direct {
                assign: Box::new(move |target, handle| {
                    let Some(owner) = target.downcast_ref::<C>() else {
                        return false;
                    };
                    let Some(resolved) = handle.downcast_ref::<Arc<S>>() else {
                        return false;
                    };
                    access(owner).assign(Arc::clone(resolved))
                }),
                seal: Box::new(move |target| {
                    if let Some(owner) = target.downcast_ref::<C>() {
                        access(owner).seal();
                    }
                }),
            },
        }
    }

    /// A deferred member: `Provider<S>` on `C`, wired at injection time and
    /// resolved on demand.
    pub fn provider<C, S>(member: &'static str, access: fn(&C) -> &Provider<S>) -> Self
    where
        C: Send + Sync + 'static,
        S: ?Sized + Service,
    {
        FieldDescriptor {
            member,
            dep_id: TypeId::of::<S>(),
            dep_type: std::any::type_name::<S>(),
            binding_name: None,
            object_name: None,
            behavior: FieldBehavior::Provider {
                install: Box::new(move |target, injector, name, object_name| {
                    let Some(owner) = target.downcast_ref::<C>() else {
                        return false;
                    };
                    access(owner).wire(injector, name, object_name)
                }),
            },
        }
    }

    /// Resolve this member against a named binding instead of the type map.
    pub fn named(mut self, name: &'static str) -> Self {
        self.binding_name = Some(name);
        self
    }

    /// Object-name hint forwarded to contextual construction; takes
    /// precedence over the binding's own hint.
    pub fn object_name(mut self, hint: &'static str) -> Self {
        self.object_name = Some(hint);
        self
    }

    pub(crate) fn member(&self) -> &'static str {
        self.member
    }

    pub(crate) fn dep_id(&self) -> TypeId {
        self.dep_id
    }

    pub(crate) fn dep_type(&self) -> &'static str {
        self.dep_type
    }

    pub(crate) fn binding_name(&self) -> Option<&'static str> {
        self.binding_name
    }

    pub(crate) fn object_name_hint(&self) -> Option<&'static str> {
        self.object_name
    }

    pub(crate) fn behavior(&self) -> &FieldBehavior {
        &self.behavior
    }
}

pub(crate) struct MethodDescriptor {
    name: &'static str,
    invoke: InvokeFn,
}

impl MethodDescriptor {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, target: &(dyn Any + Send + Sync)) {
        (self.invoke)(target);
    }
}

/// Descriptor of one concrete injectable type: constructor, member table and
/// post-construct hooks.
pub struct ServiceDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    create: CreateFn,
    context: Option<&'static str>,
    manual_setup: bool,
    fields: Vec<FieldDescriptor>,
    post_construct: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Descriptor with an explicit fallible constructor.
    pub fn new<C, F>(ctor: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn() -> Result<C> + Send + Sync + 'static,
    {
        ServiceDescriptor {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            create: Box::new(move || ctor().map(|c| Arc::new(c) as AnyHandle)),
            context: None,
            manual_setup: false,
            fields: Vec::new(),
            post_construct: Vec::new(),
        }
    }

    /// Descriptor for a `Default`-constructible type.
    pub fn of<C>() -> Self
    where
        C: Default + Send + Sync + 'static,
    {
        Self::new(|| Ok(C::default()))
    }

    /// Opt into contextual construction: find-or-attach within the named
    /// container of the instantiator's context registry.
    pub fn in_context(mut self, container: &'static str) -> Self {
        self.context = Some(container);
        self
    }

    /// Flag that the type also carries a conventional ad-hoc setup method.
    /// Contextual types with this flag trigger a debug-build warning, since
    /// construction order relative to that convention is unspecified.
    pub fn with_manual_setup(mut self) -> Self {
        self.manual_setup = true;
        self
    }

    /// Append an injectable member. Members are processed in declaration
    /// order.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a zero-argument post-construct method, invoked after all field
    /// injection for the instance completes. Declaration order is preserved.
    pub fn post_construct<C>(mut self, name: &'static str, invoke: fn(&C)) -> Self
    where
        C: Send + Sync + 'static,
    {
        self.post_construct.push(MethodDescriptor {
            name,
            invoke: Box::new(move |target| {
                if let Some(owner) = target.downcast_ref::<C>() {
                    invoke(owner);
                }
            }),
        });
        self
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn create(&self) -> Result<AnyHandle> {
        (self.create)()
    }

    pub(crate) fn context(&self) -> Option<&'static str> {
        self.context
    }

    pub(crate) fn manual_setup(&self) -> bool {
        self.manual_setup
    }

    pub(crate) fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub(crate) fn methods(&self) -> &[MethodDescriptor] {
        &self.post_construct
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("type", &self.type_name)
            .field("context", &self.context)
            .field("fields", &self.fields.len())
            .field("post_construct", &self.post_construct.len())
            .finish()
    }
}
