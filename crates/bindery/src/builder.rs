//! Fluent binding mutation

use std::marker::PhantomData;
use std::sync::Arc;

use crate::binder::Binder;
use crate::binding::{AnyHandle, Binding, BindingTarget};
use crate::descriptor::{Injectable, InterfaceOf, Service};
use crate::scope::Scope;

/// Fluent, stateful mutator bound to one [`Binding`].
///
/// Obtained from [`Binder::bind`] or [`Binder::bind_named`]. Retargeting to a
/// named binding switches the builder to that binding entirely.
pub struct BindingBuilder<'b, S: ?Sized + Service> {
    binder: &'b Binder,
    binding: Arc<Binding>,
    _marker: PhantomData<fn(&S)>,
}

impl<'b, S: ?Sized + Service> BindingBuilder<'b, S> {
    pub(crate) fn new(binder: &'b Binder, binding: Arc<Binding>) -> Self {
        BindingBuilder {
            binder,
            binding,
            _marker: PhantomData,
        }
    }

    /// Target the implementation `C`. The compiler checks that `C` is
    /// assignable to `S` through the `InterfaceOf` bound.
    pub fn to<C>(self) -> Self
    where
        C: Injectable + InterfaceOf<S>,
    {
        self.binding.set_target(BindingTarget::of::<S, C>());
        self
    }

    /// Target `C` under a binding name; the builder switches to the
    /// name-keyed binding.
    pub fn to_named<C>(self, name: &str) -> Self
    where
        C: Injectable + InterfaceOf<S>,
    {
        let binding = self.binder.get_or_create_named(name);
        binding.set_target(BindingTarget::of::<S, C>());
        BindingBuilder::new(self.binder, binding)
    }

    /// Pin a pre-built instance.
    pub fn to_instance(self, instance: Arc<S>) -> Self {
        self.binding.pin(Arc::new(instance) as AnyHandle);
        self
    }

    /// Pin a pre-built instance under a binding name; the builder switches
    /// to the name-keyed binding.
    pub fn to_instance_named(self, instance: Arc<S>, name: &str) -> Self {
        let binding = self.binder.get_or_create_named(name);
        binding.pin(Arc::new(instance) as AnyHandle);
        BindingBuilder::new(self.binder, binding)
    }

    /// Set the lifecycle scope.
    pub fn in_scope(self, scope: Scope) -> Self {
        self.binding.set_scope(scope);
        self
    }

    /// Set the eager-bootstrap ordering rank.
    pub fn rank(self, rank: i32) -> Self {
        self.binding.set_rank(rank);
        self
    }

    /// Set the object-name hint forwarded to contextual construction.
    pub fn object_name(self, hint: &str) -> Self {
        self.binding.set_object_name(hint);
        self
    }

    /// The binding this builder currently mutates.
    pub fn binding(&self) -> Arc<Binding> {
        Arc::clone(&self.binding)
    }
}
