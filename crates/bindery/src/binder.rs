//! Binding registry
//!
//! The binder keeps two disjoint maps: bindings keyed by type and bindings
//! keyed by name. A lookup that carries a name goes to the name map only and
//! never falls back to the type map. Modules are queued on an append-safe
//! worklist so a module's `configure` can install further modules
//! mid-traversal.

use std::any::TypeId;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::debug;

use crate::binding::{AnyHandle, Binding, BindingTarget};
use crate::builder::BindingBuilder;
use crate::descriptor::{Injectable, InterfaceOf, Service};
use crate::module::Module;
use crate::scope::Scope;

/// Registry of bindings and installed modules.
#[derive(Default)]
pub struct Binder {
    by_type: DashMap<TypeId, Arc<Binding>>,
    by_name: DashMap<String, Arc<Binding>>,
    modules: Mutex<Vec<Arc<dyn Module>>>,
}

impl Binder {
    /// Create an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a module for configuration.
    pub fn install<M: Module + 'static>(&self, module: M) {
        self.install_arc(Arc::new(module));
    }

    /// Queue an already-shared module for configuration.
    pub fn install_arc(&self, module: Arc<dyn Module>) {
        self.modules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(module);
    }

    /// Queue several modules at once, preserving order.
    pub fn install_all(&self, modules: impl IntoIterator<Item = Arc<dyn Module>>) {
        let mut queue = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
        queue.extend(modules);
    }

    /// Configure every installed module in install order, including modules
    /// installed as a side effect of configuring earlier ones.
    pub fn configure(&self) {
        let mut index = 0;
        loop {
            let next = {
                let queue = self.modules.lock().unwrap_or_else(PoisonError::into_inner);
                match queue.get(index) {
                    Some(module) => Arc::clone(module),
                    None => break,
                }
            };
            next.configure(self);
            index += 1;
        }
        debug!(modules = index, bindings = self.len(), "binder configured");
    }

    /// Start a fluent binding for `S`, keyed by type.
    pub fn bind<S: ?Sized + Service>(&self) -> BindingBuilder<'_, S> {
        BindingBuilder::new(self, self.get_or_create::<S>())
    }

    /// Start a fluent binding for `S`, keyed by name.
    pub fn bind_named<S: ?Sized + Service>(&self, name: &str) -> BindingBuilder<'_, S> {
        BindingBuilder::new(self, self.get_or_create_named(name))
    }

    /// Bind `S` to the implementation `C` in one step. Assignability of `C`
    /// to `S` is checked by the compiler through the `InterfaceOf` bound.
    pub fn bind_impl<S, C>(&self) -> Arc<Binding>
    where
        S: ?Sized + Service,
        C: Injectable + InterfaceOf<S>,
    {
        let binding = self.get_or_create::<S>();
        binding.set_target(BindingTarget::of::<S, C>());
        binding
    }

    /// Bind the name to the implementation `C` in one step.
    pub fn bind_impl_named<S, C>(&self, name: &str) -> Arc<Binding>
    where
        S: ?Sized + Service,
        C: Injectable + InterfaceOf<S>,
    {
        let binding = self.get_or_create_named(name);
        binding.set_target(BindingTarget::of::<S, C>());
        binding
    }

    /// Pin a pre-built instance for `S`; lookups return it by reference
    /// identity without invoking the instantiator.
    pub fn bind_instance<S: ?Sized + Service>(&self, instance: Arc<S>) -> Arc<Binding> {
        let binding = self.get_or_create::<S>();
        binding.pin(Arc::new(instance) as AnyHandle);
        binding
    }

    /// Pin a pre-built instance under a name.
    pub fn bind_instance_named<S: ?Sized + Service>(
        &self,
        instance: Arc<S>,
        name: &str,
    ) -> Arc<Binding> {
        let binding = self.get_or_create_named(name);
        binding.pin(Arc::new(instance) as AnyHandle);
        binding
    }

    /// Look up the binding for `S`, honoring the name short-circuit.
    pub fn get_binding<S: ?Sized + Service>(&self, name: Option<&str>) -> Option<Arc<Binding>> {
        self.lookup(TypeId::of::<S>(), name)
    }

    /// Get or create the type-keyed binding for `S`.
    pub fn get_or_create<S: ?Sized + Service>(&self) -> Arc<Binding> {
        self.by_type
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Arc::new(Binding::for_type::<S>()))
            .clone()
    }

    /// Get or create the name-keyed binding for `name`.
    pub fn get_or_create_named(&self, name: &str) -> Arc<Binding> {
        self.by_name
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Binding::for_name(name)))
            .clone()
    }

    /// Every binding with the given scope, sorted ascending by rank.
    pub fn bindings_by_scope(&self, scope: Scope) -> Vec<Arc<Binding>> {
        let mut matches: Vec<Arc<Binding>> = self
            .snapshot()
            .into_iter()
            .filter(|binding| binding.scope() == scope)
            .collect();
        matches.sort_by_key(|binding| binding.rank());
        matches
    }

    /// Discard all modules and bindings.
    pub fn reset(&self) {
        self.modules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.by_type.clear();
        self.by_name.clear();
        debug!("binder reset");
    }

    /// Total number of bindings across both maps.
    pub fn len(&self) -> usize {
        self.by_type.len() + self.by_name.len()
    }

    /// Whether no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.by_name.is_empty()
    }

    /// A lookup with a name consults the name map only.
    pub(crate) fn lookup(&self, type_id: TypeId, name: Option<&str>) -> Option<Arc<Binding>> {
        match name {
            Some(name) => self.by_name.get(name).map(|entry| Arc::clone(entry.value())),
            None => self
                .by_type
                .get(&type_id)
                .map(|entry| Arc::clone(entry.value())),
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<Binding>> {
        self.by_type
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .chain(self.by_name.iter().map(|entry| Arc::clone(entry.value())))
            .collect()
    }
}
