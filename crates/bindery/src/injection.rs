//! Per-target member injection
//!
//! An `Injection` processes one instance: walks its descriptor's member
//! table, resolves and assigns each dependency, then runs the post-construct
//! hooks. Missing bindings for fields are warnings, never failures; partial
//! wiring is legitimate.

use std::sync::Arc;

use tracing::warn;

use crate::binding::AnyHandle;
use crate::descriptor::{FieldBehavior, FieldDescriptor, ServiceDescriptor};
use crate::injector::Injector;

pub(crate) struct Injection<'a> {
    injector: &'a Arc<Injector>,
    target: AnyHandle,
    descriptor: Arc<ServiceDescriptor>,
}

impl<'a> Injection<'a> {
    pub(crate) fn new(
        injector: &'a Arc<Injector>,
        target: AnyHandle,
        descriptor: Arc<ServiceDescriptor>,
    ) -> Self {
        Injection {
            injector,
            target,
            descriptor,
        }
    }

    /// Run the injection steps: sanity check, field injection, sealing the
    /// slots (field injection is complete at that point, so the debug-build
    /// early-read detector only fires for reads from inside a dependency
    /// cycle), post-construct.
    pub(crate) fn execute(self) {
        if cfg!(debug_assertions)
            && self.descriptor.context().is_some()
            && self.descriptor.manual_setup()
        {
            warn!(
                type_name = self.descriptor.type_name(),
                "context-managed type also declares a manual setup method; \
                 construction order relative to that convention is unspecified"
            );
        }

        for field in self.descriptor.fields() {
            self.inject_field(field);
        }

        for field in self.descriptor.fields() {
            if let FieldBehavior::Direct { seal, .. } = field.behavior() {
                seal(self.target.as_ref());
            }
        }

        for method in self.descriptor.methods() {
            tracing::trace!(
                type_name = self.descriptor.type_name(),
                method = method.name(),
                "running post-construct"
            );
            method.invoke(self.target.as_ref());
        }
    }

    fn inject_field(&self, field: &FieldDescriptor) {
        let binding = self
            .injector
            .binder()
            .lookup(field.dep_id(), field.binding_name());
        let Some(binding) = binding else {
            warn!(
                type_name = self.descriptor.type_name(),
                member = field.member(),
                dependency = field.dep_type(),
                "no binding for injectable member; leaving it unset"
            );
            return;
        };

        match field.behavior() {
            FieldBehavior::Provider { install } => {
                let wired = install(
                    self.target.as_ref(),
                    Arc::downgrade(self.injector),
                    field.binding_name().map(str::to_string),
                    field.object_name_hint().map(str::to_string),
                );
                if !wired {
                    warn!(
                        type_name = self.descriptor.type_name(),
                        member = field.member(),
                        "provider member could not be wired"
                    );
                }
            }
            FieldBehavior::Direct { assign, .. } => {
                match self
                    .injector
                    .resolve_binding(&binding, field.object_name_hint())
                {
                    Ok(Some(resolved)) => {
                        if !assign(self.target.as_ref(), &resolved) {
                            warn!(
                                type_name = self.descriptor.type_name(),
                                member = field.member(),
                                dependency = field.dep_type(),
                                "resolved instance did not match the member type"
                            );
                        }
                    }
                    Ok(None) => {
                        warn!(
                            type_name = self.descriptor.type_name(),
                            member = field.member(),
                            dependency = field.dep_type(),
                            "dependency produced no instance; leaving member unset"
                        );
                    }
                    Err(err) => {
                        warn!(
                            type_name = self.descriptor.type_name(),
                            member = field.member(),
                            error = %err,
                            "dependency resolution failed; leaving member unset"
                        );
                    }
                }
            }
        }
    }
}
