//! Binding configuration modules

use crate::binder::Binder;

/// A declarative unit of binding configuration.
///
/// Modules are installed into a [`Binder`] and configured once, in install
/// order. A module's `configure` may install further modules; they are
/// appended to the worklist and configured after the ones already queued.
pub trait Module: Send + Sync {
    /// Register this module's bindings.
    fn configure(&self, binder: &Binder);
}

/// Adapter turning a closure into a [`Module`].
pub struct FnModule<F>(F);

impl<F> FnModule<F>
where
    F: Fn(&Binder) + Send + Sync,
{
    /// Wrap a configuration closure.
    pub fn new(configure: F) -> Self {
        FnModule(configure)
    }
}

impl<F> Module for FnModule<F>
where
    F: Fn(&Binder) + Send + Sync,
{
    fn configure(&self, binder: &Binder) {
        (self.0)(binder);
    }
}
