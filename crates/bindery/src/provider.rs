//! Deferred-resolution handles

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::descriptor::Service;
use crate::error::{Error, Result};
use crate::injector::Injector;

struct ProviderState {
    injector: Weak<Injector>,
    name: Option<String>,
    object_name: Option<String>,
}

/// Deferred-resolution handle for a bound service.
///
/// A `Provider<S>` field defers resolution of `S` to an explicit [`get`]
/// call instead of the owner's injection time: no eager construction chain,
/// and a fresh instance per call for prototype bindings. The injector wires
/// the provider during the owner's injection, capturing the field's binding
/// name and object-name hint.
///
/// [`get`]: Provider::get
pub struct Provider<S: ?Sized + Service> {
    state: OnceCell<ProviderState>,
    _marker: PhantomData<fn(&S)>,
}

impl<S: ?Sized + Service> Default for Provider<S> {
    fn default() -> Self {
        Provider {
            state: OnceCell::new(),
            _marker: PhantomData,
        }
    }
}

impl<S: ?Sized + Service> Provider<S> {
    /// Resolve `S` now.
    pub fn get(&self) -> Result<Arc<S>> {
        let state = self
            .state
            .get()
            .ok_or_else(|| Error::provider_unwired(std::any::type_name::<S>()))?;
        let injector = state
            .injector
            .upgrade()
            .ok_or_else(|| Error::provider_unwired(std::any::type_name::<S>()))?;
        injector.get_with::<S>(state.name.as_deref(), state.object_name.as_deref())
    }

    /// Whether the provider has been wired into an injector.
    pub fn is_wired(&self) -> bool {
        self.state.get().is_some()
    }

    pub(crate) fn wire(
        &self,
        injector: Weak<Injector>,
        name: Option<String>,
        object_name: Option<String>,
    ) -> bool {
        self.state
            .set(ProviderState {
                injector,
                name,
                object_name,
            })
            .is_ok()
    }
}

impl<S: ?Sized + Service> fmt::Debug for Provider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("type", &std::any::type_name::<S>())
            .field("wired", &self.is_wired())
            .finish()
    }
}
