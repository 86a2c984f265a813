//! Error handling types

use thiserror::Error;

/// Result type alias for container operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the container
#[derive(Error, Debug)]
pub enum Error {
    /// No binding registered for the requested type or name
    #[error("no binding registered for {requested}")]
    LookupFailed {
        /// The key that was requested (type name or binding name)
        requested: String,
    },

    /// A binding resolved to an instance of a different type than requested.
    ///
    /// Only reachable through name-keyed lookups; type-keyed lookups are
    /// checked at compile time through the `InterfaceOf` bound.
    #[error("binding {binding} does not expose {expected}")]
    TypeMismatch {
        /// The binding that was resolved
        binding: String,
        /// The type the caller asked for
        expected: &'static str,
    },

    /// The binding has no concrete implementation to construct
    #[error("binding {binding} has no concrete implementation to construct")]
    NotConcrete {
        /// The binding that was asked to construct
        binding: String,
    },

    /// A constructor invoked by the instantiator failed
    #[error("construction of {type_name} failed: {message}")]
    ConstructionFailed {
        /// The type whose constructor failed
        type_name: &'static str,
        /// Description of the failure
        message: String,
    },

    /// A provider was read before being wired, or its injector was dropped
    #[error("provider for {type_name} is not wired into a live injector")]
    ProviderUnwired {
        /// The provided type
        type_name: &'static str,
    },
}

impl Error {
    /// Create a lookup failure for a requested key
    pub fn lookup_failed<S: Into<String>>(requested: S) -> Self {
        Self::LookupFailed {
            requested: requested.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<S: Into<String>>(binding: S, expected: &'static str) -> Self {
        Self::TypeMismatch {
            binding: binding.into(),
            expected,
        }
    }

    /// Create a not-concrete error for a binding description
    pub fn not_concrete<S: Into<String>>(binding: S) -> Self {
        Self::NotConcrete {
            binding: binding.into(),
        }
    }

    /// Create a construction failure
    pub fn construction_failed<S: Into<String>>(type_name: &'static str, message: S) -> Self {
        Self::ConstructionFailed {
            type_name,
            message: message.into(),
        }
    }

    /// Create an unwired-provider error
    pub fn provider_unwired(type_name: &'static str) -> Self {
        Self::ProviderUnwired { type_name }
    }
}
