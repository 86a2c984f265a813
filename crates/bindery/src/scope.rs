//! Binding lifecycle policies

use std::fmt;

/// Lifecycle policy of a binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One instance, constructed lazily on first resolution.
    #[default]
    Singleton,
    /// One instance, constructed proactively during bootstrap in ascending
    /// rank order.
    EagerSingleton,
    /// A fresh instance on every resolution; never cached.
    Prototype,
}

impl Scope {
    /// Whether this scope publishes its instance into the binding.
    pub fn caches_instance(self) -> bool {
        !matches!(self, Scope::Prototype)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scope::Singleton => "singleton",
            Scope::EagerSingleton => "eager-singleton",
            Scope::Prototype => "prototype",
        };
        f.write_str(label)
    }
}
