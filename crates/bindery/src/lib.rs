//! bindery - runtime dependency-injection container
//!
//! A binder keeps type-keyed and name-keyed bindings, modules register
//! bindings declaratively, and an injector constructs object graphs with
//! singleton, eager-singleton and prototype scoping. Injectable types
//! publish a declarative descriptor of their members instead of relying on
//! runtime reflection.
//!
//! ## Architecture
//!
//! ```text
//! Module::configure(&Binder)        Injector::get::<S>()
//! ──────────────────────────        ────────────────────
//! bind::<S>().to::<C>()        →    lookup Binding (type or name map)
//!   .in_scope(scope)                cached instance? return it
//!   .rank(n)                        else Instantiator::create
//!                                   publish into Binding   ← before injection
//!                                   Injection::execute     ← fields, hooks
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bindery::{implements, Binder, FnModule, Injectable, Injector, ServiceDescriptor};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "hello".into()
//!     }
//! }
//!
//! implements!(EnglishGreeter: dyn Greeter);
//!
//! impl Injectable for EnglishGreeter {
//!     fn descriptor() -> ServiceDescriptor {
//!         ServiceDescriptor::of::<EnglishGreeter>()
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector.binder().install(FnModule::new(|binder: &Binder| {
//!     binder.bind::<dyn Greeter>().to::<EnglishGreeter>();
//! }));
//! injector.bootstrap();
//!
//! let greeter: Arc<dyn Greeter> = injector.get::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```
//!
//! ## Cycle tolerance
//!
//! Mutually dependent singletons resolve because a constructed instance is
//! published into its binding before its own members are injected. Cycles
//! are tolerated, not detected; in debug builds, reading an injected member
//! before its owner finished construction logs a warning.

pub mod binder;
pub mod binding;
pub mod builder;
pub mod descriptor;
pub mod error;
mod injection;
pub mod injector;
pub mod instantiator;
pub mod module;
pub mod provider;
pub mod scope;

pub use binder::Binder;
pub use binding::{AnyHandle, Binding, BindingKey};
pub use builder::BindingBuilder;
pub use descriptor::{Dep, FieldDescriptor, Injectable, InterfaceOf, Service, ServiceDescriptor};
pub use error::{Error, Result};
pub use injector::{set_global, try_global, Injector, Resettable};
pub use instantiator::{CreatedInstance, Creation, CreationListener, Instantiator};
pub use module::{FnModule, Module};
pub use provider::Provider;
pub use scope::Scope;
