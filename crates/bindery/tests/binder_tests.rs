//! Binder and module integration tests

mod test_utils;

use std::sync::{Arc, Mutex};

use bindery::{Error, FnModule, Injector, Module, Scope};

use test_utils::{init_tracing, EnglishGreeter, Greeter, SpanishGreeter};

#[test]
fn modules_configure_in_install_order() {
    init_tracing();
    let injector = Injector::new();
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let first = {
        let trace = Arc::clone(&trace);
        FnModule::new(move |_binder| trace.lock().unwrap().push("first"))
    };
    let second = {
        let trace = Arc::clone(&trace);
        FnModule::new(move |_binder| trace.lock().unwrap().push("second"))
    };

    injector.binder().install(first);
    injector.binder().install(second);
    injector.bootstrap();

    assert_eq!(*trace.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn module_installed_during_configure_still_runs() {
    init_tracing();
    let injector = Injector::new();
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let late: Arc<dyn Module> = {
        let trace = Arc::clone(&trace);
        Arc::new(FnModule::new(move |_binder| {
            trace.lock().unwrap().push("late")
        }))
    };
    let early = {
        let trace = Arc::clone(&trace);
        FnModule::new(move |binder: &bindery::Binder| {
            trace.lock().unwrap().push("early");
            binder.install_arc(Arc::clone(&late));
        })
    };

    injector.binder().install(early);
    injector.bootstrap();

    assert_eq!(*trace.lock().unwrap(), vec!["early", "late"]);
}

#[test]
fn named_bindings_do_not_fall_back_to_type_map() {
    init_tracing();
    let injector = Injector::new();
    injector.binder().bind::<dyn Greeter>().to::<EnglishGreeter>();
    injector
        .binder()
        .bind_named::<dyn Greeter>("es")
        .to::<SpanishGreeter>();
    injector.bootstrap();

    let typed = injector.get::<dyn Greeter>().unwrap();
    assert_eq!(typed.greet(), "hello");

    let named = injector.get_named::<dyn Greeter>("es").unwrap();
    assert_eq!(named.greet(), "hola");

    // A type-keyed binding never satisfies a name-keyed lookup.
    let missing = injector.get_named::<dyn Greeter>("fr");
    assert!(matches!(missing, Err(Error::LookupFailed { .. })));
}

#[test]
fn rebinding_replaces_the_implementation() {
    init_tracing();
    let injector = Injector::new();
    injector
        .binder()
        .bind::<dyn Greeter>()
        .to::<EnglishGreeter>()
        .in_scope(Scope::Prototype);
    assert_eq!(injector.get::<dyn Greeter>().unwrap().greet(), "hello");

    injector.binder().bind::<dyn Greeter>().to::<SpanishGreeter>();
    assert_eq!(injector.get::<dyn Greeter>().unwrap().greet(), "hola");
}

#[test]
fn info_lists_every_binding() {
    init_tracing();
    let injector = Injector::new();
    injector.binder().bind::<dyn Greeter>().to::<EnglishGreeter>();
    injector
        .binder()
        .bind_named::<dyn Greeter>("es")
        .to::<SpanishGreeter>();

    let report = injector.info();
    assert!(report.starts_with("2 bindings:"));
    assert!(report.contains("\"es\""));
}
