//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bindery::{
    implements, Dep, FieldDescriptor, Injectable, Provider, ServiceDescriptor,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bindery=debug")
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Interface with two implementations, for named-binding tests
// ---------------------------------------------------------------------------

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Default)]
pub struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self) -> String {
        "hello".into()
    }
}

implements!(EnglishGreeter: dyn Greeter);

impl Injectable for EnglishGreeter {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<EnglishGreeter>()
    }
}

#[derive(Default)]
pub struct SpanishGreeter;

impl Greeter for SpanishGreeter {
    fn greet(&self) -> String {
        "hola".into()
    }
}

implements!(SpanishGreeter: dyn Greeter);

impl Injectable for SpanishGreeter {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<SpanishGreeter>()
    }
}

/// Member resolved against a named binding instead of the type map.
#[derive(Default)]
pub struct BilingualSign {
    pub secondary: Dep<dyn Greeter>,
}

impl Injectable for BilingualSign {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<BilingualSign>().field(
            FieldDescriptor::direct::<BilingualSign, dyn Greeter>("secondary", |s| &s.secondary)
                .named("es"),
        )
    }
}

// ---------------------------------------------------------------------------
// Bootstrap-order recording
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct BootRecorder {
    order: Mutex<Vec<&'static str>>,
    hooks: AtomicUsize,
}

impl BootRecorder {
    pub fn record(&self, who: &'static str) {
        self.order.lock().unwrap().push(who);
        self.hooks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().unwrap().clone()
    }

    pub fn hook_runs(&self) -> usize {
        self.hooks.load(Ordering::SeqCst)
    }
}

macro_rules! boot_service {
    ($name:ident, $label:literal) => {
        #[derive(Default)]
        pub struct $name {
            pub recorder: Dep<BootRecorder>,
        }

        impl $name {
            fn on_ready(&self) {
                if let Some(recorder) = self.recorder.get() {
                    recorder.record($label);
                }
            }
        }

        impl Injectable for $name {
            fn descriptor() -> ServiceDescriptor {
                ServiceDescriptor::of::<$name>()
                    .field(FieldDescriptor::direct::<$name, BootRecorder>(
                        "recorder",
                        |s| &s.recorder,
                    ))
                    .post_construct("on_ready", $name::on_ready)
            }
        }
    };
}

boot_service!(AudioBoot, "audio");
boot_service!(GridBoot, "grid");
boot_service!(UiBoot, "ui");

/// Eager singleton whose constructor always fails.
pub struct FailingBoot;

impl Injectable for FailingBoot {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new::<FailingBoot, _>(|| {
            Err(bindery::Error::construction_failed("FailingBoot", "boom"))
        })
    }
}

// ---------------------------------------------------------------------------
// Mutually dependent singletons
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct GridModel {
    pub view: Dep<GridView>,
}

impl Injectable for GridModel {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<GridModel>().field(FieldDescriptor::direct::<GridModel, GridView>(
            "view",
            |m| &m.view,
        ))
    }
}

#[derive(Default)]
pub struct GridView {
    pub model: Dep<GridModel>,
}

impl Injectable for GridView {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<GridView>().field(FieldDescriptor::direct::<GridView, GridModel>(
            "model",
            |v| &v.model,
        ))
    }
}

// ---------------------------------------------------------------------------
// Partial wiring: one bound member, one unbound
// ---------------------------------------------------------------------------

pub trait Telemetry: Send + Sync {}

#[derive(Default)]
pub struct PartialWiring {
    pub telemetry: Dep<dyn Telemetry>,
    pub greeter: Dep<dyn Greeter>,
}

impl Injectable for PartialWiring {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<PartialWiring>()
            .field(FieldDescriptor::direct::<PartialWiring, dyn Telemetry>(
                "telemetry",
                |p| &p.telemetry,
            ))
            .field(FieldDescriptor::direct::<PartialWiring, dyn Greeter>(
                "greeter",
                |p| &p.greeter,
            ))
    }
}

// ---------------------------------------------------------------------------
// Prototype service and provider holders
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Cursor;

impl Injectable for Cursor {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<Cursor>()
    }
}

#[derive(Default)]
pub struct DeferredGreeting {
    pub greeter: Provider<dyn Greeter>,
}

impl Injectable for DeferredGreeting {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<DeferredGreeting>().field(FieldDescriptor::provider::<
            DeferredGreeting,
            dyn Greeter,
        >("greeter", |d| &d.greeter))
    }
}

#[derive(Default)]
pub struct CursorSpawner {
    pub cursor: Provider<Cursor>,
}

impl Injectable for CursorSpawner {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<CursorSpawner>().field(FieldDescriptor::provider::<
            CursorSpawner,
            Cursor,
        >("cursor", |s| &s.cursor))
    }
}

#[derive(Default)]
pub struct DeferredTelemetry {
    pub telemetry: Provider<dyn Telemetry>,
}

impl Injectable for DeferredTelemetry {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<DeferredTelemetry>().field(FieldDescriptor::provider::<
            DeferredTelemetry,
            dyn Telemetry,
        >("telemetry", |d| &d.telemetry))
    }
}

// ---------------------------------------------------------------------------
// Contextual service: attaches to a named container
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct BoardOverlay;

impl Injectable for BoardOverlay {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<BoardOverlay>().in_context("board")
    }
}

/// Contextual service with an injected member and a post-construct hook.
#[derive(Default)]
pub struct BoardWidget {
    pub recorder: Dep<BootRecorder>,
}

impl BoardWidget {
    fn on_ready(&self) {
        if let Some(recorder) = self.recorder.get() {
            recorder.record("board-widget");
        }
    }
}

impl Injectable for BoardWidget {
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::of::<BoardWidget>()
            .in_context("board")
            .field(FieldDescriptor::direct::<BoardWidget, BootRecorder>(
                "recorder",
                |w| &w.recorder,
            ))
            .post_construct("on_ready", BoardWidget::on_ready)
    }
}
