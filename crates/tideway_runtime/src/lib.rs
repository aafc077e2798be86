//! The Tideway runtime layer: request execution, bootstrap, sinks, console.
//!
//! The [`Executor`] drives one [`tideway_script::StackMachine`] per request:
//! it installs the bootstrap context, pre-evaluates path parameters, feeds
//! body lines incrementally, runs the balance/export protocol, and routes
//! failures through the debug-depth-gated reporting path. Logging and
//! metrics go through injected sink traits, never globals.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bootstrap;
pub mod console;
pub mod exec;
pub mod serialize;
pub mod sink;

pub use bootstrap::{BootstrapManager, BootstrapProvider, NoBootstrap, StaticBootstrap};
pub use console::{Console, LineEditor, ReadResult, RustylineEditor};
pub use exec::{ExecFailure, ExecRequest, ExecResponse, Executor, BOOTSTRAP_SYMBOL};
pub use serialize::{stack_to_json, value_to_json};
pub use sink::{
    EventSink, ExecRecord, MetricsSink, NullEventSink, NullMetricsSink, TracingEventSink,
    TracingMetricsSink,
};
