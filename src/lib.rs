//! Tideway - Stack-based script execution engine
//!
//! This crate re-exports all layers of the Tideway system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: tideway_runtime    — Request executor, bootstrap, sinks, console
//! Layer 1: tideway_script     — Tokenizer, stack machine, word registry
//! Layer 0: tideway_foundation — Core types (Value, Token, Error, contexts)
//! ```

pub use tideway_foundation as foundation;
pub use tideway_runtime as runtime;
pub use tideway_script as script;
