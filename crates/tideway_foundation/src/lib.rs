//! Core types for the Tideway stack machine.
//!
//! This crate provides:
//! - [`Value`] - The tagged value type held by the stack
//! - [`Token`] - The unevaluated token alphabet (macro bodies)
//! - [`StackContext`] - Captured execution context for save/restore
//! - [`Error`] - Error taxonomy for the execution core
//! - Persistent collections ([`TwVec`], [`TwSet`], [`TwMap`], [`TwOrdMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod context;
pub mod error;
pub mod token;
pub mod value;

pub use collections::{TwMap, TwOrdMap, TwSet, TwVec};
pub use context::{ContextAttributes, ExportSet, StackContext};
pub use error::{Error, ErrorKind};
pub use token::Token;
pub use value::{BackendHandle, Macro, Value};

/// Result type alias for Tideway operations.
pub type Result<T> = std::result::Result<T, Error>;
