//! The Tideway script layer: tokenizer, word registry, and stack machine.
//!
//! A [`StackMachine`] evaluates whitespace-separated script fragments one at
//! a time. Each token is either a literal (pushed), a `$name` symbol
//! reference (loaded and pushed), a macro marker, or a word name resolved
//! against the shared [`WordRegistry`]. The machine tracks cost accounting
//! attributes, supports context capture/restore, and verifies the
//! stack-balance invariant after execution.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attributes;
pub mod machine;
pub mod symbols;
pub mod tokenize;
pub mod word;
pub mod words;

pub use attributes::{
    AttributeRegistry, ATTR_DEBUG_DEPTH, ATTR_ELAPSED, ATTR_EXPORTED_SYMBOLS, ATTR_OPS,
    ATTR_TIMINGS, ATTR_TOKEN, DEBUG_DEPTH_MAX,
};
pub use machine::{Outcome, StackMachine};
pub use symbols::SymbolTable;
pub use tokenize::tokenize;
pub use word::{Control, NativeWord, Word, WordRegistry};
pub use words::standard_registry;
