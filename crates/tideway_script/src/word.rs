//! Words: named operations resolved against a shared registry.
//!
//! A word consumes and produces stack values and may touch the symbol
//! table and (if whitelisted) the attribute registry. A word signals
//! deliberate early termination through [`Control::Stop`]; that channel is
//! distinct from the error channel and never treated as a fault.

use std::collections::HashMap;
use std::sync::Arc;

use tideway_foundation::Result;

use crate::machine::StackMachine;

/// Control signal returned by a successfully applied word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep evaluating.
    Continue,
    /// Early termination: stop consuming fragments, no error.
    Stop,
}

/// A named, registry-resolved operation.
pub trait Word: Send + Sync {
    /// Applies the word against the machine.
    ///
    /// # Errors
    /// Execution failures propagate to the caller and abort the current
    /// fragment.
    fn apply(&self, machine: &mut StackMachine) -> Result<Control>;
}

/// A word implemented as a plain Rust function.
///
/// The registry key is the word's only name; the wrapper carries nothing
/// but the implementation.
pub struct NativeWord {
    func: fn(&mut StackMachine) -> Result<Control>,
}

impl NativeWord {
    /// Wraps a native function as a word.
    #[must_use]
    pub fn new(func: fn(&mut StackMachine) -> Result<Control>) -> Self {
        Self { func }
    }
}

impl Word for NativeWord {
    fn apply(&self, machine: &mut StackMachine) -> Result<Control> {
        (self.func)(machine)
    }
}

/// Lookup table from word names to implementations.
///
/// Built once at startup, then shared read-only (`Arc`) by every machine.
#[derive(Default)]
pub struct WordRegistry {
    words: HashMap<&'static str, Arc<dyn Word>>,
}

impl WordRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a word under a name, replacing any previous entry.
    pub fn register(&mut self, name: &'static str, word: Arc<dyn Word>) {
        self.words.insert(name, word);
    }

    /// Registers a native function word.
    pub fn register_native(
        &mut self,
        name: &'static str,
        func: fn(&mut StackMachine) -> Result<Control>,
    ) {
        self.register(name, Arc::new(NativeWord::new(func)));
    }

    /// Resolves a name to its word, if registered.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Word>> {
        self.words.get(name).map(Arc::clone)
    }

    /// Returns the number of registered words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if no words are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
