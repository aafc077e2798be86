//! The symbol table: a flat mapping from names to values.
//!
//! One table is active per execution context. `store` overwrites, `load`
//! fails on absent names, and the persistent backing map makes `snapshot`
//! an O(1) independent copy.

use std::sync::Arc;

use tideway_foundation::{Error, Result, TwMap, Value};

/// Mutable mapping from symbol names to values.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    bindings: TwMap<Arc<str>, Value>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, overwriting any prior binding.
    pub fn store(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.bindings = self.bindings.insert(name.into(), value);
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    /// Fails with `UnboundSymbol` if the name has no binding.
    pub fn load(&self, name: &str) -> Result<Value> {
        self.bindings
            .get(&Arc::from(name))
            .cloned()
            .ok_or_else(|| Error::unbound_symbol(name))
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(&Arc::from(name))
    }

    /// Returns an independent copy of the bindings for context capture.
    #[must_use]
    pub fn snapshot(&self) -> TwMap<Arc<str>, Value> {
        self.bindings.clone()
    }

    /// Atomically discards current bindings and installs the given table.
    pub fn replace(&mut self, table: TwMap<Arc<str>, Value>) {
        self.bindings = table;
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.bindings.iter()
    }
}
