//! Captured execution contexts.
//!
//! A [`StackContext`] is a deep, independent snapshot of a machine's stack,
//! symbol table, and script-visible policy attributes. Because every
//! component uses structural sharing, capture is O(1) and mutating the live
//! machine afterwards cannot affect the snapshot.

use std::sync::Arc;

use crate::collections::{TwMap, TwSet, TwVec};
use crate::value::Value;

/// The set of symbols a script has asked to export.
///
/// The export-all sentinel (requested by exporting `NULL`) copies the whole
/// symbol table regardless of any explicitly listed names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSet {
    all: bool,
    names: TwSet<Arc<str>>,
}

impl ExportSet {
    /// Creates an empty export set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the export-all sentinel.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all: true,
            names: TwSet::new(),
        }
    }

    /// Creates an export set from explicit names.
    pub fn from_names<I: IntoIterator<Item = Arc<str>>>(names: I) -> Self {
        Self {
            all: false,
            names: names.into_iter().collect(),
        }
    }

    /// Adds a name, or switches to export-all when given `None`.
    #[must_use]
    pub fn insert(&self, name: Option<Arc<str>>) -> Self {
        match name {
            None => Self {
                all: true,
                names: self.names.clone(),
            },
            Some(name) => Self {
                all: self.all,
                names: self.names.insert(name),
            },
        }
    }

    /// Returns true if the export-all sentinel is set.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.all
    }

    /// Returns true if nothing would be exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.all && self.names.is_empty()
    }

    /// Returns the explicitly listed names.
    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.names.iter()
    }
}

/// The script-visible policy attributes captured into a context.
///
/// Accounting state (`ops`, `elapsed`) and the credential (`token`) are
/// deliberately not part of a context: restoring a save-point must not roll
/// back cost accounting or grant authentication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextAttributes {
    /// The `timings` flag.
    pub timings: bool,
    /// The `debug.depth` level.
    pub debug_depth: u32,
    /// The `exported.symbols` request, if any.
    pub exported: Option<ExportSet>,
}

/// A captured execution context: stack, symbols, and policy attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackContext {
    stack: TwVec<Value>,
    symbols: TwMap<Arc<str>, Value>,
    attributes: ContextAttributes,
}

impl StackContext {
    /// Creates a context from its parts.
    #[must_use]
    pub fn new(
        stack: TwVec<Value>,
        symbols: TwMap<Arc<str>, Value>,
        attributes: ContextAttributes,
    ) -> Self {
        Self {
            stack,
            symbols,
            attributes,
        }
    }

    /// The captured stack, bottom to top.
    #[must_use]
    pub const fn stack(&self) -> &TwVec<Value> {
        &self.stack
    }

    /// The captured symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &TwMap<Arc<str>, Value> {
        &self.symbols
    }

    /// The captured attribute subset.
    #[must_use]
    pub const fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }
}
