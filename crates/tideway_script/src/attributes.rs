//! The attribute registry: well-known, typed bookkeeping slots.
//!
//! Attributes cover cross-cutting accounting (`elapsed`, `ops`), reporting
//! policy (`timings`, `debug.depth`, `exported.symbols`), and the execution
//! credential (`token`). Every attribute has a defined default. All of them
//! are reserved: the by-name `set` path refuses writes so a script cannot
//! forge a credential or inflate its own debug depth; mutation goes through
//! the typed accessors used by the evaluator and whitelisted words.

use std::sync::Arc;

use tideway_foundation::{ContextAttributes, Error, ExportSet, Result, Value};

/// Attribute name: ordered elapsed-time samples (nanoseconds).
pub const ATTR_ELAPSED: &str = "elapsed";
/// Attribute name: whether per-line elapsed samples are recorded.
pub const ATTR_TIMINGS: &str = "timings";
/// Attribute name: evaluated token counter.
pub const ATTR_OPS: &str = "ops";
/// Attribute name: diagnostic verbosity on failure.
pub const ATTR_DEBUG_DEPTH: &str = "debug.depth";
/// Attribute name: symbols requested for export.
pub const ATTR_EXPORTED_SYMBOLS: &str = "exported.symbols";
/// Attribute name: the execution credential.
pub const ATTR_TOKEN: &str = "token";

/// The unlimited debug depth sentinel. The depth saturates here rather
/// than wrapping.
pub const DEBUG_DEPTH_MAX: u32 = u32::MAX;

const ALL_ATTRIBUTES: [&str; 6] = [
    ATTR_ELAPSED,
    ATTR_TIMINGS,
    ATTR_OPS,
    ATTR_DEBUG_DEPTH,
    ATTR_EXPORTED_SYMBOLS,
    ATTR_TOKEN,
];

/// Typed registry of the well-known attributes.
#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    elapsed: Vec<u64>,
    timings: bool,
    ops: u64,
    debug_depth: u32,
    exported: Option<ExportSet>,
    token: Option<Arc<str>>,
}

impl AttributeRegistry {
    /// Creates a registry with every attribute at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an attribute by name as a [`Value`].
    ///
    /// # Errors
    /// Fails with `UnknownAttribute` for a name outside the well-known set;
    /// that is a bug in a word implementation, not a user condition.
    pub fn get(&self, name: &str) -> Result<Value> {
        match name {
            ATTR_ELAPSED => Ok(Value::List(
                self.elapsed
                    .iter()
                    .map(|&ns| Value::Long(i64::try_from(ns).unwrap_or(i64::MAX)))
                    .collect(),
            )),
            ATTR_TIMINGS => Ok(Value::Boolean(self.timings)),
            ATTR_OPS => Ok(Value::Long(i64::try_from(self.ops).unwrap_or(i64::MAX))),
            ATTR_DEBUG_DEPTH => Ok(Value::Long(i64::from(self.debug_depth))),
            ATTR_EXPORTED_SYMBOLS => Ok(match &self.exported {
                None => Value::Null,
                Some(set) if set.is_all() => Value::List([Value::Null].into_iter().collect()),
                Some(set) => Value::List(
                    set.names()
                        .map(|n| Value::String(Arc::clone(n)))
                        .collect(),
                ),
            }),
            ATTR_TOKEN => Ok(self
                .token
                .as_ref()
                .map_or(Value::Null, |t| Value::String(Arc::clone(t)))),
            other => Err(Error::unknown_attribute(other)),
        }
    }

    /// Writes an attribute by name.
    ///
    /// # Errors
    /// Every well-known attribute is reserved, so this always fails with
    /// `ReservedAttribute` for known names and `UnknownAttribute` otherwise.
    /// Words with legitimate access use the typed accessors instead.
    pub fn set(&mut self, name: &str, _value: &Value) -> Result<()> {
        if ALL_ATTRIBUTES.contains(&name) {
            Err(Error::reserved_attribute(name))
        } else {
            Err(Error::unknown_attribute(name))
        }
    }

    /// Resets an attribute to its default.
    ///
    /// # Errors
    /// Fails with `UnknownAttribute` for a name outside the well-known set.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        match name {
            ATTR_ELAPSED => self.elapsed.clear(),
            ATTR_TIMINGS => self.timings = false,
            ATTR_OPS => self.ops = 0,
            ATTR_DEBUG_DEPTH => self.debug_depth = 0,
            ATTR_EXPORTED_SYMBOLS => self.exported = None,
            ATTR_TOKEN => self.token = None,
            other => return Err(Error::unknown_attribute(other)),
        }
        Ok(())
    }

    // Typed accessors: the only mutation path, exposed to the evaluator
    // and to whitelisted words.

    /// The evaluated token count.
    #[must_use]
    pub const fn ops(&self) -> u64 {
        self.ops
    }

    /// Increments the token counter by one.
    pub fn increment_ops(&mut self) {
        self.ops += 1;
    }

    /// Whether per-line elapsed samples are recorded.
    #[must_use]
    pub const fn timings_enabled(&self) -> bool {
        self.timings
    }

    /// Enables or disables per-line elapsed samples.
    pub fn set_timings(&mut self, enabled: bool) {
        self.timings = enabled;
    }

    /// Appends an elapsed-time sample (nanoseconds since execution start).
    pub fn record_elapsed(&mut self, nanos: u64) {
        self.elapsed.push(nanos);
    }

    /// The recorded elapsed samples, in order.
    #[must_use]
    pub fn elapsed(&self) -> &[u64] {
        &self.elapsed
    }

    /// The diagnostic verbosity on failure.
    #[must_use]
    pub const fn debug_depth(&self) -> u32 {
        self.debug_depth
    }

    /// Sets the diagnostic verbosity.
    pub fn set_debug_depth(&mut self, depth: u32) {
        self.debug_depth = depth;
    }

    /// The export request, if the script made one.
    #[must_use]
    pub const fn exported(&self) -> Option<&ExportSet> {
        self.exported.as_ref()
    }

    /// Adds a name to the export request (`None` = export-all sentinel).
    pub fn export_symbol(&mut self, name: Option<Arc<str>>) {
        let set = self.exported.take().unwrap_or_default();
        self.exported = Some(set.insert(name));
    }

    /// The execution credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<&Arc<str>> {
        self.token.as_ref()
    }

    /// Installs the execution credential.
    pub fn set_token(&mut self, token: Option<Arc<str>>) {
        self.token = token;
    }

    /// True when a credential is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Captures the script-visible policy attributes for a context.
    #[must_use]
    pub fn context_subset(&self) -> ContextAttributes {
        ContextAttributes {
            timings: self.timings,
            debug_depth: self.debug_depth,
            exported: self.exported.clone(),
        }
    }

    /// Overwrites the policy attributes from a captured subset, leaving
    /// accounting state and the credential untouched.
    pub fn merge_context(&mut self, subset: &ContextAttributes) {
        self.timings = subset.timings;
        self.debug_depth = subset.debug_depth;
        self.exported = subset.exported.clone();
    }
}
