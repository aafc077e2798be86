//! Error types for the Tideway execution core.
//!
//! Uses `thiserror` for ergonomic error definition.

use thiserror::Error;

/// The main error type for Tideway operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional underlying cause, rendered after the message on the
    /// diagnostic path.
    pub cause: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, cause: None }
    }

    /// Attaches an underlying cause message.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Creates an unknown word error.
    #[must_use]
    pub fn unknown_word(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownWord(name.into()))
    }

    /// Creates an unbound symbol error.
    #[must_use]
    pub fn unbound_symbol(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundSymbol(name.into()))
    }

    /// Creates an empty stack error.
    ///
    /// This is the domain-level relabeling of a pop or peek against an
    /// empty stack; a raw underflow never escapes the machine.
    #[must_use]
    pub fn empty_stack() -> Self {
        Self::new(ErrorKind::EmptyStack)
    }

    /// Creates an unbalanced stack error.
    #[must_use]
    pub fn unbalanced(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnbalancedStack(detail.into()))
    }

    /// Creates an unknown attribute error.
    #[must_use]
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownAttribute(name.into()))
    }

    /// Creates a reserved attribute error.
    #[must_use]
    pub fn reserved_attribute(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReservedAttribute(name.into()))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an arithmetic error.
    #[must_use]
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arithmetic(message.into()))
    }

    /// Creates a backend failure error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Returns true for errors that indicate a bug in a word
    /// implementation rather than a user-facing condition.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownAttribute(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Token did not resolve against the word registry.
    #[error("unknown word '{0}'")]
    UnknownWord(String),

    /// `load` on a name with no binding.
    #[error("unbound symbol '{0}'")]
    UnboundSymbol(String),

    /// Pop or peek against an empty stack.
    #[error("empty stack")]
    EmptyStack,

    /// Post-execution balance invariant violated.
    #[error("unbalanced stack: {0}")]
    UnbalancedStack(String),

    /// Attribute name outside the well-known set. Programmer error in a
    /// word implementation, never a user-facing condition.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// Attempt to write a reserved attribute through the general
    /// dispatch path instead of a dedicated accessor.
    #[error("attribute '{0}' is reserved")]
    ReservedAttribute(String),

    /// A word was applied to the wrong kind of value.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected value kind.
        expected: &'static str,
        /// The actual value kind on the stack.
        actual: &'static str,
    },

    /// Arithmetic failure inside a word (division by zero, overflow).
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Failure reported by an external backend (storage, directory, geo).
    /// Never retried by the core.
    #[error("backend error: {0}")]
    Backend(String),

    /// Malformed script text (unterminated string, stray marker).
    #[error("syntax error: {0}")]
    Syntax(String),

    /// I/O failure (bootstrap source, console input).
    #[error("i/o error: {0}")]
    Io(String),
}
