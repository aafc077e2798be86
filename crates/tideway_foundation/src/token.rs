//! The unevaluated token alphabet.
//!
//! A [`Token`] is what the tokenizer produces and what a macro body stores.
//! Tokens are kept unevaluated inside a macro and are only applied against
//! the stack when the macro is evaluated.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A single script token.
#[derive(Clone)]
pub enum Token {
    /// Integer literal.
    Long(i64),
    /// Floating point literal.
    Double(f64),
    /// Boolean literal (`true` / `false`).
    Boolean(bool),
    /// The `NULL` literal.
    Null,
    /// Quoted string literal (quotes stripped, escapes resolved).
    Str(Arc<str>),
    /// Macro open marker (`<%`).
    MacroOpen,
    /// Macro close marker (`%>`).
    MacroClose,
    /// Symbol reference (`$name`); pushes the bound value when applied.
    LoadRef(Arc<str>),
    /// A name to resolve against the word registry.
    Name(Arc<str>),
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a == b,
            // Bit equality keeps Eq and Hash consistent (NaN == NaN)
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::MacroOpen, Self::MacroOpen) => true,
            (Self::MacroClose, Self::MacroClose) => true,
            (Self::LoadRef(a), Self::LoadRef(b)) => a == b,
            (Self::Name(a), Self::Name(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Long(n) => n.hash(state),
            Self::Double(n) => n.to_bits().hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Null | Self::MacroOpen | Self::MacroClose => {}
            Self::Str(s) => s.hash(state),
            Self::LoadRef(s) => s.hash(state),
            Self::Name(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => write!(f, "NULL"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::MacroOpen => write!(f, "<%"),
            Self::MacroClose => write!(f, "%>"),
            Self::LoadRef(s) => write!(f, "${s}"),
            Self::Name(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
