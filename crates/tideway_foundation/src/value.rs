//! Core value type for the Tideway stack.
//!
//! Values are immutable and cheaply cloneable (O(1) for most variants).
//! Composite values use structural sharing via persistent collections, which
//! is what makes context capture a deep, independent copy at O(1) cost.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::collections::{TwOrdMap, TwVec};
use crate::context::StackContext;
use crate::token::Token;

/// Core value type for everything the stack can hold.
#[derive(Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit floating point.
    Double(f64),
    /// String value.
    String(Arc<str>),
    /// Raw byte buffer.
    Bytes(Arc<[u8]>),
    /// Ordered, heterogeneous list.
    List(TwVec<Value>),
    /// Key-ordered map (insertion order preserved).
    Map(TwOrdMap<Value, Value>),
    /// A captured, unevaluated token sequence, itself first-class.
    Macro(Macro),
    /// Opaque handle to an external backend resource.
    Handle(Arc<dyn BackendHandle>),
    /// A captured execution context (pushed by `SAVE`, consumed by `RESTORE`).
    Context(Arc<StackContext>),
}

/// A macro: an ordered sequence of unevaluated tokens.
///
/// Macros are captured between `<%` and `%>` markers and evaluated on demand
/// by the `EVAL` word. Cloning shares the token sequence.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Macro {
    tokens: Arc<Vec<Token>>,
}

impl Macro {
    /// Creates a macro from a token sequence.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }

    /// Returns the unevaluated tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the number of tokens in the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the macro body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<%")?;
        for token in self.tokens.iter() {
            write!(f, " {token}")?;
        }
        write!(f, " %>")
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Opaque reference to an external backend resource.
///
/// Backend clients (storage fetch cursors, directory iterators, geo indexes)
/// put their handles on the stack behind this trait; the execution core never
/// looks inside one.
pub trait BackendHandle: fmt::Debug + Send + Sync {
    /// A short label for the kind of resource, used in renderings.
    fn kind(&self) -> &str;
}

impl Value {
    /// Returns a short name for the value's variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Long(_) => "LONG",
            Self::Double(_) => "DOUBLE",
            Self::String(_) => "STRING",
            Self::Bytes(_) => "BYTES",
            Self::List(_) => "LIST",
            Self::Map(_) => "MAP",
            Self::Macro(_) => "MACRO",
            Self::Handle(_) => "HANDLE",
            Self::Context(_) => "CONTEXT",
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a list reference.
    #[must_use]
    pub const fn as_list(&self) -> Option<&TwVec<Value>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a map reference.
    #[must_use]
    pub const fn as_map(&self) -> Option<&TwOrdMap<Value, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Attempts to extract a macro.
    #[must_use]
    pub const fn as_macro(&self) -> Option<&Macro> {
        match self {
            Self::Macro(m) => Some(m),
            _ => None,
        }
    }

    /// Attempts to extract a captured context.
    #[must_use]
    pub const fn as_context(&self) -> Option<&Arc<StackContext>> {
        match self {
            Self::Context(c) => Some(c),
            _ => None,
        }
    }
}

// Float comparison is by bit pattern so that Eq and Hash stay consistent.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Macro(a), Self::Macro(b)) => a == b,
            (Self::Handle(a), Self::Handle(b)) => {
                std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
            }
            (Self::Context(a), Self::Context(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            Self::Long(n) => n.hash(state),
            Self::Double(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::List(v) => v.hash(state),
            Self::Map(m) => m.hash(state),
            Self::Macro(m) => m.hash(state),
            Self::Handle(h) => (Arc::as_ptr(h).cast::<()>() as usize).hash(state),
            Self::Context(c) => (Arc::as_ptr(c) as usize).hash(state),
        }
    }
}

impl PartialOrd for Value {
    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a.partial_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            // Cross-type numeric comparison intentionally loses precision for large i64
            (Self::Long(a), Self::Double(b)) => (*a as f64).partial_cmp(b),
            (Self::Double(a), Self::Long(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::Bytes(b) => {
                write!(f, "BYTES[{}]", b.len())
            }
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
            Self::Macro(m) => write!(f, "{m}"),
            Self::Handle(h) => write!(f, "HANDLE({})", h.kind()),
            Self::Context(_) => write!(f, "CONTEXT"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Long(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Macro> for Value {
    fn from(m: Macro) -> Self {
        Self::Macro(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
