//! Integration tests for Error types
//!
//! Tests error construction, display, cause chaining, and error kinds.

use tideway_foundation::{Error, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_word() {
    let err = Error::unknown_word("FROB");
    assert!(matches!(err.kind, ErrorKind::UnknownWord(_)));
    assert_eq!(err.to_string(), "unknown word 'FROB'");
}

#[test]
fn error_unbound_symbol() {
    let err = Error::unbound_symbol("x");
    assert!(matches!(err.kind, ErrorKind::UnboundSymbol(_)));
    assert!(err.to_string().contains("x"));
}

#[test]
fn error_empty_stack() {
    assert_eq!(Error::empty_stack().to_string(), "empty stack");
}

#[test]
fn error_unbalanced() {
    let err = Error::unbalanced("unterminated macro capture");
    assert_eq!(
        err.to_string(),
        "unbalanced stack: unterminated macro capture"
    );
}

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch("STRING", "LONG");
    assert_eq!(err.to_string(), "expected STRING, got LONG");
}

#[test]
fn error_reserved_attribute() {
    let err = Error::reserved_attribute("token");
    assert_eq!(err.to_string(), "attribute 'token' is reserved");
}

// =============================================================================
// Causes and Classification
// =============================================================================

#[test]
fn error_cause_is_carried() {
    let err = Error::backend("fetch failed").with_cause("connection reset");
    assert_eq!(err.cause.as_deref(), Some("connection reset"));
    // The message itself does not include the cause; the diagnostic path
    // appends it.
    assert_eq!(err.to_string(), "backend error: fetch failed");
}

#[test]
fn unknown_attribute_is_internal() {
    assert!(Error::unknown_attribute("bogus").is_internal());
    assert!(!Error::unknown_word("FROB").is_internal());
    assert!(!Error::reserved_attribute("ops").is_internal());
}
