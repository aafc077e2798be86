//! Integration tests for the attribute registry.

use std::sync::Arc;
use tideway_foundation::{ErrorKind, TwVec, Value};
use tideway_script::{
    standard_registry, AttributeRegistry, StackMachine, ATTR_DEBUG_DEPTH, ATTR_ELAPSED,
    ATTR_EXPORTED_SYMBOLS, ATTR_OPS, ATTR_TIMINGS, ATTR_TOKEN,
};

// =============================================================================
// Defaults and Typed Reads
// =============================================================================

#[test]
fn every_attribute_has_a_default() {
    let attrs = AttributeRegistry::new();
    assert_eq!(attrs.get(ATTR_ELAPSED).unwrap(), Value::List(TwVec::new()));
    assert_eq!(attrs.get(ATTR_TIMINGS).unwrap(), Value::Boolean(false));
    assert_eq!(attrs.get(ATTR_OPS).unwrap(), Value::Long(0));
    assert_eq!(attrs.get(ATTR_DEBUG_DEPTH).unwrap(), Value::Long(0));
    assert_eq!(attrs.get(ATTR_EXPORTED_SYMBOLS).unwrap(), Value::Null);
    assert_eq!(attrs.get(ATTR_TOKEN).unwrap(), Value::Null);
}

#[test]
fn unknown_name_is_an_internal_error() {
    let attrs = AttributeRegistry::new();
    let err = attrs.get("not.an.attribute").unwrap_err();
    assert!(err.is_internal());
}

// =============================================================================
// Reservation
// =============================================================================

#[test]
fn generic_set_refuses_every_reserved_name() {
    let mut attrs = AttributeRegistry::new();
    for name in [
        ATTR_ELAPSED,
        ATTR_TIMINGS,
        ATTR_OPS,
        ATTR_DEBUG_DEPTH,
        ATTR_EXPORTED_SYMBOLS,
        ATTR_TOKEN,
    ] {
        let err = attrs.set(name, &Value::Long(1)).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::ReservedAttribute(_)),
            "{name} was not refused"
        );
    }
}

#[test]
fn refused_write_leaves_state_untouched() {
    let mut attrs = AttributeRegistry::new();
    let _ = attrs.set(ATTR_TOKEN, &Value::from("forged"));
    assert!(!attrs.is_authenticated());
    let _ = attrs.set(ATTR_OPS, &Value::Long(1_000_000));
    assert_eq!(attrs.ops(), 0);
}

// =============================================================================
// Credential
// =============================================================================

#[test]
fn token_accessor_controls_authentication() {
    let mut attrs = AttributeRegistry::new();
    assert!(!attrs.is_authenticated());
    attrs.set_token(Some("secret".into()));
    assert!(attrs.is_authenticated());
    assert_eq!(attrs.get(ATTR_TOKEN).unwrap(), Value::from("secret"));
    attrs.set_token(None);
    assert!(!attrs.is_authenticated());
}

// =============================================================================
// Context Subset
// =============================================================================

#[test]
fn context_subset_carries_policy_only() {
    let mut attrs = AttributeRegistry::new();
    attrs.set_timings(true);
    attrs.set_debug_depth(4);
    attrs.export_symbol(Some("a".into()));
    attrs.increment_ops();
    attrs.record_elapsed(123);
    attrs.set_token(Some("secret".into()));

    let subset = attrs.context_subset();
    assert!(subset.timings);
    assert_eq!(subset.debug_depth, 4);
    assert!(subset.exported.is_some());

    let mut fresh = AttributeRegistry::new();
    fresh.merge_context(&subset);
    assert!(fresh.timings_enabled());
    assert_eq!(fresh.debug_depth(), 4);
    assert_eq!(fresh.ops(), 0);
    assert!(fresh.elapsed().is_empty());
    assert!(!fresh.is_authenticated());
}

// =============================================================================
// Through the Machine
// =============================================================================

#[test]
fn script_cannot_forge_a_credential() {
    // No shipped word writes the token attribute; the only path is the
    // typed accessor used by the request driver.
    let mut m = StackMachine::new(Arc::new(standard_registry()));
    m.exec("'t' EXPORT TIMINGS DEBUGON").unwrap();
    assert!(!m.attributes().is_authenticated());
}

#[test]
fn elapsed_renders_as_long_list() {
    let mut m = StackMachine::new(Arc::new(standard_registry()));
    m.exec("TIMINGS").unwrap();
    m.exec("1").unwrap();
    let rendered = m.attributes().get(ATTR_ELAPSED).unwrap();
    let list = rendered.as_list().unwrap();
    // The flag is live by the end of the TIMINGS fragment, so that
    // fragment records a sample too
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|v| matches!(v, Value::Long(_))));
}
