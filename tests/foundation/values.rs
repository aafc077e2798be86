//! Integration tests for Value types
//!
//! Tests Value enum variants, equality, hashing, display, and accessors.

use std::collections::HashSet;
use std::sync::Arc;
use tideway_foundation::{Macro, Token, TwOrdMap, TwVec, Value};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_null() {
    let v = Value::Null;
    assert!(v.is_null());
    assert_eq!(v.type_name(), "NULL");
}

#[test]
fn value_boolean() {
    assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
    assert_eq!(Value::Boolean(false).as_boolean(), Some(false));
}

#[test]
fn value_long() {
    let v = Value::Long(42);
    assert_eq!(v.as_long(), Some(42));
    assert_eq!(v.as_double(), None);
}

#[test]
fn value_double() {
    let v = Value::Double(1.5);
    assert_eq!(v.as_double(), Some(1.5));
    assert_eq!(v.as_long(), None);
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("hello"));
    assert_eq!(v.as_str(), Some("hello"));
}

#[test]
fn value_from_impls() {
    assert_eq!(Value::from(true), Value::Boolean(true));
    assert_eq!(Value::from(3i64), Value::Long(3));
    assert_eq!(Value::from(3i32), Value::Long(3));
    assert_eq!(Value::from(1.5), Value::Double(1.5));
    assert_eq!(Value::from("x"), Value::String(Arc::from("x")));
}

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn long_and_double_never_equal() {
    assert_ne!(Value::Long(1), Value::Double(1.0));
}

#[test]
fn double_equality_is_bit_pattern() {
    assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    assert_ne!(Value::Double(0.0), Value::Double(-0.0));
}

#[test]
fn values_usable_as_hash_keys() {
    let mut set = HashSet::new();
    set.insert(Value::Long(1));
    set.insert(Value::from("one"));
    set.insert(Value::Double(f64::NAN));
    assert!(set.contains(&Value::Long(1)));
    assert!(set.contains(&Value::Double(f64::NAN)));
    assert!(!set.contains(&Value::Long(2)));
}

#[test]
fn list_equality_is_structural() {
    let a: TwVec<Value> = [Value::Long(1), Value::Long(2)].into_iter().collect();
    let b: TwVec<Value> = [Value::Long(1), Value::Long(2)].into_iter().collect();
    assert_eq!(Value::List(a), Value::List(b));
}

// =============================================================================
// Composite Values
// =============================================================================

#[test]
fn map_accessor() {
    let map: TwOrdMap<Value, Value> =
        TwOrdMap::new().insert(Value::from("k"), Value::Long(1));
    let v = Value::Map(map);
    assert_eq!(
        v.as_map().unwrap().get(&Value::from("k")),
        Some(&Value::Long(1))
    );
}

#[test]
fn macro_holds_tokens() {
    let body = Macro::new(vec![Token::Long(1), Token::Long(2), Token::Name("+".into())]);
    assert_eq!(body.len(), 3);
    let v = Value::Macro(body);
    assert!(v.as_macro().is_some());
    assert_eq!(v.type_name(), "MACRO");
}

#[test]
fn macro_display_shows_markers() {
    let body = Macro::new(vec![Token::Long(1), Token::Name("DUP".into())]);
    assert_eq!(body.to_string(), "<% 1 DUP %>");
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_scalars() {
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::Long(7).to_string(), "7");
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::from("hi").to_string(), "'hi'");
}
