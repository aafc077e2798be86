//! Integration tests for persistent collections
//!
//! Tests TwVec, TwSet, TwMap, TwOrdMap with structural sharing and
//! immutability.

use std::sync::Arc;
use tideway_foundation::{TwMap, TwOrdMap, TwSet, TwVec, Value};

// =============================================================================
// TwVec
// =============================================================================

#[test]
fn vector_empty() {
    let v: TwVec<Value> = TwVec::new();
    assert!(v.is_empty());
    assert_eq!(v.len(), 0);
}

#[test]
fn vector_push_back() {
    let v = TwVec::new();
    let v = v.push_back(Value::Long(1));
    let v = v.push_back(Value::Long(2));

    assert_eq!(v.len(), 2);
    assert_eq!(v.get(0), Some(&Value::Long(1)));
    assert_eq!(v.get(1), Some(&Value::Long(2)));
}

#[test]
fn vector_push_is_persistent() {
    let v1 = TwVec::new().push_back(Value::Long(1));
    let v2 = v1.push_back(Value::Long(2));

    // The original is untouched
    assert_eq!(v1.len(), 1);
    assert_eq!(v2.len(), 2);
}

#[test]
fn vector_pop_back() {
    let v = TwVec::new()
        .push_back(Value::Long(1))
        .push_back(Value::Long(2));
    let (v, popped) = v.pop_back().unwrap();
    assert_eq!(popped, Value::Long(2));
    assert_eq!(v.len(), 1);
}

#[test]
fn vector_from_iterator() {
    let v: TwVec<i64> = (0..5).collect();
    assert_eq!(v.len(), 5);
    assert_eq!(v.last(), Some(&4));
}

// =============================================================================
// TwSet
// =============================================================================

#[test]
fn set_insert_and_contains() {
    let s: TwSet<Arc<str>> = TwSet::new().insert("a".into()).insert("b".into());
    assert!(s.contains(&"a".into()));
    assert!(!s.contains(&"c".into()));
    assert_eq!(s.len(), 2);
}

#[test]
fn set_insert_is_persistent() {
    let s1: TwSet<Arc<str>> = TwSet::new().insert("a".into());
    let s2 = s1.insert("b".into());
    assert_eq!(s1.len(), 1);
    assert_eq!(s2.len(), 2);
}

// =============================================================================
// TwMap
// =============================================================================

#[test]
fn map_insert_and_get() {
    let m: TwMap<Arc<str>, Value> = TwMap::new().insert("x".into(), Value::Long(1));
    assert_eq!(m.get(&"x".into()), Some(&Value::Long(1)));
    assert_eq!(m.get(&"y".into()), None);
}

#[test]
fn map_insert_is_persistent() {
    let m1: TwMap<Arc<str>, Value> = TwMap::new().insert("x".into(), Value::Long(1));
    let m2 = m1.insert("x".into(), Value::Long(2));

    assert_eq!(m1.get(&"x".into()), Some(&Value::Long(1)));
    assert_eq!(m2.get(&"x".into()), Some(&Value::Long(2)));
}

#[test]
fn map_remove() {
    let m: TwMap<Arc<str>, Value> = TwMap::new().insert("x".into(), Value::Long(1));
    let m = m.remove(&"x".into());
    assert!(m.is_empty());
}

// =============================================================================
// TwOrdMap
// =============================================================================

#[test]
fn ord_map_preserves_insertion_order() {
    let m = TwOrdMap::new()
        .insert(Value::from("z"), Value::Long(1))
        .insert(Value::from("a"), Value::Long(2))
        .insert(Value::from("m"), Value::Long(3));

    let keys: Vec<String> = m.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["'z'", "'a'", "'m'"]);
}

#[test]
fn ord_map_overwrite_keeps_position() {
    let m = TwOrdMap::new()
        .insert(Value::from("a"), Value::Long(1))
        .insert(Value::from("b"), Value::Long(2))
        .insert(Value::from("a"), Value::Long(9));

    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&Value::from("a")), Some(&Value::Long(9)));
    let keys: Vec<String> = m.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["'a'", "'b'"]);
}
