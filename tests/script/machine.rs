//! Integration tests for the stack machine.
//!
//! Exercises the evaluation loop, cost accounting, macro capture, early
//! termination, context save/restore, balance checking, and the export
//! protocol end to end.

use proptest::prelude::*;
use std::sync::Arc;
use tideway_foundation::{ErrorKind, Value};
use tideway_script::{standard_registry, Outcome, StackMachine};

fn machine() -> StackMachine {
    StackMachine::new(Arc::new(standard_registry()))
}

// =============================================================================
// Evaluation and Accounting
// =============================================================================

#[test]
fn sequential_fragments_share_state() {
    let mut m = machine();
    m.exec("1 2 +").unwrap();
    m.exec("10 *").unwrap();
    assert_eq!(m.stack(), &[Value::Long(30)]);
}

#[test]
fn ops_counts_every_evaluated_token() {
    let mut m = machine();
    m.exec("1 2 + 3 *").unwrap();
    assert_eq!(m.attributes().ops(), 5);
}

#[test]
fn ops_counts_the_failing_token() {
    let mut m = machine();
    assert!(m.exec("1 2 NO_SUCH_WORD").is_err());
    assert_eq!(m.attributes().ops(), 3);
}

#[test]
fn ops_accumulates_across_fragments() {
    let mut m = machine();
    m.exec("1").unwrap();
    m.exec("2").unwrap();
    assert_eq!(m.attributes().ops(), 2);
}

#[test]
fn first_error_aborts_the_fragment() {
    let mut m = machine();
    let err = m.exec("1 NO_SUCH_WORD 2 3").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownWord(_)));
    // Tokens after the failure were never evaluated
    assert_eq!(m.stack(), &[Value::Long(1)]);
    assert_eq!(m.attributes().ops(), 2);
}

// =============================================================================
// Early Termination
// =============================================================================

#[test]
fn stop_is_not_an_error() {
    let mut m = machine();
    let outcome = m.exec("1 2 STOP 3").unwrap();
    assert_eq!(outcome, Outcome::EarlyStopped);
    assert_eq!(m.stack(), &[Value::Long(1), Value::Long(2)]);
}

#[test]
fn stop_propagates_out_of_nested_macros() {
    let mut m = machine();
    let outcome = m.exec("<% <% STOP %> EVAL 9 %> EVAL 9").unwrap();
    assert_eq!(outcome, Outcome::EarlyStopped);
    assert_eq!(m.depth(), 0);
}

// =============================================================================
// Macro Capture
// =============================================================================

#[test]
fn capture_defers_evaluation() {
    let mut m = machine();
    m.exec("<% 1 NO_SUCH_WORD %>").unwrap();
    // Nothing inside the markers ran, including the bad word
    assert_eq!(m.depth(), 1);
    assert!(m.peek().unwrap().as_macro().is_some());
}

#[test]
fn nested_captures_preserve_inner_markers() {
    let mut m = machine();
    m.exec("<% <% 1 %> %> EVAL EVAL").unwrap();
    assert_eq!(m.pop().unwrap(), Value::Long(1));
}

#[test]
fn macro_is_a_first_class_value() {
    let mut m = machine();
    m.exec("<% 2 * %> 'double' STORE").unwrap();
    m.exec("21 'double' LOAD EVAL").unwrap();
    assert_eq!(m.pop().unwrap(), Value::Long(42));
}

// =============================================================================
// Context Save/Restore
// =============================================================================

#[test]
fn restore_rolls_back_stack_and_symbols() {
    let mut m = machine();
    m.exec("1 'x' STORE SAVE").unwrap();
    m.exec("2 'x' STORE 'y' EXPORT 10 20").unwrap();
    m.exec("DROP DROP RESTORE").unwrap();

    assert_eq!(m.load("x").unwrap(), Value::Long(1));
    assert_eq!(m.depth(), 0);
    // The export request was rolled back with the policy attributes
    assert!(m.attributes().exported().is_none());
}

#[test]
fn restore_does_not_roll_back_accounting() {
    let mut m = machine();
    m.exec("SAVE").unwrap();
    let ops_at_save = m.attributes().ops();
    m.exec("1 2 3 DROP DROP DROP").unwrap();
    m.exec("RESTORE").unwrap();
    assert!(m.attributes().ops() > ops_at_save);
}

#[test]
fn saved_context_is_not_aliased() {
    let mut m = machine();
    m.exec("1 'x' STORE SAVE").unwrap();
    let ctx = m.pop().unwrap();

    m.exec("99 'x' STORE").unwrap();
    m.push(ctx);
    m.exec("RESTORE").unwrap();
    assert_eq!(m.load("x").unwrap(), Value::Long(1));
}

// =============================================================================
// Balance and Export
// =============================================================================

#[test]
fn open_capture_is_unbalanced() {
    let mut m = machine();
    m.exec("<% 1 2").unwrap();
    assert!(matches!(
        m.check_balanced().unwrap_err().kind,
        ErrorKind::UnbalancedStack(_)
    ));
}

#[test]
fn capture_closed_across_fragments_is_balanced() {
    let mut m = machine();
    m.exec("<% 1").unwrap();
    m.exec("2 + %>").unwrap();
    m.check_balanced().unwrap();
    m.exec("EVAL").unwrap();
    assert_eq!(m.pop().unwrap(), Value::Long(3));
}

#[test]
fn expected_depth_mismatch_is_unbalanced() {
    let mut m = machine();
    m.expect_depth(2);
    m.exec("1 2 3").unwrap();
    assert!(m.check_balanced().is_err());
}

#[test]
fn export_map_lands_on_top() {
    let mut m = machine();
    m.exec("0 7 'a' STORE 'a' EXPORT").unwrap();
    assert!(m.apply_exports());

    let map = m.pop().unwrap();
    assert_eq!(
        map.as_map().unwrap().get(&Value::from("a")),
        Some(&Value::Long(7))
    );
    // Pre-existing stack content is beneath the export map
    assert_eq!(m.pop().unwrap(), Value::Long(0));
}

#[test]
fn export_all_includes_every_binding() {
    let mut m = machine();
    m.exec("1 'a' STORE 2 'b' STORE NULL EXPORT").unwrap();
    assert!(m.apply_exports());
    let map = m.pop().unwrap();
    assert_eq!(map.as_map().unwrap().len(), 2);
}

// =============================================================================
// Timings
// =============================================================================

#[test]
fn timings_samples_are_line_granular() {
    let mut m = machine();
    m.exec("TIMINGS").unwrap();
    m.exec("1 2 3 4 5").unwrap();
    m.exec("6").unwrap();
    // One sample per fragment since TIMINGS, not per token
    assert_eq!(m.attributes().elapsed().len(), 3);
}

#[test]
fn elapsed_samples_are_monotonic() {
    let mut m = machine();
    m.exec("TIMINGS").unwrap();
    m.exec("1").unwrap();
    m.exec("2").unwrap();
    let samples = m.attributes().elapsed();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn ops_equals_literal_count(values in prop::collection::vec(-1000i64..1000, 1..50)) {
        let fragment = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let mut m = machine();
        m.exec(&fragment).unwrap();
        prop_assert_eq!(m.attributes().ops(), values.len() as u64);
        prop_assert_eq!(m.depth(), values.len());
    }

    #[test]
    fn capture_restore_identity(values in prop::collection::vec(-1000i64..1000, 0..20)) {
        let mut m = machine();
        for v in &values {
            m.push(Value::Long(*v));
        }
        let ctx = m.capture();
        m.clear_stack();
        m.restore(&ctx);
        let expected: Vec<Value> = values.iter().map(|v| Value::Long(*v)).collect();
        prop_assert_eq!(m.stack(), expected.as_slice());
    }
}
