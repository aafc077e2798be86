//! The shipped word set.
//!
//! The full data-manipulation library lives outside the execution core;
//! these words are the ones the core protocols need: stack manipulation,
//! basic arithmetic, symbol binding, macro evaluation, early termination,
//! context save-points, and the whitelisted writers of reserved attributes
//! (`EXPORT`, `TIMINGS`/`NOTIMINGS`, `DEBUG*`).

use std::sync::Arc;

use tideway_foundation::{Error, Result, Value};

use crate::attributes::DEBUG_DEPTH_MAX;
use crate::machine::{Outcome, StackMachine};
use crate::word::{Control, WordRegistry};

/// Builds the registry of standard words.
///
/// The registry is built once at startup and shared read-only by every
/// machine.
#[must_use]
pub fn standard_registry() -> WordRegistry {
    let mut registry = WordRegistry::new();

    // Stack manipulation
    registry.register_native("DROP", word_drop);
    registry.register_native("DUP", word_dup);
    registry.register_native("SWAP", word_swap);
    registry.register_native("DEPTH", word_depth);
    registry.register_native("CLEAR", word_clear);

    // Arithmetic
    registry.register_native("+", word_add);
    registry.register_native("-", word_sub);
    registry.register_native("*", word_mul);
    registry.register_native("/", word_div);

    // Symbols
    registry.register_native("STORE", word_store);
    registry.register_native("LOAD", word_load);

    // Macros and control
    registry.register_native("EVAL", word_eval);
    registry.register_native("STOP", word_stop);

    // Context save-points
    registry.register_native("SAVE", word_save);
    registry.register_native("RESTORE", word_restore);

    // Whitelisted reserved-attribute writers
    registry.register_native("EXPORT", word_export);
    registry.register_native("TIMINGS", word_timings);
    registry.register_native("NOTIMINGS", word_notimings);
    registry.register_native("DEBUG", word_debug);
    registry.register_native("DEBUGON", word_debugon);
    registry.register_native("DEBUGOFF", word_debugoff);

    // Accounting
    registry.register_native("OPS", word_ops);

    registry
}

fn word_drop(machine: &mut StackMachine) -> Result<Control> {
    machine.pop()?;
    Ok(Control::Continue)
}

fn word_dup(machine: &mut StackMachine) -> Result<Control> {
    let top = machine.peek()?.clone();
    machine.push(top);
    Ok(Control::Continue)
}

fn word_swap(machine: &mut StackMachine) -> Result<Control> {
    let a = machine.pop()?;
    let b = machine.pop()?;
    machine.push(a);
    machine.push(b);
    Ok(Control::Continue)
}

#[allow(clippy::cast_possible_wrap)]
fn word_depth(machine: &mut StackMachine) -> Result<Control> {
    let depth = machine.depth() as i64;
    machine.push(Value::Long(depth));
    Ok(Control::Continue)
}

fn word_clear(machine: &mut StackMachine) -> Result<Control> {
    machine.clear_stack();
    Ok(Control::Continue)
}

// Long op Long stays Long; any Double promotes to Double. `+` also
// concatenates strings.
#[allow(clippy::cast_precision_loss)]
fn word_add(machine: &mut StackMachine) -> Result<Control> {
    let b = machine.pop()?;
    let a = machine.pop()?;
    let result = match (&a, &b) {
        (Value::Long(x), Value::Long(y)) => Value::Long(x.wrapping_add(*y)),
        (Value::Long(x), Value::Double(y)) => Value::Double(*x as f64 + y),
        (Value::Double(x), Value::Long(y)) => Value::Double(x + *y as f64),
        (Value::Double(x), Value::Double(y)) => Value::Double(x + y),
        (Value::String(x), Value::String(y)) => Value::String(format!("{x}{y}").into()),
        _ => return Err(Error::type_mismatch("LONG or DOUBLE", b.type_name())),
    };
    machine.push(result);
    Ok(Control::Continue)
}

#[allow(clippy::cast_precision_loss)]
fn word_sub(machine: &mut StackMachine) -> Result<Control> {
    let b = machine.pop()?;
    let a = machine.pop()?;
    let result = match (&a, &b) {
        (Value::Long(x), Value::Long(y)) => Value::Long(x.wrapping_sub(*y)),
        (Value::Long(x), Value::Double(y)) => Value::Double(*x as f64 - y),
        (Value::Double(x), Value::Long(y)) => Value::Double(x - *y as f64),
        (Value::Double(x), Value::Double(y)) => Value::Double(x - y),
        _ => return Err(Error::type_mismatch("LONG or DOUBLE", b.type_name())),
    };
    machine.push(result);
    Ok(Control::Continue)
}

#[allow(clippy::cast_precision_loss)]
fn word_mul(machine: &mut StackMachine) -> Result<Control> {
    let b = machine.pop()?;
    let a = machine.pop()?;
    let result = match (&a, &b) {
        (Value::Long(x), Value::Long(y)) => Value::Long(x.wrapping_mul(*y)),
        (Value::Long(x), Value::Double(y)) => Value::Double(*x as f64 * y),
        (Value::Double(x), Value::Long(y)) => Value::Double(x * *y as f64),
        (Value::Double(x), Value::Double(y)) => Value::Double(x * y),
        _ => return Err(Error::type_mismatch("LONG or DOUBLE", b.type_name())),
    };
    machine.push(result);
    Ok(Control::Continue)
}

#[allow(clippy::cast_precision_loss)]
fn word_div(machine: &mut StackMachine) -> Result<Control> {
    let b = machine.pop()?;
    let a = machine.pop()?;
    let result = match (&a, &b) {
        (Value::Long(_), Value::Long(0)) => {
            return Err(Error::arithmetic("division by zero"));
        }
        // checked_div also catches i64::MIN / -1
        (Value::Long(x), Value::Long(y)) => Value::Long(
            x.checked_div(*y)
                .ok_or_else(|| Error::arithmetic("division overflow"))?,
        ),
        (Value::Long(x), Value::Double(y)) => Value::Double(*x as f64 / y),
        (Value::Double(x), Value::Long(y)) => Value::Double(x / *y as f64),
        (Value::Double(x), Value::Double(y)) => Value::Double(x / y),
        _ => return Err(Error::type_mismatch("LONG or DOUBLE", b.type_name())),
    };
    machine.push(result);
    Ok(Control::Continue)
}

// value 'name' STORE
fn word_store(machine: &mut StackMachine) -> Result<Control> {
    let name = machine.pop()?;
    let value = machine.pop()?;
    match name {
        Value::String(name) => {
            machine.store(name, value);
            Ok(Control::Continue)
        }
        other => Err(Error::type_mismatch("STRING", other.type_name())),
    }
}

// 'name' LOAD
fn word_load(machine: &mut StackMachine) -> Result<Control> {
    let name = machine.pop()?;
    match name {
        Value::String(name) => {
            let value = machine.load(&name)?;
            machine.push(value);
            Ok(Control::Continue)
        }
        other => Err(Error::type_mismatch("STRING", other.type_name())),
    }
}

// Evaluates a macro body, or a string as a script fragment.
fn word_eval(machine: &mut StackMachine) -> Result<Control> {
    let target = machine.pop()?;
    match target {
        Value::Macro(body) => machine.eval_macro(&body),
        Value::String(script) => match machine.exec(&script)? {
            Outcome::EarlyStopped => Ok(Control::Stop),
            Outcome::Completed => Ok(Control::Continue),
        },
        other => Err(Error::type_mismatch("MACRO", other.type_name())),
    }
}

fn word_stop(_machine: &mut StackMachine) -> Result<Control> {
    Ok(Control::Stop)
}

fn word_save(machine: &mut StackMachine) -> Result<Control> {
    let context = machine.capture();
    machine.push(Value::Context(Arc::new(context)));
    Ok(Control::Continue)
}

// Restoring NULL is a no-op, not a failure.
fn word_restore(machine: &mut StackMachine) -> Result<Control> {
    let target = machine.pop()?;
    match target {
        Value::Context(context) => {
            machine.restore(&context);
            Ok(Control::Continue)
        }
        Value::Null => Ok(Control::Continue),
        other => Err(Error::type_mismatch("CONTEXT", other.type_name())),
    }
}

// 'name' EXPORT adds one symbol; NULL EXPORT requests export-all.
fn word_export(machine: &mut StackMachine) -> Result<Control> {
    let name = machine.pop()?;
    match name {
        Value::String(name) => {
            machine.attributes_mut().export_symbol(Some(name));
            Ok(Control::Continue)
        }
        Value::Null => {
            machine.attributes_mut().export_symbol(None);
            Ok(Control::Continue)
        }
        other => Err(Error::type_mismatch("STRING or NULL", other.type_name())),
    }
}

fn word_timings(machine: &mut StackMachine) -> Result<Control> {
    machine.attributes_mut().set_timings(true);
    Ok(Control::Continue)
}

fn word_notimings(machine: &mut StackMachine) -> Result<Control> {
    machine.attributes_mut().set_timings(false);
    Ok(Control::Continue)
}

// n DEBUG sets the diagnostic depth, saturating into the sentinel range.
fn word_debug(machine: &mut StackMachine) -> Result<Control> {
    let level = machine.pop()?;
    match level {
        Value::Long(n) => {
            let depth = u32::try_from(n.max(0)).unwrap_or(DEBUG_DEPTH_MAX);
            machine.attributes_mut().set_debug_depth(depth);
            Ok(Control::Continue)
        }
        other => Err(Error::type_mismatch("LONG", other.type_name())),
    }
}

fn word_debugon(machine: &mut StackMachine) -> Result<Control> {
    machine.attributes_mut().set_debug_depth(DEBUG_DEPTH_MAX);
    Ok(Control::Continue)
}

fn word_debugoff(machine: &mut StackMachine) -> Result<Control> {
    machine.attributes_mut().set_debug_depth(0);
    Ok(Control::Continue)
}

fn word_ops(machine: &mut StackMachine) -> Result<Control> {
    let ops = i64::try_from(machine.attributes().ops()).unwrap_or(i64::MAX);
    machine.push(Value::Long(ops));
    Ok(Control::Continue)
}
