//! The stack machine: evaluator, balance invariant, and export protocol.
//!
//! One machine is created per request and never shared. Evaluation is
//! strictly sequential: fragments arrive one at a time through [`StackMachine::exec`],
//! each fragment is tokenized and applied token by token, and the `ops`
//! counter is incremented once per evaluated token, unconditionally, so
//! operator budget policies stay enforceable.

use std::sync::Arc;
use std::time::Instant;

use tideway_foundation::error::ErrorKind;
use tideway_foundation::{
    Error, Macro, Result, StackContext, Token, TwOrdMap, TwVec, Value,
};

use crate::attributes::AttributeRegistry;
use crate::symbols::SymbolTable;
use crate::tokenize::tokenize;
use crate::word::{Control, WordRegistry};

/// How an execution finished.
///
/// Early termination is a deliberate stop signal raised from within a word;
/// it is not an error and takes the same completion path as normal
/// termination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every token of the fragment was evaluated.
    Completed,
    /// A word requested early termination; remaining fragments must not
    /// be consumed.
    EarlyStopped,
}

/// An open macro-capture scope.
struct MacroCapture {
    tokens: Vec<Token>,
    /// Nesting depth of `<%` markers seen inside this capture.
    depth: usize,
}

/// The stack machine.
pub struct StackMachine {
    stack: Vec<Value>,
    symbols: SymbolTable,
    attributes: AttributeRegistry,
    registry: Arc<WordRegistry>,
    capture: Option<MacroCapture>,
    expected_depth: Option<usize>,
    started: Instant,
}

impl StackMachine {
    /// Creates a fresh machine against a shared word registry.
    #[must_use]
    pub fn new(registry: Arc<WordRegistry>) -> Self {
        Self {
            stack: Vec::new(),
            symbols: SymbolTable::new(),
            attributes: AttributeRegistry::new(),
            registry,
            capture: None,
            expected_depth: None,
            started: Instant::now(),
        }
    }

    // ------------------------------------------------------------------
    // Stack access
    // ------------------------------------------------------------------

    /// Pushes a value.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pops the top value.
    ///
    /// # Errors
    /// Fails with the domain-level `EmptyStack` error on an empty stack;
    /// a raw underflow never escapes.
    pub fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or_else(Error::empty_stack)
    }

    /// Returns the top value without removing it.
    ///
    /// # Errors
    /// Fails with `EmptyStack` on an empty stack.
    pub fn peek(&self) -> Result<&Value> {
        self.stack.last().ok_or_else(Error::empty_stack)
    }

    /// Current stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The stack contents, bottom to top.
    #[must_use]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Removes every value from the stack.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    // ------------------------------------------------------------------
    // Collaborator access
    // ------------------------------------------------------------------

    /// The active symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Mutable access to the symbol table.
    pub const fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// The attribute registry.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeRegistry {
        &self.attributes
    }

    /// Mutable access to the attribute registry. Reserved for the
    /// evaluator, the request driver, and whitelisted words.
    pub const fn attributes_mut(&mut self) -> &mut AttributeRegistry {
        &mut self.attributes
    }

    /// Binds a name in the symbol table.
    pub fn store(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.symbols.store(name, value);
    }

    /// Loads a name from the symbol table.
    ///
    /// # Errors
    /// Fails with `UnboundSymbol` if the name has no binding.
    pub fn load(&self, name: &str) -> Result<Value> {
        self.symbols.load(name)
    }

    /// Nanoseconds elapsed since this machine was created.
    #[must_use]
    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Appends an elapsed-time sample relative to execution start.
    pub fn mark_elapsed(&mut self) {
        let nanos = self.elapsed_nanos();
        self.attributes.record_elapsed(nanos);
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Tokenizes and evaluates one script fragment.
    ///
    /// When the fragment completes (normally or by early termination) and
    /// the `timings` attribute is set, one elapsed sample is recorded —
    /// line granularity, not token granularity.
    ///
    /// # Errors
    /// The first failing token aborts the fragment; the error propagates
    /// with no retry.
    pub fn exec(&mut self, fragment: &str) -> Result<Outcome> {
        let tokens = tokenize(fragment)?;
        let outcome = self.exec_tokens(&tokens)?;
        if self.attributes.timings_enabled() {
            self.mark_elapsed();
        }
        Ok(outcome)
    }

    /// Evaluates a token sequence against the stack.
    ///
    /// # Errors
    /// Propagates the first token failure. The `ops` counter is
    /// incremented for the failing token as well.
    pub fn exec_tokens(&mut self, tokens: &[Token]) -> Result<Outcome> {
        for token in tokens {
            let step = self.apply_token(token);
            // Cost accounting is unconditional, including failed tokens
            self.attributes.increment_ops();
            match step? {
                Control::Continue => {}
                Control::Stop => return Ok(Outcome::EarlyStopped),
            }
        }
        Ok(Outcome::Completed)
    }

    /// Evaluates a macro body. Early termination inside the macro
    /// propagates as [`Control::Stop`].
    ///
    /// # Errors
    /// Propagates the first token failure from the body.
    pub fn eval_macro(&mut self, body: &Macro) -> Result<Control> {
        match self.exec_tokens(body.tokens())? {
            Outcome::EarlyStopped => Ok(Control::Stop),
            Outcome::Completed => Ok(Control::Continue),
        }
    }

    fn apply_token(&mut self, token: &Token) -> Result<Control> {
        // Inside an open capture scope every token is appended, not
        // evaluated; only the matching close marker ends the scope.
        if let Some(capture) = &mut self.capture {
            let closed = match token {
                Token::MacroOpen => {
                    capture.depth += 1;
                    capture.tokens.push(token.clone());
                    false
                }
                Token::MacroClose if capture.depth == 0 => true,
                Token::MacroClose => {
                    capture.depth -= 1;
                    capture.tokens.push(token.clone());
                    false
                }
                other => {
                    capture.tokens.push(other.clone());
                    false
                }
            };
            if closed {
                if let Some(finished) = self.capture.take() {
                    self.push(Value::Macro(Macro::new(finished.tokens)));
                }
            }
            return Ok(Control::Continue);
        }

        match token {
            Token::Long(n) => self.push(Value::Long(*n)),
            Token::Double(f) => self.push(Value::Double(*f)),
            Token::Boolean(b) => self.push(Value::Boolean(*b)),
            Token::Null => self.push(Value::Null),
            Token::Str(s) => self.push(Value::String(Arc::clone(s))),
            Token::MacroOpen => {
                self.capture = Some(MacroCapture {
                    tokens: Vec::new(),
                    depth: 0,
                });
            }
            Token::MacroClose => {
                return Err(Error::new(ErrorKind::Syntax(
                    "'%>' without matching '<%'".to_string(),
                )));
            }
            Token::LoadRef(name) => {
                let value = self.symbols.load(name)?;
                self.push(value);
            }
            Token::Name(name) => {
                let word = self
                    .registry
                    .resolve(name)
                    .ok_or_else(|| Error::unknown_word(name.as_ref()))?;
                return word.apply(self);
            }
        }
        Ok(Control::Continue)
    }

    // ------------------------------------------------------------------
    // Context save/restore
    // ------------------------------------------------------------------

    /// Captures a deep, independent snapshot of the execution context.
    #[must_use]
    pub fn capture(&self) -> StackContext {
        let stack: TwVec<Value> = self.stack.iter().cloned().collect();
        StackContext::new(stack, self.symbols.snapshot(), self.attributes.context_subset())
    }

    /// Reinstates a captured context: the live stack and symbol table are
    /// replaced, the captured attribute subset is merged.
    pub fn restore(&mut self, context: &StackContext) {
        self.stack = context.stack().iter().cloned().collect();
        self.symbols.replace(context.symbols().clone());
        self.attributes.merge_context(context.attributes());
    }

    // ------------------------------------------------------------------
    // Balance and export
    // ------------------------------------------------------------------

    /// Arms an expected final stack depth for [`StackMachine::check_balanced`].
    pub fn expect_depth(&mut self, depth: usize) {
        self.expected_depth = Some(depth);
    }

    /// Verifies the post-execution balance invariant.
    ///
    /// # Errors
    /// Fails with `UnbalancedStack` when a macro capture is still open or
    /// when an armed expected depth does not match the actual depth.
    pub fn check_balanced(&self) -> Result<()> {
        if self.capture.is_some() {
            return Err(Error::unbalanced("unterminated macro capture"));
        }
        if let Some(expected) = self.expected_depth {
            let actual = self.depth();
            if actual != expected {
                return Err(Error::unbalanced(format!(
                    "expected {expected} value(s) on the stack, found {actual}"
                )));
            }
        }
        Ok(())
    }

    /// Resolves the export request against the symbol table and pushes the
    /// resulting map as the final stack value.
    ///
    /// Returns true if a map was pushed. Symbols listed but not bound
    /// export as `NULL`; the export-all sentinel copies the whole table.
    pub fn apply_exports(&mut self) -> bool {
        let Some(set) = self.attributes.exported().cloned() else {
            return false;
        };
        if set.is_empty() {
            return false;
        }

        let mut exports: TwOrdMap<Value, Value> = TwOrdMap::new();
        if set.is_all() {
            for (name, value) in self.symbols.iter() {
                exports = exports.insert(Value::String(Arc::clone(name)), value.clone());
            }
        } else {
            for name in set.names() {
                let value = self
                    .symbols
                    .get(name)
                    .cloned()
                    .unwrap_or(Value::Null);
                exports = exports.insert(Value::String(Arc::clone(name)), value);
            }
        }

        self.push(Value::Map(exports));
        true
    }
}
