//! The interactive console.
//!
//! Feeds lines into a single long-lived [`StackMachine`] and prints the
//! stack after each one, top value first, the same order the serialized
//! response uses.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tideway_foundation::{Error, Result};
use tideway_script::{Outcome, StackMachine, WordRegistry};

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing so the console is testable without a
/// terminal.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    /// Fails if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Adds a line to history.
    fn add_history(&mut self, line: &str);
}

/// Line editor backed by rustyline.
pub struct RustylineEditor {
    editor: DefaultEditor,
}

impl RustylineEditor {
    /// Creates a rustyline-based editor.
    ///
    /// # Errors
    /// Fails if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| Error::io(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::io(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// The interactive console.
pub struct Console<E: LineEditor = RustylineEditor> {
    editor: E,
    machine: StackMachine,
    show_banner: bool,
    prompt: String,
}

impl Console<RustylineEditor> {
    /// Creates a console with the default rustyline editor.
    ///
    /// # Errors
    /// Fails if the editor fails to initialize.
    pub fn new(registry: Arc<WordRegistry>) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, registry))
    }
}

impl<E: LineEditor> Console<E> {
    /// Creates a console with the given editor.
    pub fn with_editor(editor: E, registry: Arc<WordRegistry>) -> Self {
        Self {
            editor,
            machine: StackMachine::new(registry),
            show_banner: true,
            prompt: "tw> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns a reference to the machine.
    #[must_use]
    pub const fn machine(&self) -> &StackMachine {
        &self.machine
    }

    /// Returns a mutable reference to the machine.
    pub const fn machine_mut(&mut self) -> &mut StackMachine {
        &mut self.machine
    }

    /// Runs the console loop.
    ///
    /// # Errors
    /// Fails if reading input fails fatally. Script errors are printed
    /// and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.editor.add_history(&line);
                    match self.eval(trimmed) {
                        Ok(Outcome::Completed) => self.print_stack(),
                        Ok(Outcome::EarlyStopped) => {
                            println!("(stopped)");
                            self.print_stack();
                        }
                        Err(e) => Self::print_error(&e),
                    }
                }
                ReadResult::Interrupted => {
                    println!();
                }
                ReadResult::Eof => break,
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Evaluates one line against the console's machine.
    ///
    /// # Errors
    /// Propagates script failures; the machine keeps its state.
    pub fn eval(&mut self, line: &str) -> Result<Outcome> {
        self.machine.exec(line)
    }

    /// Evaluates a whole file, line by line, stopping at the first
    /// failure or early termination.
    ///
    /// # Errors
    /// Fails if the file cannot be read or a line fails.
    pub fn eval_file(&mut self, path: &Path) -> Result<Outcome> {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read {}: {e}", path.display())))?;
        for line in source.lines() {
            if self.eval(line)? == Outcome::EarlyStopped {
                return Ok(Outcome::EarlyStopped);
            }
        }
        Ok(Outcome::Completed)
    }

    fn print_stack(&self) {
        let stack = self.machine.stack();
        if stack.is_empty() {
            println!("(empty stack)");
            return;
        }
        for (level, value) in stack.iter().rev().enumerate() {
            println!("{level}: {value}");
        }
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("Tideway console v{}", env!("CARGO_PKG_VERSION"));
        println!("Type script fragments to evaluate. Use Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}
