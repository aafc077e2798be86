//! Tokenizer for script fragments.
//!
//! The grammar is whitespace-separated: a token is a literal (number,
//! quoted text, `true`/`false`/`NULL`), a `$name` symbol reference, a macro
//! marker (`<%` / `%>`), or a bare name to resolve against the word
//! registry. `//` starts a comment running to the end of the fragment.

use std::sync::Arc;

use tideway_foundation::error::ErrorKind;
use tideway_foundation::{Error, Result, Token};

/// Tokenizer over a single script fragment.
pub struct Tokenizer<'src> {
    /// Remaining source text.
    rest: &'src str,
}

impl<'src> Tokenizer<'src> {
    /// Creates a tokenizer for the given fragment.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self { rest: source }
    }

    /// Returns the next token, or `None` at the end of the fragment.
    ///
    /// # Errors
    /// Fails with a syntax error on an unterminated string literal.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.rest = self.rest.trim_start();

        if self.rest.is_empty() || self.rest.starts_with("//") {
            return Ok(None);
        }

        if self.rest.starts_with('\'') || self.rest.starts_with('"') {
            return self.scan_string().map(Some);
        }

        // Bare token: everything up to the next whitespace
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let raw = &self.rest[..end];
        self.rest = &self.rest[end..];

        Ok(Some(classify(raw)))
    }

    /// Scans a quoted string literal, resolving backslash escapes.
    fn scan_string(&mut self) -> Result<Token> {
        let mut chars = self.rest.char_indices();
        let (_, quote) = chars.next().ok_or_else(|| {
            Error::new(ErrorKind::Syntax("empty string scan".to_string()))
        })?;

        let mut out = String::new();
        let mut escaped = false;

        for (i, c) in chars {
            if escaped {
                out.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                self.rest = &self.rest[i + c.len_utf8()..];
                return Ok(Token::Str(out.into()));
            } else {
                out.push(c);
            }
        }

        Err(Error::new(ErrorKind::Syntax(
            "unterminated string literal".to_string(),
        )))
    }
}

/// Classifies a bare (unquoted) token.
fn classify(raw: &str) -> Token {
    match raw {
        "<%" => return Token::MacroOpen,
        "%>" => return Token::MacroClose,
        "true" => return Token::Boolean(true),
        "false" => return Token::Boolean(false),
        "NULL" => return Token::Null,
        _ => {}
    }

    if let Some(name) = raw.strip_prefix('$') {
        return Token::LoadRef(Arc::from(name));
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Token::Long(n);
    }

    // A double must look numeric; bare names like `NaN` stay names
    if raw.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        if let Ok(f) = raw.parse::<f64>() {
            return Token::Double(f);
        }
    }

    Token::Name(Arc::from(raw))
}

/// Tokenizes a whole fragment.
///
/// # Errors
/// Fails with a syntax error on an unterminated string literal.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
