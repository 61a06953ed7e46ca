//! # Parser State Management
//!
//! Infrastructure for the parser combinators:
//! - **ParseState**: token stream position, backtracking, and error tracking
//! - **ParseError**: structured parse failures with expected/found context
//! - **Parser trait**: the interface every parser implements
//!
//! ## Backtracking
//!
//! Combinators try alternatives and fall back when they fail:
//!
//! ```text
//! let pos = state.position();     // save current position
//! match parser.parse(state) {
//!     Ok(result) => result,
//!     Err(_) => {
//!         state.restore(pos);     // restore and try next alternative
//!         alternative.parse(state)
//!     }
//! }
//! ```
//!
//! ## Error tracking
//!
//! In a backtracking parser the useful error is usually the one at the
//! furthest position the parser reached before giving up. The state records
//! that furthest error, merging "expected" sets when several alternatives
//! fail at the same position, and collects committed errors so top-level
//! recovery can report more than one problem per run.

use lachs::Span;

use crate::lexer::Token;

/// Structured parse error with context information.
///
/// # Fields
///
/// * `message` - Human-readable error description
/// * `span` - Optional source location for error reporting
/// * `expected` - List of what tokens/constructs were expected
/// * `found` - What was actually found (if available)
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Box<Span>>,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
            expected: vec![],
            found: None,
        }
    }

    /// Add an expected token/construct to this error.
    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    /// Set what was actually found.
    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    /// Set source location for this error.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(Box::new(span));
        self
    }

    /// Merge expected tokens from another error.
    ///
    /// Used when combining alternative parsers: if both alternatives fail at
    /// the same position, their "expected" lists are joined so the message
    /// can show all possibilities.
    pub fn merge_expected(mut self, other: &ParseError) -> Self {
        for exp in &other.expected {
            if !self.expected.contains(exp) {
                self.expected.push(exp.clone());
            }
        }
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = if !self.expected.is_empty() {
            let expected_str = if self.expected.len() == 1 {
                self.expected[0].clone()
            } else {
                let (last, rest) = self.expected.split_last().unwrap();
                format!("{} or {}", rest.join(", "), last)
            };
            match &self.found {
                Some(found) => format!("expected {}, found {}", expected_str, found),
                None => format!("expected {}", expected_str),
            }
        } else {
            self.message.clone()
        };

        // If we have span info, render with source context
        if let Some(span) = &self.span {
            write!(f, "{}", span.to_string(&msg))
        } else {
            write!(f, "Parse error: {}", msg)
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state: token stream, position, and error tracking.
pub struct ParseState {
    /// The complete token stream being parsed
    tokens: Vec<Token>,

    /// Current position in the token stream (index of next token to read)
    index: usize,

    /// Error at the furthest position reached during parsing
    furthest_error: Option<(usize, ParseError)>,

    /// All errors committed during parsing (for error recovery scenarios)
    collected_errors: Vec<ParseError>,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            furthest_error: None,
            collected_errors: Vec::new(),
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Peek one token past the next.
    pub fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.index + 1)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// Current position, for later [`ParseState::restore`].
    pub fn position(&self) -> usize {
        self.index
    }

    /// Restore the parser to a previously saved position.
    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Record an error, keeping track of the furthest position reached.
    ///
    /// ```text
    /// state.record_error(err1)  // at position 5
    /// state.record_error(err2)  // at position 10 - becomes new furthest
    /// state.record_error(err3)  // at position 10 - merged with err2
    /// state.record_error(err4)  // at position 3 - ignored (not furthest)
    /// ```
    pub fn record_error(&mut self, error: ParseError) {
        match &self.furthest_error {
            Some((pos, _)) if *pos > self.index => {
                // Keep the existing error if it's further along
            }
            Some((pos, existing)) if *pos == self.index => {
                let merged = existing.clone().merge_expected(&error);
                self.furthest_error = Some((self.index, merged));
            }
            _ => {
                self.furthest_error = Some((self.index, error));
            }
        }
    }

    /// Get the furthest error encountered during parsing.
    pub fn get_furthest_error(&self) -> Option<&ParseError> {
        self.furthest_error.as_ref().map(|(_, e)| e)
    }

    /// Collect an error for later reporting (used during error recovery).
    pub fn collect_error(&mut self, error: ParseError) {
        self.collected_errors.push(error);
    }

    /// Take the furthest error and add it to the collected errors.
    ///
    /// After calling this, `get_furthest_error()` returns `None` until
    /// another error is recorded.
    pub fn commit_furthest_error(&mut self) {
        if let Some((_, err)) = self.furthest_error.take() {
            self.collected_errors.push(err);
        }
    }

    /// Take all collected errors, leaving the list empty.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.collected_errors)
    }

    /// Create an error at the current position with span info.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let msg = message.into();
        match self.peek() {
            Some(tok) => ParseError::new(&msg).at(tok.pos()).found(tok.describe()),
            None => ParseError::new(msg).found("end of input".to_string()),
        }
    }
}

/// Generic parser trait.
///
/// Implemented for every function of the right shape, so plain functions and
/// closures can be used as parsers without wrapping.
pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
