//! TreeP - a small functional language built around one uniform tree
//!
//! Every stage after parsing operates on the element tree (ET):
//!
//! ```text
//! source -> lexer -> parser -> CST
//!        -> normalizer      -> ET
//!        -> macro expander  -> ET
//!        -> type inferencer -> ET + type environment
//!        -> interpreter     -> value
//! ```
//!
//! The [`transduce`] module is a standalone pattern/template rewrite engine
//! over the same trees, off the compilation pipeline.

pub mod ast;
pub mod element;
pub mod expand;
pub mod interpreter;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod transduce;
pub mod types;

use std::fmt;
use std::io::Write;

use thiserror::Error;

use element::Element;
use expand::{Expander, MacroError};
use interpreter::{Interpreter, RuntimeError, Value};
use lexer::{strip_comments, Token};
use normalize::NormalizeError;
use parser::{ParseError, ParseState};
use transduce::TransducerError;
use types::{Infer, TypeEnv, TypeError};

/// A batch of parse errors rendered one per line.
#[derive(Debug)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// A batch of type errors rendered one per line.
#[derive(Debug)]
pub struct TypeErrors(pub Vec<TypeError>);

impl fmt::Display for TypeErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Any failure along the pipeline. Each stage keeps its own error type;
/// this is the union the entry points below return.
#[derive(Debug, Error)]
pub enum TreepError {
    #[error("lex error: {0}")]
    Lex(String),
    #[error("{0}")]
    Parse(ParseErrors),
    #[error("{0}")]
    Normalize(#[from] NormalizeError),
    #[error("{0}")]
    Macro(#[from] MacroError),
    #[error("{0}")]
    Type(TypeErrors),
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
    #[error("{0}")]
    Transduce(#[from] TransducerError),
}

/// Lex a source string (comments stripped first).
pub fn lex(source: &str) -> Result<Vec<Token>, TreepError> {
    Token::lex(&strip_comments(source)).map_err(|e| TreepError::Lex(e.to_string()))
}

/// Lex and parse a source string into a CST.
pub fn parse_source(source: &str) -> Result<ast::Program, TreepError> {
    let tokens = lex(source)?;
    let mut state = ParseState::new(tokens);
    let (program, errors) = parser::parse(&mut state);
    match program {
        Some(program) if errors.is_empty() => Ok(program),
        _ => Err(TreepError::Parse(ParseErrors(errors))),
    }
}

/// Parse and normalize: the element tree before macro expansion.
pub fn normalize_source(source: &str) -> Result<Element, TreepError> {
    let program = parse_source(source)?;
    Ok(normalize::normalize_program(&program)?)
}

/// Parse, normalize, and expand macros: the element tree the type checker
/// and interpreter consume.
pub fn expand_source(source: &str) -> Result<Element, TreepError> {
    let tree = normalize_source(source)?;
    Ok(Expander::with_builtins().expand(&tree)?)
}

/// The full front half of the pipeline: expanded tree plus the inferred
/// type environment.
pub fn check_source(source: &str) -> Result<(Element, TypeEnv), TreepError> {
    let tree = expand_source(source)?;
    let env = Infer::new()
        .infer_program(&tree)
        .map_err(|errors| TreepError::Type(TypeErrors(errors)))?;
    Ok((tree, env))
}

/// Compile and run, printing through stdout. Returns the terminal value
/// (from `main` when defined, otherwise the last top-level statement).
pub fn run_source(source: &str) -> Result<Value, TreepError> {
    let (tree, _env) = check_source(source)?;
    Ok(Interpreter::new().run_program(&tree)?)
}

/// As [`run_source`], but printing into the given sink. This is what the
/// test suite uses to observe program output.
pub fn run_source_with_output(source: &str, out: Box<dyn Write>) -> Result<Value, TreepError> {
    let (tree, _env) = check_source(source)?;
    Ok(Interpreter::with_output(out).run_program(&tree)?)
}
