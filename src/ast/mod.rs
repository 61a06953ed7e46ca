//! Concrete syntax tree produced by the parser.
//!
//! The CST mirrors source structure and keeps every construct's span. It is
//! short-lived: the normalizer lowers it into the element tree, which is
//! what every later stage operates on.

pub mod expression;
pub mod statement;

pub use expression::Expression;
pub use statement::{Block, Statement};

/// A parsed program: the ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}
