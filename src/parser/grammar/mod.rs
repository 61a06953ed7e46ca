//! Grammar rules, organized by category:
//! - `literal`: identifiers, integers, strings, booleans, pattern variables
//! - `expression`: precedence-climbing expression forms
//! - `statement`: `def`, `let`, control flow, `macro`, expression statements

mod expression;
mod literal;
mod statement;

use crate::ast::Program;
use crate::lexer::Token;

use super::combinators::BoxedParser;
use super::state::{ParseError, ParseState, Parser};

use statement::statement;

/// True when the next token could plausibly open a new top-level statement.
fn at_statement_start(tok: &Token) -> bool {
    matches!(
        tok,
        Token::Def(_)
            | Token::Let(_)
            | Token::If(_)
            | Token::While(_)
            | Token::For(_)
            | Token::Return(_)
            | Token::Macro(_)
            | Token::Ident(_)
    )
}

/// Skip tokens until what looks like the start of the next top-level
/// statement, tracking brace depth so we do not stop inside a block.
fn skip_to_next_statement(state: &mut ParseState) {
    // Skip the offending token first to make progress
    state.advance();

    let mut depth = 0;
    while let Some(tok) = state.peek() {
        match tok {
            Token::LBrace(_) => {
                depth += 1;
                state.advance();
            }
            Token::RBrace(_) => {
                if depth > 0 {
                    depth -= 1;
                }
                state.advance();
            }
            tok if depth == 0 && at_statement_start(tok) => break,
            _ => {
                state.advance();
            }
        }
    }
}

/// program := statement*
/// With error recovery: if a statement fails to parse, skip to the next one
pub fn program() -> BoxedParser<Program> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut statements = Vec::new();

        while state.has_next() {
            let pos = state.position();
            match statement().parse(state) {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    // Commit the error and try to recover
                    state.commit_furthest_error();
                    state.restore(pos);
                    skip_to_next_statement(state);
                }
            }
        }

        Ok(Program { statements })
    })
}

/// Parse a complete program from the token stream.
///
/// Returns the parsed program along with all collected errors; a non-empty
/// error list means the program is partial and must not be executed.
pub fn parse(state: &mut ParseState) -> (Option<Program>, Vec<ParseError>) {
    let result = program().parse(state);

    let program = match result {
        Ok(prog) if state.has_next() => {
            if let Some(furthest) = state.get_furthest_error() {
                let furthest = furthest.clone();
                state.collect_error(furthest);
            } else {
                let err = state.error_here("unexpected token");
                state.collect_error(err);
            }
            Some(prog)
        }
        Ok(prog) => Some(prog),
        Err(err) => {
            if let Some(furthest) = state.get_furthest_error() {
                let furthest = furthest.clone();
                state.collect_error(furthest);
            } else {
                state.collect_error(err);
            }
            None
        }
    };

    let errors = state.take_errors();
    (program, errors)
}
