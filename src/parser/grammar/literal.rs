//! Literal and identifier parsers.

use crate::ast::expression::{BooleanLit, Ident, IntegerLit, PatternVar, StringLit};
use crate::lexer::{unescape, Token};

use crate::parser::combinators::{expect_dollar, BoxedParser};
use crate::parser::state::{ParseError, ParseState, Parser};

/// Parse an identifier. Names starting with `__` are reserved for generated
/// code and rejected here.
pub fn ident() -> BoxedParser<Ident> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Ident(_)) => {
            if let Token::Ident(id) = state.advance().unwrap() {
                if id.value.starts_with("__") {
                    let err = ParseError::new(format!(
                        "identifiers starting with '__' are reserved: {}",
                        id.value
                    ))
                    .at(id.position.clone());
                    state.record_error(err.clone());
                    return Err(err);
                }
                Ok(Ident {
                    value: id.value,
                    position: id.position,
                })
            } else {
                unreachable!()
            }
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("identifier")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("identifier");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse an integer literal
pub fn integer() -> BoxedParser<IntegerLit> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Integer(_)) => {
            if let Token::Integer(int) = state.advance().unwrap() {
                match int.value.parse() {
                    Ok(value) => Ok(IntegerLit {
                        value,
                        position: int.position,
                    }),
                    Err(_) => {
                        let err = ParseError::new(format!("integer literal too large: {}", int.value))
                            .at(int.position);
                        state.record_error(err.clone());
                        Err(err)
                    }
                }
            } else {
                unreachable!()
            }
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("integer")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("integer");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse a string literal, dropping the quotes and resolving escapes
pub fn string_literal() -> BoxedParser<StringLit> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::StringLiteral(_)) => {
            if let Token::StringLiteral(s) = state.advance().unwrap() {
                let raw = s.value.trim_matches('"');
                Ok(StringLit {
                    value: unescape(raw),
                    position: s.position,
                })
            } else {
                unreachable!()
            }
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("string")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("string");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse `true` or `false`
pub fn boolean() -> BoxedParser<BooleanLit> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::True(_)) => {
            let position = state.advance().unwrap().pos();
            Ok(BooleanLit {
                value: true,
                position,
            })
        }
        Some(Token::False(_)) => {
            let position = state.advance().unwrap().pos();
            Ok(BooleanLit {
                value: false,
                position,
            })
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("boolean")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("boolean");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// pattern_var := "$" ident
///
/// The reserved-prefix check does not apply here; pattern variables live in
/// their own namespace.
pub fn pattern_var() -> BoxedParser<PatternVar> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_dollar().parse(state)?.pos();
        match state.peek() {
            Some(Token::Ident(_)) => {
                if let Token::Ident(id) = state.advance().unwrap() {
                    Ok(PatternVar {
                        name: id.value,
                        position: start.merge(&id.position),
                    })
                } else {
                    unreachable!()
                }
            }
            Some(tok) => {
                let err = ParseError::new("unexpected token")
                    .expected("pattern variable name")
                    .found(tok.describe())
                    .at(tok.pos());
                state.record_error(err.clone());
                Err(err)
            }
            None => {
                let err =
                    ParseError::new("unexpected end of input").expected("pattern variable name");
                state.record_error(err.clone());
                Err(err)
            }
        }
    })
}
