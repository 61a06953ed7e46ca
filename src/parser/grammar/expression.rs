//! Expression parsers.
//!
//! Binary operators are parsed by precedence climbing, one level per
//! function, low to high: `=`, `||`, `&&`, `== !=`, `< > <= >=`, `+ -`,
//! `* / %`, unary `! -`, then calls and primaries.

use crate::ast::expression::{
    BinOpKind, BinaryOp, Call, Expression, Lambda, UnaryOp, UnaryOpKind,
};
use crate::lexer::Token;

use crate::parser::combinators::{
    expect_arrow, expect_lparen, expect_rparen, optional, sep_by_comma, BoxedParser,
};
use crate::parser::state::{ParseState, Parser};

use super::literal::{boolean, ident, integer, pattern_var, string_literal};
use super::statement::{block, param};

/// expression := assignment
pub fn expression() -> BoxedParser<Expression> {
    assignment()
}

/// assignment := or_expr ("=" assignment)?   (right-associative)
fn assignment() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| {
        let left = or_expr().parse(state)?;
        if matches!(state.peek(), Some(Token::Equals(_))) {
            state.advance();
            let right = assignment().parse(state)?;
            let position = left.position().merge(&right.position());
            return Ok(Expression::Binary(BinaryOp {
                op: BinOpKind::Assign,
                left: Box::new(left),
                right: Box::new(right),
                position,
            }));
        }
        Ok(left)
    })
}

/// Parse a left-associative chain of binary operators at one precedence
/// level, where `op_for` picks out the tokens belonging to the level.
fn binary_chain(
    operand: fn() -> BoxedParser<Expression>,
    op_for: fn(&Token) -> Option<BinOpKind>,
) -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut left = operand().parse(state)?;
        loop {
            let op = match state.peek().and_then(op_for) {
                Some(op) => op,
                None => break,
            };
            state.advance();
            let right = operand().parse(state)?;
            let position = left.position().merge(&right.position());
            left = Expression::Binary(BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            });
        }
        Ok(left)
    })
}

/// or := and ("||" and)*
fn or_expr() -> BoxedParser<Expression> {
    binary_chain(and_expr, |tok| match tok {
        Token::OrOr(_) => Some(BinOpKind::Or),
        _ => None,
    })
}

/// and := equality ("&&" equality)*
fn and_expr() -> BoxedParser<Expression> {
    binary_chain(equality_expr, |tok| match tok {
        Token::AndAnd(_) => Some(BinOpKind::And),
        _ => None,
    })
}

/// equality := comparison (("==" | "!=") comparison)*
fn equality_expr() -> BoxedParser<Expression> {
    binary_chain(comparison_expr, |tok| match tok {
        Token::EqEq(_) => Some(BinOpKind::Eq),
        Token::BangEq(_) => Some(BinOpKind::NotEq),
        _ => None,
    })
}

/// comparison := additive (("<" | ">" | "<=" | ">=") additive)*
fn comparison_expr() -> BoxedParser<Expression> {
    binary_chain(additive_expr, |tok| match tok {
        Token::Lt(_) => Some(BinOpKind::Lt),
        Token::Gt(_) => Some(BinOpKind::Gt),
        Token::LtEq(_) => Some(BinOpKind::LtEq),
        Token::GtEq(_) => Some(BinOpKind::GtEq),
        _ => None,
    })
}

/// additive := term (("+" | "-") term)*
fn additive_expr() -> BoxedParser<Expression> {
    binary_chain(term_expr, |tok| match tok {
        Token::Plus(_) => Some(BinOpKind::Add),
        Token::Minus(_) => Some(BinOpKind::Sub),
        _ => None,
    })
}

/// term := unary (("*" | "/" | "%") unary)*
fn term_expr() -> BoxedParser<Expression> {
    binary_chain(unary_expr, |tok| match tok {
        Token::Star(_) => Some(BinOpKind::Mul),
        Token::Slash(_) => Some(BinOpKind::Div),
        Token::Percent(_) => Some(BinOpKind::Rem),
        _ => None,
    })
}

/// unary := ("!" | "-") unary | primary
fn unary_expr() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| {
        let op = match state.peek() {
            Some(Token::Bang(_)) => Some(UnaryOpKind::Not),
            Some(Token::Minus(_)) => Some(UnaryOpKind::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let start = state.advance().unwrap().pos();
            let operand = unary_expr().parse(state)?;
            let position = start.merge(&operand.position());
            return Ok(Expression::Unary(UnaryOp {
                op,
                operand: Box::new(operand),
                position,
            }));
        }
        primary_expr().parse(state)
    })
}

/// lambda := "(" params? ")" "->" "{" block "}"
pub fn lambda() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_lparen().parse(state)?.pos();
        let params = sep_by_comma(param()).parse(state)?;
        expect_rparen().parse(state)?;
        expect_arrow().parse(state)?;
        let body = block().parse(state)?;
        let position = start.merge(&body.position);
        Ok(Expression::Lambda(Lambda {
            params,
            body,
            position,
        }))
    })
}

/// call := ident "(" args? ")" ("{" block "}")?
///
/// The trailing brace block is the block-argument form; the normalizer
/// lowers it to an extra zero-parameter lambda argument.
fn call() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| {
        let name = ident().parse(state)?;
        let position = name.position.clone();
        expect_lparen().parse(state)?;
        let args = sep_by_comma(expression()).parse(state)?;
        expect_rparen().parse(state)?;
        let trailing = optional(block()).parse(state)?;
        Ok(Expression::Call(Call {
            name,
            args,
            block: trailing,
            position,
        }))
    })
}

/// primary := literal | lambda | call | var | pattern_var | "(" expression ")"
fn primary_expr() -> BoxedParser<Expression> {
    BoxedParser::new(|state: &mut ParseState| {
        match state.peek() {
            Some(Token::Integer(_)) => return (integer() >> Expression::Integer).parse(state),
            Some(Token::StringLiteral(_)) => {
                return (string_literal() >> Expression::String).parse(state)
            }
            Some(Token::True(_)) | Some(Token::False(_)) => {
                return (boolean() >> Expression::Boolean).parse(state)
            }
            Some(Token::Dollar(_)) => return (pattern_var() >> Expression::PatternVar).parse(state),
            _ => {}
        }

        // "(" opens either a lambda or a parenthesized expression;
        // disambiguate by backtracking.
        if matches!(state.peek(), Some(Token::LParen(_))) {
            let pos = state.position();
            if let Ok(expr) = lambda().parse(state) {
                return Ok(expr);
            }
            state.restore(pos);

            expect_lparen().parse(state)?;
            let inner = expression().parse(state)?;
            expect_rparen().parse(state)?;
            return Ok(inner);
        }

        // An identifier followed by "(" is a call, otherwise a variable.
        if matches!(state.peek(), Some(Token::Ident(_)))
            && matches!(state.peek_second(), Some(Token::LParen(_)))
        {
            return call().parse(state);
        }

        (ident() >> Expression::Ident).parse(state)
    })
}
