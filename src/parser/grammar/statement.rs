//! Statement parsers.

use crate::ast::statement::{
    Block, Def, For, If, Let, MacroDef, Param, Return, Statement, While,
};
use crate::lexer::Token;

use crate::parser::combinators::{
    expect_colon, expect_comma, expect_def, expect_else, expect_equals, expect_expand, expect_for,
    expect_if, expect_lbrace, expect_let, expect_lparen, expect_macro, expect_pattern,
    expect_rbrace, expect_return, expect_returns, expect_rparen, expect_while, many, optional,
    sep_by_comma, BoxedParser,
};
use crate::parser::state::{ParseState, Parser};

use super::expression::expression;
use super::literal::{ident, pattern_var};

/// block := "{" statement* "}"
pub fn block() -> BoxedParser<Block> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_lbrace().parse(state)?.pos();
        let statements = many(statement()).parse(state)?;
        let end = expect_rbrace().parse(state)?.pos();
        Ok(Block {
            statements,
            position: start.merge(&end),
        })
    })
}

/// param := ident (":" ident)?
pub fn param() -> BoxedParser<Param> {
    BoxedParser::new(|state: &mut ParseState| {
        let name = ident().parse(state)?;
        let ty = if matches!(state.peek(), Some(Token::Colon(_))) {
            state.advance();
            Some(ident().label("type name").parse(state)?)
        } else {
            None
        };
        Ok(Param { name, ty })
    })
}

/// def := "def" ident "(" params? ")" ("returns" ":" ident)? block
fn def() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_def().parse(state)?.pos();
        let name = ident().label("function name").parse(state)?;
        expect_lparen().parse(state)?;
        let params = sep_by_comma(param()).parse(state)?;
        expect_rparen().parse(state)?;
        let returns = match optional(expect_returns()).parse(state)? {
            Some(_) => {
                expect_colon().parse(state)?;
                Some(ident().label("return type").parse(state)?)
            }
            None => None,
        };
        let body = block().parse(state)?;
        let position = start.merge(&body.position);
        Ok(Statement::Def(Def {
            name,
            params,
            returns,
            body,
            position,
        }))
    })
}

/// let := "let" ident (":" ident)? "=" expression
fn let_statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_let().parse(state)?.pos();
        let name = ident().label("binding name").parse(state)?;
        let ty = if matches!(state.peek(), Some(Token::Colon(_))) {
            state.advance();
            Some(ident().label("type name").parse(state)?)
        } else {
            None
        };
        expect_equals().parse(state)?;
        let value = expression().parse(state)?;
        let position = start.merge(&value.position());
        Ok(Statement::Let(Let {
            name,
            ty,
            value,
            position,
        }))
    })
}

/// if := "if" "(" expression ")" block ("else" block)?
fn if_statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_if().parse(state)?.pos();
        expect_lparen().parse(state)?;
        let condition = expression().parse(state)?;
        expect_rparen().parse(state)?;
        let then_block = block().parse(state)?;
        let else_block = match optional(expect_else()).parse(state)? {
            Some(_) => Some(block().parse(state)?),
            None => None,
        };
        let position = match &else_block {
            Some(e) => start.merge(&e.position),
            None => start.merge(&then_block.position),
        };
        Ok(Statement::If(If {
            condition,
            then_block,
            else_block,
            position,
        }))
    })
}

/// while := "while" "(" expression ")" block
fn while_statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_while().parse(state)?.pos();
        expect_lparen().parse(state)?;
        let condition = expression().parse(state)?;
        expect_rparen().parse(state)?;
        let body = block().parse(state)?;
        let position = start.merge(&body.position);
        Ok(Statement::While(While {
            condition,
            body,
            position,
        }))
    })
}

/// for := "for" "(" ident "=" expression "," expression ")" block
fn for_statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_for().parse(state)?.pos();
        expect_lparen().parse(state)?;
        let var = ident().label("loop variable").parse(state)?;
        expect_equals().parse(state)?;
        let from = expression().parse(state)?;
        expect_comma().parse(state)?;
        let to = expression().parse(state)?;
        expect_rparen().parse(state)?;
        let body = block().parse(state)?;
        let position = start.merge(&body.position);
        Ok(Statement::For(For {
            var,
            from,
            to,
            body,
            position,
        }))
    })
}

/// return := "return" expression?
fn return_statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_return().parse(state)?.pos();
        let value = optional(expression()).parse(state)?;
        let position = match &value {
            Some(v) => start.merge(&v.position()),
            None => start,
        };
        Ok(Statement::Return(Return { value, position }))
    })
}

/// macro := "macro" ident "pattern" "(" pattern_vars? ")" "expand" block
fn macro_def() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = expect_macro().parse(state)?.pos();
        let name = ident().label("macro name").parse(state)?;
        expect_pattern().parse(state)?;
        expect_lparen().parse(state)?;
        let params = sep_by_comma(pattern_var()).parse(state)?;
        expect_rparen().parse(state)?;
        expect_expand().parse(state)?;
        let body = block().parse(state)?;
        let position = start.merge(&body.position);
        Ok(Statement::Macro(MacroDef {
            name,
            params: params
                .into_iter()
                .map(|pv| crate::ast::expression::Ident {
                    value: pv.name,
                    position: pv.position,
                })
                .collect(),
            body,
            position,
        }))
    })
}

/// statement := def | let | if | while | for | return | macro | expression
pub fn statement() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Def(_)) => def().parse(state),
        Some(Token::Let(_)) => let_statement().parse(state),
        Some(Token::If(_)) => if_statement().parse(state),
        Some(Token::While(_)) => while_statement().parse(state),
        Some(Token::For(_)) => for_statement().parse(state),
        Some(Token::Return(_)) => return_statement().parse(state),
        Some(Token::Macro(_)) => macro_def().parse(state),
        _ => expression().parse(state).map(Statement::Expression),
    })
}
