//! Normalization - lower the concrete syntax tree into the element tree
//!
//! Each surface construct maps to one element shape; the only non-trivial
//! step is the block-argument desugaring, which turns
//!
//! ```text
//! f(a, b) { BODY }
//! ```
//!
//! into a call with one extra trailing argument, a zero-parameter lambda
//! whose body is the block:
//!
//! ```text
//! call name=f children=[a', b', lambda children=[block(BODY)]]
//! ```
//!
//! That hook is what lets the built-in macros accept brace-block bodies as
//! ordinary arguments.

use thiserror::Error;

use crate::ast::expression::{self, Expression};
use crate::ast::statement::{self, Statement};
use crate::ast::Program;
use crate::element::{Element, Kind};

#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    #[error("pattern variable ${0} outside a macro template")]
    PatternVarOutsideMacro(String),
    #[error("duplicate pattern variable ${0} in macro '{1}'")]
    DuplicatePatternVar(String, String),
}

/// Lower a parsed program into an element tree rooted at a `block` node.
pub fn normalize_program(program: &Program) -> Result<Element, NormalizeError> {
    let statements = program
        .statements
        .iter()
        .map(|stmt| normalize_statement(stmt, false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element::block(statements))
}

fn normalize_block(block: &statement::Block, in_template: bool) -> Result<Element, NormalizeError> {
    let statements = block
        .statements
        .iter()
        .map(|stmt| normalize_statement(stmt, in_template))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element::block(statements).at(block.position.clone()))
}

fn normalize_param(param: &statement::Param) -> Element {
    let mut el = Element::new(Kind::Param).named(param.name.value.clone());
    if let Some(ty) = &param.ty {
        el = el.with_attr("type", ty.value.clone());
    }
    el.at(param.name.position.clone())
}

fn normalize_statement(stmt: &Statement, in_template: bool) -> Result<Element, NormalizeError> {
    match stmt {
        Statement::Def(def) => normalize_def(def, in_template),
        Statement::Let(let_stmt) => {
            let mut el = Element::new(Kind::Let).named(let_stmt.name.value.clone());
            if let Some(ty) = &let_stmt.ty {
                el = el.with_attr("type", ty.value.clone());
            }
            Ok(el
                .with_child(normalize_expression(&let_stmt.value, in_template)?)
                .at(let_stmt.position.clone()))
        }
        Statement::If(if_stmt) => {
            let mut el = Element::new(Kind::If)
                .with_child(Element::condition(normalize_expression(
                    &if_stmt.condition,
                    in_template,
                )?))
                .with_child(normalize_block(&if_stmt.then_block, in_template)?);
            if let Some(else_block) = &if_stmt.else_block {
                // The else branch is identified purely by position: it is
                // the second block child.
                el = el.with_child(normalize_block(else_block, in_template)?);
            }
            Ok(el.at(if_stmt.position.clone()))
        }
        Statement::While(while_stmt) => Ok(Element::new(Kind::While)
            .with_child(Element::condition(normalize_expression(
                &while_stmt.condition,
                in_template,
            )?))
            .with_child(normalize_block(&while_stmt.body, in_template)?)
            .at(while_stmt.position.clone())),
        Statement::For(for_stmt) => Ok(Element::new(Kind::For)
            .with_attr("var", for_stmt.var.value.clone())
            .with_child(
                Element::new(Kind::From)
                    .with_child(normalize_expression(&for_stmt.from, in_template)?),
            )
            .with_child(
                Element::new(Kind::To).with_child(normalize_expression(&for_stmt.to, in_template)?),
            )
            .with_child(normalize_block(&for_stmt.body, in_template)?)
            .at(for_stmt.position.clone())),
        Statement::Return(ret) => {
            let mut el = Element::new(Kind::Return);
            if let Some(value) = &ret.value {
                el = el.with_child(normalize_expression(value, in_template)?);
            }
            Ok(el.at(ret.position.clone()))
        }
        Statement::Macro(macro_def) => normalize_macro(macro_def),
        Statement::Expression(expr) => normalize_expression(expr, in_template),
    }
}

fn normalize_def(def: &statement::Def, in_template: bool) -> Result<Element, NormalizeError> {
    let mut el = Element::new(Kind::Def).named(def.name.value.clone());

    // Declared parameter types are recorded twice: as a top-level attr keyed
    // by the parameter's own name, and as the param child's type attr.
    for param in &def.params {
        if let Some(ty) = &param.ty {
            el = el.with_attr(param.name.value.clone(), ty.value.clone());
        }
    }
    if let Some(returns) = &def.returns {
        el = el.with_attr("returns", returns.value.clone());
    }
    for param in &def.params {
        el = el.with_child(normalize_param(param));
    }
    Ok(el
        .with_child(normalize_block(&def.body, in_template)?)
        .at(def.position.clone()))
}

fn normalize_macro(macro_def: &statement::MacroDef) -> Result<Element, NormalizeError> {
    let mut el = Element::new(Kind::Macro).named(macro_def.name.value.clone());
    for (i, param) in macro_def.params.iter().enumerate() {
        if macro_def.params[..i].iter().any(|p| p.value == param.value) {
            return Err(NormalizeError::DuplicatePatternVar(
                param.value.clone(),
                macro_def.name.value.clone(),
            ));
        }
        el = el.with_attr("param", param.value.clone());
    }
    // Inside the template body, pattern variables are legal.
    Ok(el
        .with_child(normalize_block(&macro_def.body, true)?)
        .at(macro_def.position.clone()))
}

fn normalize_expression(expr: &Expression, in_template: bool) -> Result<Element, NormalizeError> {
    match expr {
        Expression::Ident(ident) => {
            Ok(Element::var(ident.value.clone()).at(ident.position.clone()))
        }
        Expression::Integer(int) => {
            Ok(Element::literal("Int", int.value.to_string()).at(int.position.clone()))
        }
        Expression::String(s) => {
            Ok(Element::literal("String", s.value.clone()).at(s.position.clone()))
        }
        Expression::Boolean(b) => {
            Ok(Element::literal("Bool", b.value.to_string()).at(b.position.clone()))
        }
        Expression::Binary(binop) => Ok(Element::call(
            binop.op.symbol(),
            [
                normalize_expression(&binop.left, in_template)?,
                normalize_expression(&binop.right, in_template)?,
            ],
        )
        .at(binop.position.clone())),
        Expression::Unary(unop) => Ok(Element::call(
            unop.op.call_name(),
            [normalize_expression(&unop.operand, in_template)?],
        )
        .at(unop.position.clone())),
        Expression::Call(call) => normalize_call(call, in_template),
        Expression::Lambda(lambda) => normalize_lambda(lambda, in_template),
        Expression::PatternVar(pv) => {
            if in_template {
                // Pattern variables survive into the template tree as vars
                // with a `$`-prefixed name, outside the user namespace.
                Ok(Element::var(format!("${}", pv.name)).at(pv.position.clone()))
            } else {
                Err(NormalizeError::PatternVarOutsideMacro(pv.name.clone()))
            }
        }
    }
}

fn normalize_lambda(
    lambda: &expression::Lambda,
    in_template: bool,
) -> Result<Element, NormalizeError> {
    let mut el = Element::new(Kind::Lambda);
    for param in &lambda.params {
        el = el.with_child(normalize_param(param));
    }
    Ok(el
        .with_child(normalize_block(&lambda.body, in_template)?)
        .at(lambda.position.clone()))
}

fn normalize_call(call: &expression::Call, in_template: bool) -> Result<Element, NormalizeError> {
    let mut args = call
        .args
        .iter()
        .map(|arg| normalize_expression(arg, in_template))
        .collect::<Result<Vec<_>, _>>()?;

    // Block-argument desugaring: a trailing brace block becomes one extra
    // argument, a zero-parameter lambda wrapping the block.
    if let Some(block) = &call.block {
        let body = normalize_block(block, in_template)?;
        args.push(
            Element::new(Kind::Lambda)
                .with_child(body)
                .at(block.position.clone()),
        );
    }

    Ok(Element::call(call.name.value.clone(), args).at(call.position.clone()))
}
