//! The tree-walking evaluator.
//!
//! Evaluation threads a [`Flow`] through every construct: a plain value, or
//! a latched `return` that unwinds blocks and loop bodies until the nearest
//! function call absorbs it.

use std::io::Write;

use thiserror::Error;

use crate::element::{Element, Kind};

use super::scope::Scope;
use super::value::{Builtin, Closure, Value};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime error: unbound identifier '{0}'")]
    UnboundIdentifier(String),
    #[error("runtime error: '{0}' is not a function")]
    NotAFunction(String),
    #[error("runtime error: {name} expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("runtime error: division by zero")]
    DivisionByZero,
    #[error("runtime error: {context} requires {expected}, got {found}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("runtime error: assignment target must be a variable")]
    BadAssignTarget,
    #[error("runtime error: malformed literal: {0}")]
    MalformedLiteral(String),
    #[error("{0}")]
    Explicit(String),
    #[error("runtime error: output failed: {0}")]
    Output(#[from] std::io::Error),
}

/// The result of evaluating one element: either an ordinary value, or a
/// latched return unwinding toward the enclosing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    Return(Value),
}

impl Flow {
    fn value(self) -> Value {
        match self {
            Flow::Value(v) | Flow::Return(v) => v,
        }
    }
}

pub struct Interpreter {
    scope: Scope,
    out: Box<dyn Write>,
}

impl Interpreter {
    /// An interpreter printing to stdout.
    pub fn new() -> Self {
        Interpreter {
            scope: Scope::new(),
            out: Box::new(std::io::stdout()),
        }
    }

    /// An interpreter printing into the given sink (used by tests and by
    /// embedders that capture output).
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Interpreter {
            scope: Scope::new(),
            out,
        }
    }

    /// Execute a program (a `block` root): run the top-level statements in
    /// order, then invoke `main` with no arguments if one was defined. The
    /// result is `main`'s return value, or the last top-level value.
    pub fn run_program(&mut self, root: &Element) -> Result<Value, RuntimeError> {
        let mut last = Value::Unit;
        for stmt in &root.children {
            match self.eval(stmt)? {
                Flow::Value(v) => last = v,
                Flow::Return(v) => return Ok(v),
            }
        }

        if let Some(Value::Closure(main)) = self.scope.resolve("main") {
            return self.call_closure("main", &main, vec![]);
        }
        Ok(last)
    }

    fn eval(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        match &el.kind {
            Kind::Literal => Ok(Flow::Value(self.eval_literal(el)?)),
            Kind::Var => {
                let name = el.name.as_deref().unwrap_or_default();
                match self.scope.resolve(name) {
                    Some(value) => Ok(Flow::Value(value)),
                    None => Err(RuntimeError::UnboundIdentifier(name.to_string())),
                }
            }
            Kind::Call => self.eval_call(el),
            Kind::Block => self.eval_block(el),
            Kind::Let => {
                let value = match el.children.first() {
                    Some(child) => self.eval_value(child)?,
                    None => Value::Unit,
                };
                if let Some(name) = &el.name {
                    self.scope.add(name.clone(), value);
                }
                Ok(Flow::Value(Value::Unit))
            }
            Kind::Def => {
                let closure = self.make_closure(el);
                if let Some(name) = &el.name {
                    self.scope.add(name.clone(), Value::Closure(closure));
                }
                Ok(Flow::Value(Value::Unit))
            }
            Kind::Lambda => Ok(Flow::Value(Value::Closure(self.make_closure(el)))),
            Kind::If => self.eval_if(el),
            Kind::While => self.eval_while(el),
            Kind::For => self.eval_for(el),
            Kind::Return => {
                let value = match el.children.first() {
                    Some(child) => self.eval_value(child)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }
            Kind::Condition | Kind::From | Kind::To => match el.children.first() {
                Some(child) => self.eval(child),
                None => Ok(Flow::Value(Value::Unit)),
            },
            // Macro templates are inert at runtime; params never evaluate
            // on their own.
            Kind::Macro | Kind::Param | Kind::Custom(_) => Ok(Flow::Value(Value::Unit)),
        }
    }

    /// Evaluate in value position: a latched return inside still unwinds,
    /// so this only collapses the wrapper for places that cannot observe
    /// returns (literals, operands already past flow handling).
    fn eval_value(&mut self, el: &Element) -> Result<Value, RuntimeError> {
        Ok(self.eval(el)?.value())
    }

    fn eval_literal(&self, el: &Element) -> Result<Value, RuntimeError> {
        let ty = el.attr("type").unwrap_or_default();
        let raw = el.attr("value").unwrap_or_default();
        match ty {
            "Int" => raw
                .parse()
                .map(Value::Int)
                .map_err(|_| RuntimeError::MalformedLiteral(raw.to_string())),
            "String" => Ok(Value::Str(raw.to_string())),
            "Bool" => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(RuntimeError::MalformedLiteral(other.to_string())),
            },
            other => Err(RuntimeError::MalformedLiteral(format!(
                "unknown literal type {other}"
            ))),
        }
    }

    fn make_closure(&self, el: &Element) -> Closure {
        let params = el
            .children
            .iter()
            .filter(|c| c.kind == Kind::Param)
            .filter_map(|c| c.name.clone())
            .collect();
        let body = el
            .children
            .iter()
            .find(|c| c.kind == Kind::Block)
            .cloned()
            .unwrap_or_else(|| Element::block([]));
        Closure {
            params,
            body,
            captured: self.scope.capture(),
        }
    }

    fn eval_block(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        self.scope.enter();
        let mut last = Value::Unit;
        for stmt in &el.children {
            match self.eval(stmt) {
                Ok(Flow::Value(v)) => last = v,
                Ok(Flow::Return(v)) => {
                    self.scope.leave();
                    return Ok(Flow::Return(v));
                }
                Err(err) => {
                    self.scope.leave();
                    return Err(err);
                }
            }
        }
        self.scope.leave();
        Ok(Flow::Value(last))
    }

    fn eval_condition(&mut self, el: &Element) -> Result<bool, RuntimeError> {
        match self.eval_value(el)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::TypeMismatch {
                context: "condition",
                expected: "Bool",
                found: other.type_name().to_string(),
            }),
        }
    }

    fn eval_if(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        let cond = match el.children.first() {
            Some(cond) => self.eval_condition(cond)?,
            None => false,
        };
        if cond {
            match el.children.get(1) {
                Some(then_block) => self.eval(then_block),
                None => Ok(Flow::Value(Value::Unit)),
            }
        } else {
            // The second block, when present, is the else branch.
            match el.children.get(2) {
                Some(else_block) => self.eval(else_block),
                None => Ok(Flow::Value(Value::Unit)),
            }
        }
    }

    fn eval_while(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        loop {
            let cond = match el.children.first() {
                Some(cond) => self.eval_condition(cond)?,
                None => false,
            };
            if !cond {
                return Ok(Flow::Value(Value::Unit));
            }
            if let Some(body) = el.children.get(1) {
                if let Flow::Return(v) = self.eval(body)? {
                    return Ok(Flow::Return(v));
                }
            }
        }
    }

    fn eval_for(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        let int_bound = |this: &mut Self, el: &Element, which| {
            match this.eval_value(el)? {
                Value::Int(n) => Ok(n),
                other => Err(RuntimeError::TypeMismatch {
                    context: which,
                    expected: "Int",
                    found: other.type_name().to_string(),
                }),
            }
        };
        let from = match el.children.iter().find(|c| c.kind == Kind::From) {
            Some(node) => int_bound(self, node, "for lower bound")?,
            None => 0,
        };
        let to = match el.children.iter().find(|c| c.kind == Kind::To) {
            Some(node) => int_bound(self, node, "for upper bound")?,
            None => from,
        };
        let body = el.children.iter().find(|c| c.kind == Kind::Block);
        let var = el.attr("var").map(str::to_string);

        // Inclusive bounds, step 1.
        for i in from..=to {
            self.scope.enter();
            if let Some(var) = &var {
                self.scope.add(var.clone(), Value::Int(i));
            }
            if let Some(body) = body {
                match self.eval(body) {
                    Ok(Flow::Value(_)) => {}
                    Ok(Flow::Return(v)) => {
                        self.scope.leave();
                        return Ok(Flow::Return(v));
                    }
                    Err(err) => {
                        self.scope.leave();
                        return Err(err);
                    }
                }
            }
            self.scope.leave();
        }
        Ok(Flow::Value(Value::Unit))
    }

    fn eval_call(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        let name = el.name.as_deref().unwrap_or_default();

        match name {
            "=" => return self.eval_assign(el),
            "&&" | "||" => return self.eval_logic(name, el),
            "+" | "-" | "*" | "/" | "%" | "<" | ">" | "<=" | ">=" | "==" | "!=" | "unary_!"
            | "unary_-" => return self.eval_operator(name, el),
            _ => {}
        }

        let callee = self
            .scope
            .resolve(name)
            .ok_or_else(|| RuntimeError::UnboundIdentifier(name.to_string()))?;

        let mut args = Vec::with_capacity(el.children.len());
        for child in &el.children {
            args.push(self.eval_value(child)?);
        }

        match callee {
            Value::Closure(closure) => self.call_closure(name, &closure, args).map(Flow::Value),
            Value::Builtin(builtin) => self.call_builtin(builtin, name, args).map(Flow::Value),
            _ => Err(RuntimeError::NotAFunction(name.to_string())),
        }
    }

    fn call_closure(
        &mut self,
        name: &str,
        closure: &Closure,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if args.len() != closure.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: closure.params.len(),
                found: args.len(),
            });
        }

        self.scope.push_captured(&closure.captured);
        self.scope.enter();
        for (param, arg) in closure.params.iter().zip(args) {
            self.scope.add(param.clone(), arg);
        }

        let result = self.eval(&closure.body);

        self.scope.leave();
        self.scope.leave();

        // The call boundary absorbs a latched return.
        Ok(result?.value())
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let one = |args: Vec<Value>| -> Result<Value, RuntimeError> {
            let found = args.len();
            args.into_iter().next().ok_or(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: 1,
                found,
            })
        };
        match builtin {
            Builtin::Println => {
                let value = one(args)?;
                writeln!(self.out, "{}", value.render())?;
                Ok(Value::Unit)
            }
            Builtin::ToString => Ok(Value::Str(one(args)?.render())),
            Builtin::Error => Err(RuntimeError::Explicit(one(args)?.render())),
        }
    }

    fn eval_assign(&mut self, el: &Element) -> Result<Flow, RuntimeError> {
        let target = el.children.first().ok_or(RuntimeError::BadAssignTarget)?;
        if target.kind != Kind::Var {
            return Err(RuntimeError::BadAssignTarget);
        }
        let name = target.name.clone().ok_or(RuntimeError::BadAssignTarget)?;
        let value = match el.children.get(1) {
            Some(child) => self.eval_value(child)?,
            None => Value::Unit,
        };
        if !self.scope.assign(&name, value) {
            return Err(RuntimeError::UnboundIdentifier(name));
        }
        Ok(Flow::Value(Value::Unit))
    }

    fn eval_logic(&mut self, op: &str, el: &Element) -> Result<Flow, RuntimeError> {
        let as_bool = |value: Value| match value {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::TypeMismatch {
                context: "logical operator",
                expected: "Bool",
                found: other.type_name().to_string(),
            }),
        };
        let left = match el.children.first() {
            Some(child) => as_bool(self.eval_value(child)?)?,
            None => {
                return Err(RuntimeError::ArityMismatch {
                    name: op.to_string(),
                    expected: 2,
                    found: 0,
                })
            }
        };
        // Short-circuit before touching the right operand.
        let result = match (op, left) {
            ("&&", false) => false,
            ("||", true) => true,
            _ => match el.children.get(1) {
                Some(child) => as_bool(self.eval_value(child)?)?,
                None => left,
            },
        };
        Ok(Flow::Value(Value::Bool(result)))
    }

    fn eval_operator(&mut self, op: &str, el: &Element) -> Result<Flow, RuntimeError> {
        let mut args = Vec::with_capacity(el.children.len());
        for child in &el.children {
            args.push(self.eval_value(child)?);
        }

        if let Some(stripped) = op.strip_prefix("unary_") {
            let operand = args.into_iter().next().ok_or(RuntimeError::ArityMismatch {
                name: op.to_string(),
                expected: 1,
                found: 0,
            })?;
            let result = match (stripped, operand) {
                ("!", Value::Bool(b)) => Value::Bool(!b),
                ("-", Value::Int(n)) => Value::Int(-n),
                (_, other) => {
                    return Err(RuntimeError::TypeMismatch {
                        context: "unary operator",
                        expected: "Bool or Int",
                        found: other.type_name().to_string(),
                    })
                }
            };
            return Ok(Flow::Value(result));
        }

        let mut args = args.into_iter();
        let (left, right) = match (args.next(), args.next()) {
            (Some(left), Some(right)) => (left, right),
            (first, second) => {
                return Err(RuntimeError::ArityMismatch {
                    name: op.to_string(),
                    expected: 2,
                    found: first.is_some() as usize + second.is_some() as usize,
                })
            }
        };

        // `+` is overloaded on strings at runtime, unlike in the type
        // system, which pins it to Int -> Int -> Int.
        if op == "+" {
            match (&left, &right) {
                (Value::Str(l), r) => return Ok(Flow::Value(Value::Str(format!("{}{}", l, r.render())))),
                (l, Value::Str(r)) => return Ok(Flow::Value(Value::Str(format!("{}{}", l.render(), r)))),
                _ => {}
            }
        }

        if op == "==" || op == "!=" {
            let equal = match (&left, &right) {
                (Value::Int(l), Value::Int(r)) => l == r,
                (Value::Str(l), Value::Str(r)) => l == r,
                (Value::Bool(l), Value::Bool(r)) => l == r,
                (Value::Unit, Value::Unit) => true,
                (l, r) => {
                    return Err(RuntimeError::TypeMismatch {
                        context: "equality",
                        expected: "comparable values of the same type",
                        found: format!("{} and {}", l.type_name(), r.type_name()),
                    })
                }
            };
            return Ok(Flow::Value(Value::Bool(if op == "==" { equal } else { !equal })));
        }

        let as_int = |value: &Value| match value {
            Value::Int(n) => Ok(*n),
            other => Err(RuntimeError::TypeMismatch {
                context: "arithmetic operator",
                expected: "Int",
                found: other.type_name().to_string(),
            }),
        };
        let l = as_int(&left)?;
        let r = as_int(&right)?;

        let result = match op {
            "+" => Value::Int(l + r),
            "-" => Value::Int(l - r),
            "*" => Value::Int(l * r),
            "/" => {
                if r == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                Value::Int(floor_div(l, r))
            }
            "%" => {
                if r == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                Value::Int(l - r * floor_div(l, r))
            }
            "<" => Value::Bool(l < r),
            ">" => Value::Bool(l > r),
            "<=" => Value::Bool(l <= r),
            ">=" => Value::Bool(l >= r),
            _ => unreachable!("operator {op} dispatched but not handled"),
        };
        Ok(Flow::Value(result))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor of the mathematical quotient, for any sign of divisor.
fn floor_div(l: i64, r: i64) -> i64 {
    let q = l / r;
    if (l % r != 0) && ((l < 0) != (r < 0)) {
        q - 1
    } else {
        q
    }
}
