use std::collections::HashMap;
use std::fmt;

use lachs::Span;
use tracing::trace;

use crate::element::{Element, Kind};

use super::env::TypeEnv;
use super::subst::Substitution;
use super::ty::{Type, TypeScheme, TypeVar};
use super::unify::{unify, UnifyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    UnboundVariable {
        name: String,
        span: Span,
    },
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
        context: Option<String>,
    },
    OccursCheck {
        var: TypeVar,
        ty: Type,
        span: Span,
    },
}

impl TypeError {
    pub fn unbound_variable(name: String, span: Span) -> Self {
        TypeError::UnboundVariable { name, span }
    }

    pub fn type_mismatch(expected: Type, found: Type, span: Span) -> Self {
        TypeError::TypeMismatch {
            expected,
            found,
            span,
            context: None,
        }
    }

    pub fn with_context(mut self, context: String) -> Self {
        if let TypeError::TypeMismatch { context: ctx, .. } = &mut self {
            *ctx = Some(context);
        }
        self
    }

    pub fn occurs_check(var: TypeVar, ty: Type, span: Span) -> Self {
        TypeError::OccursCheck { var, ty, span }
    }

    pub fn from_unify_error(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::Mismatch { expected, found } => {
                TypeError::type_mismatch(expected, found, span)
            }
            UnifyError::OccursCheck { var, ty } => TypeError::occurs_check(var, ty, span),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeError::UnboundVariable { name, span } => {
                let msg = format!("unbound identifier: {}", name);
                if span.source.is_empty() {
                    write!(f, "Type error: {}", msg)
                } else {
                    write!(f, "{}", span.to_string(&msg))
                }
            }
            TypeError::TypeMismatch {
                expected,
                found,
                span,
                context,
            } => {
                let msg = format!(
                    "cannot unify: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                );
                let full_msg = if let Some(ctx) = context {
                    format!("{}\n  Note: {}", msg, ctx)
                } else {
                    msg
                };
                if span.source.is_empty() {
                    write!(f, "Type error: {}", full_msg)
                } else {
                    write!(f, "{}", span.to_string(&full_msg))
                }
            }
            TypeError::OccursCheck { var, ty, span } => {
                let msg = format!(
                    "cannot construct infinite type: {} = {}",
                    Type::Var(var.clone()).pretty(),
                    ty.pretty()
                );
                if span.source.is_empty() {
                    write!(f, "Type error: {}", msg)
                } else {
                    write!(f, "{}", span.to_string(&msg))
                }
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// The built-in signatures every program is typed against.
pub fn builtin_env() -> TypeEnv {
    let int_binop = || TypeScheme::monomorphic(Type::func(Type::int(), Type::func(Type::int(), Type::int())));
    let int_cmp = || TypeScheme::monomorphic(Type::func(Type::int(), Type::func(Type::int(), Type::bool())));
    let bool_binop = || TypeScheme::monomorphic(Type::func(Type::bool(), Type::func(Type::bool(), Type::bool())));
    let a = || TypeVar::with_name(0, "a");

    let mut bindings = vec![];
    for op in ["+", "-", "*", "/", "%"] {
        bindings.push((op.to_string(), int_binop()));
    }
    for op in ["<", ">", "<=", ">=", "==", "!="] {
        bindings.push((op.to_string(), int_cmp()));
    }
    for op in ["&&", "||"] {
        bindings.push((op.to_string(), bool_binop()));
    }
    bindings.push((
        "unary_!".to_string(),
        TypeScheme::monomorphic(Type::func(Type::bool(), Type::bool())),
    ));
    bindings.push((
        "unary_-".to_string(),
        TypeScheme::monomorphic(Type::func(Type::int(), Type::int())),
    ));
    bindings.push((
        "println".to_string(),
        TypeScheme::polymorphic(vec![a()], Type::func(Type::Var(a()), Type::unit())),
    ));
    bindings.push((
        "toString".to_string(),
        TypeScheme::polymorphic(vec![a()], Type::func(Type::Var(a()), Type::string())),
    ));
    bindings.push((
        "error".to_string(),
        TypeScheme::polymorphic(vec![a()], Type::func(Type::string(), Type::Var(a()))),
    ));
    // Assignment evaluates to Unit and requires both sides at the same type.
    bindings.push((
        "=".to_string(),
        TypeScheme::polymorphic(
            vec![a()],
            Type::func(Type::Var(a()), Type::func(Type::Var(a()), Type::unit())),
        ),
    ));

    TypeEnv::with_bindings(bindings)
}

pub struct Infer {
    next_var: usize,
    subst: Substitution,
}

impl Infer {
    pub fn new() -> Self {
        Infer {
            next_var: 0,
            subst: Substitution::empty(),
        }
    }

    fn fresh_var(&mut self) -> TypeVar {
        let id = self.next_var;
        self.next_var += 1;
        TypeVar::new(id)
    }

    fn instantiate(&mut self, scheme: &TypeScheme) -> Type {
        let subst: HashMap<_, _> = scheme
            .vars
            .iter()
            .map(|v| (v.clone(), Type::Var(self.fresh_var())))
            .collect();
        Substitution(subst).apply(&scheme.ty)
    }

    fn generalize(&self, env: &TypeEnv, ty: &Type) -> TypeScheme {
        let ty = self.subst.apply(ty);
        let free_in_env = env.free_type_vars(&self.subst);
        let mut vars: Vec<_> = ty
            .free_type_vars()
            .difference(&free_in_env)
            .cloned()
            .collect();
        vars.sort_by_key(|v| v.id);
        TypeScheme { vars, ty }
    }

    fn unify_at(&mut self, t1: &Type, t2: &Type, span: Option<&Span>) -> Result<(), TypeError> {
        unify(&mut self.subst, t1, t2).map_err(|e| {
            TypeError::from_unify_error(e, span.cloned().unwrap_or_default())
        })
    }

    fn span_of(el: &Element) -> Span {
        el.span.clone().unwrap_or_default()
    }

    /// Infer the whole program (a `block` root of top-level statements).
    ///
    /// Each top-level statement is inferred independently so several type
    /// errors can be reported in one run; later statements still see the
    /// bindings of earlier ones that succeeded.
    pub fn infer_program(&mut self, root: &Element) -> Result<TypeEnv, Vec<TypeError>> {
        // User bindings land in a child scope so callers can report them
        // separately from the builtin signatures.
        let mut env = TypeEnv::child(builtin_env());
        let mut errors = Vec::new();

        for stmt in &root.children {
            match self.infer_statement(&env, stmt) {
                Ok((_, new_env)) => env = new_env,
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(env)
        } else {
            Err(errors)
        }
    }

    /// Infer one statement, producing its type and the environment for the
    /// statements after it.
    fn infer_statement(
        &mut self,
        env: &TypeEnv,
        el: &Element,
    ) -> Result<(Type, TypeEnv), TypeError> {
        match el.kind {
            Kind::Let => self.infer_let(env, el),
            Kind::Def => self.infer_def(env, el),
            // Macro definitions are inert templates; their bodies contain
            // pattern variables and are never typed.
            Kind::Macro => Ok((Type::unit(), env.clone())),
            _ => {
                let ty = self.infer_expr(env, el)?;
                Ok((ty, env.clone()))
            }
        }
    }

    fn infer_let(&mut self, env: &TypeEnv, el: &Element) -> Result<(Type, TypeEnv), TypeError> {
        let value_ty = match el.children.first() {
            Some(value) => self.infer_expr(env, value)?,
            None => Type::unit(),
        };
        if let Some(declared) = el.attr("type") {
            self.unify_at(&value_ty, &Type::con(declared), el.span.as_ref())?;
        }
        let scheme = self.generalize(env, &value_ty);
        let new_env = match &el.name {
            Some(name) => {
                trace!(name = name.as_str(), ty = %scheme.pretty(), "let binding");
                env.extend(name.clone(), scheme)
            }
            None => env.clone(),
        };
        Ok((Type::unit(), new_env))
    }

    fn infer_def(&mut self, env: &TypeEnv, el: &Element) -> Result<(Type, TypeEnv), TypeError> {
        // The definition is visible inside its own body at a monomorphic
        // placeholder type, which is what lets `def loop(x) { return
        // loop(x) }` check.
        let rec_ty = Type::Var(self.fresh_var());
        let body_env = match &el.name {
            Some(name) => env.extend(name.clone(), TypeScheme::monomorphic(rec_ty.clone())),
            None => env.clone(),
        };

        let fn_ty = self.infer_function(&body_env, el)?;
        self.unify_at(&rec_ty, &fn_ty, el.span.as_ref())?;

        // Generalize against the *outer* environment: classical
        // let-polymorphism for top-level definitions.
        let scheme = self.generalize(env, &fn_ty);
        let new_env = match &el.name {
            Some(name) => {
                trace!(name = name.as_str(), ty = %scheme.pretty(), "def binding");
                env.extend(name.clone(), scheme)
            }
            None => env.clone(),
        };
        Ok((Type::unit(), new_env))
    }

    /// Shared shape of `def` and `lambda`: children are params followed by
    /// the body block. Parameters with a declared type use it; the rest get
    /// fresh variables. The result folds into a right-associated function
    /// type (a zero-parameter function's type is its body type).
    fn infer_function(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        let mut param_tys = Vec::new();
        let mut body_env = env.clone();

        for child in &el.children {
            if child.kind != Kind::Param {
                continue;
            }
            let ty = match child.attr("type") {
                Some(declared) => Type::con(declared),
                None => Type::Var(self.fresh_var()),
            };
            if let Some(name) = &child.name {
                body_env = body_env.extend(name.clone(), TypeScheme::monomorphic(ty.clone()));
            }
            param_tys.push(ty);
        }

        let body = el.children.iter().find(|c| c.kind == Kind::Block);
        let body_ty = match body {
            Some(block) => self.infer_expr(&body_env, block)?,
            None => Type::unit(),
        };
        if let Some(declared) = el.attr("returns") {
            self.unify_at(&body_ty, &Type::con(declared), el.span.as_ref())?;
        }

        let fn_ty = param_tys
            .into_iter()
            .rev()
            .fold(body_ty, |acc, param| Type::func(param, acc));
        Ok(self.subst.apply(&fn_ty))
    }

    fn infer_expr(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        match &el.kind {
            Kind::Literal => {
                let ty_name = el.attr("type").unwrap_or("Unit");
                Ok(Type::con(ty_name))
            }
            Kind::Var => {
                let name = el.name.as_deref().unwrap_or_default();
                match env.lookup(name) {
                    Some(scheme) => Ok(self.instantiate(scheme)),
                    None => Err(TypeError::unbound_variable(
                        name.to_string(),
                        Self::span_of(el),
                    )),
                }
            }
            Kind::Call => self.infer_call(env, el),
            Kind::Lambda => self.infer_function(env, el),
            Kind::Block => self.infer_block(env, el),
            Kind::If => self.infer_if(env, el),
            Kind::While => {
                if let Some(cond) = el.children.first() {
                    let cond_ty = self.infer_condition(env, cond)?;
                    self.unify_at(&cond_ty, &Type::bool(), el.span.as_ref())?;
                }
                if let Some(body) = el.children.get(1) {
                    self.infer_expr(env, body)?;
                }
                Ok(Type::unit())
            }
            Kind::For => self.infer_for(env, el),
            Kind::Return => match el.children.first() {
                Some(value) => self.infer_expr(env, value),
                None => Ok(Type::unit()),
            },
            Kind::Condition | Kind::From | Kind::To => self.infer_condition(env, el),
            Kind::Let | Kind::Def | Kind::Macro => {
                // Nested statement forms reached through a block; type
                // handled by infer_statement, which blocks dispatch to.
                let (ty, _) = self.infer_statement(env, el)?;
                Ok(ty)
            }
            Kind::Param | Kind::Custom(_) => Ok(Type::unit()),
        }
    }

    /// The single expression wrapped by `condition`, `from`, or `to`.
    fn infer_condition(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        match el.children.first() {
            Some(expr) => self.infer_expr(env, expr),
            None => Ok(Type::unit()),
        }
    }

    fn infer_call(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        let name = el.name.as_deref().unwrap_or_default();

        // Ad-hoc overload escape hatch: `+` concatenates once either
        // operand is known to be a String, mirroring the runtime. The
        // declared signature stays Int -> Int -> Int for everything else.
        if name == "+" && el.children.len() == 2 {
            let left = self.infer_expr(env, &el.children[0])?;
            let right = self.infer_expr(env, &el.children[1])?;
            let left = self.subst.apply(&left);
            let right = self.subst.apply(&right);
            if left == Type::string() || right == Type::string() {
                return Ok(Type::string());
            }
            self.unify_at(&left, &Type::int(), el.span.as_ref())?;
            self.unify_at(&right, &Type::int(), el.span.as_ref())?;
            return Ok(Type::int());
        }

        let scheme = env.lookup(name).ok_or_else(|| {
            TypeError::unbound_variable(name.to_string(), Self::span_of(el))
        })?;
        let mut fn_ty = self.instantiate(scheme);

        for arg in &el.children {
            let arg_ty = self.infer_expr(env, arg)?;
            let result_ty = Type::Var(self.fresh_var());
            self.unify_at(
                &fn_ty,
                &Type::func(arg_ty, result_ty.clone()),
                el.span.as_ref(),
            )
            .map_err(|e| e.with_context(format!("in call to '{}'", name)))?;
            fn_ty = self.subst.apply(&result_ty);
        }

        Ok(fn_ty)
    }

    fn infer_block(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        let mut block_env = TypeEnv::child(env.clone());
        let mut last_ty = Type::unit();
        for stmt in &el.children {
            let (ty, new_env) = self.infer_statement(&block_env, stmt)?;
            block_env = new_env;
            last_ty = ty;
        }
        Ok(self.subst.apply(&last_ty))
    }

    fn infer_if(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        if let Some(cond) = el.children.first() {
            let cond_ty = self.infer_condition(env, cond)?;
            self.unify_at(&cond_ty, &Type::bool(), el.span.as_ref())
                .map_err(|e| e.with_context("if condition must be Bool".to_string()))?;
        }
        let then_ty = match el.children.get(1) {
            Some(block) => self.infer_expr(env, block)?,
            None => Type::unit(),
        };
        // The second block, when present, is the else branch; both branches
        // must agree and the if takes their common type.
        if let Some(else_block) = el.children.get(2) {
            let else_ty = self.infer_expr(env, else_block)?;
            self.unify_at(&then_ty, &else_ty, el.span.as_ref())
                .map_err(|e| e.with_context("if branches must have the same type".to_string()))?;
        }
        Ok(self.subst.apply(&then_ty))
    }

    fn infer_for(&mut self, env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        for bound in &el.children {
            if matches!(bound.kind, Kind::From | Kind::To) {
                let bound_ty = self.infer_condition(env, bound)?;
                self.unify_at(&bound_ty, &Type::int(), el.span.as_ref())
                    .map_err(|e| e.with_context("for bounds must be Int".to_string()))?;
            }
        }
        if let Some(body) = el.children.iter().find(|c| c.kind == Kind::Block) {
            // The iteration variable is Int inside the body's scope.
            let body_env = match el.attr("var") {
                Some(var) => env.extend(var.to_string(), TypeScheme::monomorphic(Type::int())),
                None => env.clone(),
            };
            self.infer_expr(&body_env, body)?;
        }
        Ok(Type::unit())
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_lit(value: &str) -> Element {
        Element::literal("Int", value)
    }

    fn string_lit(value: &str) -> Element {
        Element::literal("String", value)
    }

    fn infer_expr_in(env: &TypeEnv, el: &Element) -> Result<Type, TypeError> {
        let mut infer = Infer::new();
        let ty = infer.infer_expr(env, el)?;
        Ok(infer.subst.apply(&ty))
    }

    #[test]
    fn test_infer_literals() {
        let env = TypeEnv::empty();
        assert_eq!(infer_expr_in(&env, &int_lit("42")).unwrap(), Type::int());
        assert_eq!(
            infer_expr_in(&env, &string_lit("hi")).unwrap(),
            Type::string()
        );
        assert_eq!(
            infer_expr_in(&env, &Element::literal("Bool", "true")).unwrap(),
            Type::bool()
        );
    }

    #[test]
    fn test_infer_unbound_variable() {
        let env = TypeEnv::empty();
        let result = infer_expr_in(&env, &Element::var("x"));
        assert!(matches!(result, Err(TypeError::UnboundVariable { .. })));
    }

    #[test]
    fn test_infer_variable_monomorphic() {
        let env =
            TypeEnv::with_bindings(vec![("x".to_string(), TypeScheme::monomorphic(Type::int()))]);
        assert_eq!(infer_expr_in(&env, &Element::var("x")).unwrap(), Type::int());
    }

    #[test]
    fn test_infer_operator_call() {
        let env = builtin_env();
        let call = Element::call("+", [int_lit("1"), int_lit("2")]);
        assert_eq!(infer_expr_in(&env, &call).unwrap(), Type::int());
    }

    #[test]
    fn test_infer_operator_mismatch() {
        let env = builtin_env();
        let call = Element::call("+", [int_lit("1"), string_lit("two")]);
        assert!(matches!(
            infer_expr_in(&env, &call),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_infer_comparison_yields_bool() {
        let env = builtin_env();
        let call = Element::call("<", [int_lit("1"), int_lit("2")]);
        assert_eq!(infer_expr_in(&env, &call).unwrap(), Type::bool());
    }

    #[test]
    fn test_arity_overflow_is_unification_failure() {
        // Applying a saturated Int result to one argument more fails as a
        // mismatch against a function type.
        let env = builtin_env();
        let call = Element::call("unary_-", [int_lit("1"), int_lit("2")]);
        assert!(matches!(
            infer_expr_in(&env, &call),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_infer_identity_lambda() {
        let env = TypeEnv::empty();
        let lambda = Element::new(Kind::Lambda)
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::var("x")]));
        let ty = infer_expr_in(&env, &lambda).unwrap();
        match ty {
            Type::Func(t1, t2) => assert_eq!(t1, t2),
            other => panic!("expected function type, got {}", other),
        }
    }

    #[test]
    fn test_declared_param_types_are_used() {
        let env = builtin_env();
        let lambda = Element::new(Kind::Lambda)
            .with_child(Element::new(Kind::Param).named("x").with_attr("type", "Int"))
            .with_child(Element::block([Element::call(
                "+",
                [Element::var("x"), int_lit("1")],
            )]));
        let ty = infer_expr_in(&env, &lambda).unwrap();
        assert_eq!(ty, Type::func(Type::int(), Type::int()));
    }

    #[test]
    fn test_empty_block_is_unit() {
        let env = TypeEnv::empty();
        assert_eq!(
            infer_expr_in(&env, &Element::block([])).unwrap(),
            Type::unit()
        );
    }

    #[test]
    fn test_block_takes_last_statement_type() {
        let env = builtin_env();
        let block = Element::block([
            Element::call("println", [string_lit("hi")]),
            int_lit("7"),
        ]);
        assert_eq!(infer_expr_in(&env, &block).unwrap(), Type::int());
    }

    #[test]
    fn test_if_branches_must_agree() {
        let env = builtin_env();
        let bad = Element::new(Kind::If)
            .with_child(Element::condition(Element::literal("Bool", "true")))
            .with_child(Element::block([int_lit("1")]))
            .with_child(Element::block([string_lit("no")]));
        assert!(matches!(
            infer_expr_in(&env, &bad),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_if_condition_must_be_bool() {
        let env = builtin_env();
        let bad = Element::new(Kind::If)
            .with_child(Element::condition(int_lit("1")))
            .with_child(Element::block([int_lit("1")]));
        assert!(matches!(
            infer_expr_in(&env, &bad),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_let_generalizes() {
        let mut infer = Infer::new();
        let env = TypeEnv::empty();

        // let id = (x) -> { x }
        let id_lambda = Element::new(Kind::Lambda)
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::var("x")]));
        let (_, env) = infer
            .infer_statement(&env, &Element::binding("id", id_lambda))
            .unwrap();

        let scheme = env.lookup("id").unwrap();
        assert_eq!(scheme.vars.len(), 1);
    }

    #[test]
    fn test_let_polymorphism_in_one_program() {
        let mut infer = Infer::new();
        let env = builtin_env();

        let id_lambda = Element::new(Kind::Lambda)
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::var("x")]));
        let (_, env) = infer
            .infer_statement(&env, &Element::binding("id", id_lambda))
            .unwrap();

        let at_int = infer
            .infer_expr(&env, &Element::call("id", [int_lit("42")]))
            .unwrap();
        assert_eq!(infer.subst.apply(&at_int), Type::int());

        let at_string = infer
            .infer_expr(&env, &Element::call("id", [string_lit("x")]))
            .unwrap();
        assert_eq!(infer.subst.apply(&at_string), Type::string());
    }

    #[test]
    fn test_recursive_def_checks() {
        let mut infer = Infer::new();
        let env = builtin_env();

        // def loop(x) { return loop(x) }
        let def = Element::new(Kind::Def)
            .named("loop")
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::new(Kind::Return)
                .with_child(Element::call("loop", [Element::var("x")]))]));
        let result = infer.infer_statement(&env, &def);
        assert!(result.is_ok());
    }

    #[test]
    fn test_occurs_check_rejects_self_application() {
        let mut infer = Infer::new();
        let env = TypeEnv::empty();

        // (x) -> { x(x) } forces 'a = 'a -> 'b
        let lambda = Element::new(Kind::Lambda)
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::call(
                "x",
                [Element::var("x")],
            )]));
        let result = infer.infer_expr(&env, &lambda);
        assert!(matches!(result, Err(TypeError::OccursCheck { .. })));
    }

    #[test]
    fn test_for_binds_variable_as_int() {
        let env = builtin_env();
        let for_el = Element::new(Kind::For)
            .with_attr("var", "i")
            .with_child(Element::new(Kind::From).with_child(int_lit("1")))
            .with_child(Element::new(Kind::To).with_child(int_lit("3")))
            .with_child(Element::block([Element::call(
                "+",
                [Element::var("i"), int_lit("1")],
            )]));
        assert_eq!(infer_expr_in(&env, &for_el).unwrap(), Type::unit());
    }

    #[test]
    fn test_for_bounds_must_be_int() {
        let env = builtin_env();
        let for_el = Element::new(Kind::For)
            .with_attr("var", "i")
            .with_child(Element::new(Kind::From).with_child(string_lit("a")))
            .with_child(Element::new(Kind::To).with_child(int_lit("3")))
            .with_child(Element::block([]));
        assert!(infer_expr_in(&env, &for_el).is_err());
    }

    #[test]
    fn test_fresh_var_uniqueness() {
        let mut infer = Infer::new();
        let v1 = infer.fresh_var();
        let v2 = infer.fresh_var();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_instantiate_polymorphic_gives_fresh_copies() {
        let mut infer = Infer::new();
        let var = TypeVar::new(100);
        let scheme = TypeScheme::polymorphic(vec![var.clone()], Type::Var(var));

        let ty1 = infer.instantiate(&scheme);
        let ty2 = infer.instantiate(&scheme);
        match (ty1, ty2) {
            (Type::Var(v1), Type::Var(v2)) => assert_ne!(v1, v2),
            _ => panic!("expected type variables"),
        }
    }

    #[test]
    fn test_generalize_no_free_vars() {
        let infer = Infer::new();
        let env = TypeEnv::empty();
        let scheme = infer.generalize(&env, &Type::int());
        assert!(scheme.vars.is_empty());
    }

    #[test]
    fn test_generalize_skips_vars_free_in_env() {
        let infer = Infer::new();
        let var = TypeVar::new(0);
        let env = TypeEnv::empty().extend(
            "x".to_string(),
            TypeScheme::monomorphic(Type::Var(var.clone())),
        );
        let ty = Type::func(Type::Var(var), Type::int());
        let scheme = infer.generalize(&env, &ty);
        assert!(scheme.vars.is_empty());
    }

    #[test]
    fn test_error_display_mentions_types() {
        let err = TypeError::type_mismatch(Type::int(), Type::string(), Span::default());
        let msg = format!("{}", err);
        assert!(msg.contains("cannot unify"));
        assert!(msg.contains("Int"));
        assert!(msg.contains("String"));
    }
}
