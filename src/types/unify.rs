use std::fmt;

use super::subst::Substitution;
use super::ty::{Type, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyError {
    Mismatch { expected: Type, found: Type },
    OccursCheck { var: TypeVar, ty: Type },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnifyError::Mismatch { expected, found } => {
                write!(
                    f,
                    "cannot unify: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            UnifyError::OccursCheck { var, ty } => {
                write!(
                    f,
                    "occurs check: cannot construct infinite type {} = {}",
                    Type::Var(var.clone()).pretty(),
                    ty.pretty()
                )
            }
        }
    }
}

/// True if `var` appears in `ty` under the current substitution.
pub fn occurs_in(subst: &Substitution, var: &TypeVar, ty: &Type) -> bool {
    match subst.apply(ty) {
        Type::Var(v) => v == *var,
        Type::Con { args, .. } => args.iter().any(|arg| occurs_in(subst, var, arg)),
        Type::Func(t1, t2) => occurs_in(subst, var, &t1) || occurs_in(subst, var, &t2),
    }
}

/// Unify two types, growing the accumulated substitution.
///
/// Both sides are normalized through the substitution first. Variables bind
/// after an occurs check (self-binding is a no-op); constructors unify by
/// name alone and are treated as structurally atomic; function types unify
/// pointwise.
pub fn unify(subst: &mut Substitution, t1: &Type, t2: &Type) -> Result<(), UnifyError> {
    let t1 = subst.apply(t1);
    let t2 = subst.apply(t2);

    match (&t1, &t2) {
        (Type::Var(v1), Type::Var(v2)) if v1 == v2 => Ok(()),
        (Type::Var(v), t) | (t, Type::Var(v)) => {
            if occurs_in(subst, v, t) {
                Err(UnifyError::OccursCheck {
                    var: v.clone(),
                    ty: t.clone(),
                })
            } else {
                subst.bind(v.clone(), t.clone());
                Ok(())
            }
        }
        (Type::Con { name: n1, .. }, Type::Con { name: n2, .. }) if n1 == n2 => Ok(()),
        (Type::Func(t1a, t1b), Type::Func(t2a, t2b)) => {
            unify(subst, t1a, t2a)?;
            unify(subst, t1b, t2b)
        }
        _ => Err(UnifyError::Mismatch {
            expected: t1.clone(),
            found: t2.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_subst() -> Substitution {
        Substitution::empty()
    }

    #[test]
    fn test_unify_identical_constructors() {
        let mut subst = fresh_subst();
        assert!(unify(&mut subst, &Type::int(), &Type::int()).is_ok());
        assert!(unify(&mut subst, &Type::string(), &Type::string()).is_ok());
        assert!(unify(&mut subst, &Type::unit(), &Type::unit()).is_ok());
        assert!(unify(&mut subst, &Type::bool(), &Type::bool()).is_ok());
        assert!(subst.0.is_empty());
    }

    #[test]
    fn test_unify_var_with_concrete() {
        let mut subst = fresh_subst();
        let var = TypeVar::new(0);
        unify(&mut subst, &Type::Var(var.clone()), &Type::int()).unwrap();
        assert_eq!(subst.apply(&Type::Var(var)), Type::int());
    }

    #[test]
    fn test_unify_concrete_with_var() {
        let mut subst = fresh_subst();
        let var = TypeVar::new(0);
        unify(&mut subst, &Type::int(), &Type::Var(var.clone())).unwrap();
        assert_eq!(subst.apply(&Type::Var(var)), Type::int());
    }

    #[test]
    fn test_unify_same_var_is_noop() {
        let mut subst = fresh_subst();
        let var = TypeVar::new(0);
        unify(&mut subst, &Type::Var(var.clone()), &Type::Var(var)).unwrap();
        assert!(subst.0.is_empty());
    }

    #[test]
    fn test_unify_two_vars_binds_one() {
        let mut subst = fresh_subst();
        let var1 = TypeVar::new(0);
        let var2 = TypeVar::new(1);
        unify(
            &mut subst,
            &Type::Var(var1.clone()),
            &Type::Var(var2.clone()),
        )
        .unwrap();
        unify(&mut subst, &Type::Var(var2), &Type::int()).unwrap();
        assert_eq!(subst.apply(&Type::Var(var1)), Type::int());
    }

    #[test]
    fn test_unify_occurs_check_direct() {
        let mut subst = fresh_subst();
        let var = TypeVar::new(0);
        let ty = Type::func(Type::Var(var.clone()), Type::int());
        let result = unify(&mut subst, &Type::Var(var), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn test_unify_occurs_check_through_bindings() {
        let mut subst = fresh_subst();
        let var1 = TypeVar::new(0);
        let var2 = TypeVar::new(1);
        // 'a := 'b, then 'b ~ ('a -> Int) must fail
        unify(
            &mut subst,
            &Type::Var(var1.clone()),
            &Type::Var(var2.clone()),
        )
        .unwrap();
        let ty = Type::func(Type::Var(var2.clone()), Type::int());
        let result = unify(&mut subst, &Type::Var(var1), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn test_unify_function_types_with_vars() {
        let mut subst = fresh_subst();
        let var1 = TypeVar::new(0);
        let var2 = TypeVar::new(1);
        let t1 = Type::func(Type::Var(var1.clone()), Type::int());
        let t2 = Type::func(Type::string(), Type::Var(var2.clone()));

        unify(&mut subst, &t1, &t2).unwrap();

        assert_eq!(subst.apply(&Type::Var(var1)), Type::string());
        assert_eq!(subst.apply(&Type::Var(var2)), Type::int());
    }

    #[test]
    fn test_unify_mismatch_concrete() {
        let mut subst = fresh_subst();
        let result = unify(&mut subst, &Type::int(), &Type::string());
        assert!(matches!(result, Err(UnifyError::Mismatch { .. })));
    }

    #[test]
    fn test_unify_mismatch_shape() {
        let mut subst = fresh_subst();
        let ty_func = Type::func(Type::int(), Type::int());
        let result = unify(&mut subst, &Type::int(), &ty_func);
        assert!(matches!(result, Err(UnifyError::Mismatch { .. })));
    }

    #[test]
    fn test_constructors_atomic_by_name() {
        // Constructor argument lists are not recursed into; same name
        // unifies regardless of arguments.
        let mut subst = fresh_subst();
        let t1 = Type::Con {
            name: "List".to_string(),
            args: vec![Type::int()],
        };
        let t2 = Type::Con {
            name: "List".to_string(),
            args: vec![Type::string()],
        };
        assert!(unify(&mut subst, &t1, &t2).is_ok());
    }

    #[test]
    fn test_unify_threads_substitution_through_functions() {
        // ('a -> 'b) ~ (Int -> String)
        let mut subst = fresh_subst();
        let var_a = TypeVar::new(0);
        let var_b = TypeVar::new(1);
        let t1 = Type::func(Type::Var(var_a.clone()), Type::Var(var_b.clone()));
        let t2 = Type::func(Type::int(), Type::string());

        unify(&mut subst, &t1, &t2).unwrap();

        assert_eq!(subst.apply(&Type::Var(var_a)), Type::int());
        assert_eq!(subst.apply(&Type::Var(var_b)), Type::string());
    }
}
