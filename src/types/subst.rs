//! # Type Substitutions
//!
//! A substitution maps type variables to types. The inferencer keeps a
//! single substitution for the whole run and grows it monotonically as
//! unification discovers bindings.
//!
//! Because bindings accumulate, a variable's image may itself contain bound
//! variables (`'a := 'b`, then `'b := Int`). [`Substitution::apply`]
//! therefore chases images recursively until it reaches a fixed point:
//!
//! ```text
//! // {'a := 'b, 'b := Int}
//! apply('a)        = Int
//! apply('a -> 'c)  = Int -> 'c
//! ```
//!
//! The occurs check in unification guarantees the chain is acyclic, so the
//! recursion terminates and application is idempotent.

use std::collections::HashMap;

use super::ty::{Type, TypeVar};

/// A substitution mapping type variables to types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution(pub HashMap<TypeVar, Type>);

impl Substitution {
    /// Create an empty substitution (no mappings).
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    /// Create a substitution with a single mapping.
    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Substitution(map)
    }

    /// Apply this substitution to a type, replacing every bound variable by
    /// its current image, recursively.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => match self.0.get(v) {
                Some(image) => self.apply(image),
                None => ty.clone(),
            },
            Type::Con { name, args } => Type::Con {
                name: name.clone(),
                args: args.iter().map(|arg| self.apply(arg)).collect(),
            },
            Type::Func(t1, t2) => Type::func(self.apply(t1), self.apply(t2)),
        }
    }

    /// Record a new binding. The unifier is responsible for the occurs
    /// check; inserting a cyclic binding here would make `apply` diverge.
    pub fn bind(&mut self, var: TypeVar, ty: Type) {
        self.0.insert(var, ty);
    }

    /// Look up the direct image of a variable (no chasing).
    pub fn get(&self, var: &TypeVar) -> Option<&Type> {
        self.0.get(var)
    }
}
