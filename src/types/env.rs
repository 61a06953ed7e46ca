//! # Type Environment
//!
//! Maps names to type schemes during inference. The environment is a
//! persistent structure: `extend` returns a new environment, and nested
//! scopes link to their parent so inner bindings shadow outer ones.
//!
//! When looking a name up, the caller **instantiates** the stored scheme
//! with fresh variables, which is where let-polymorphism pays off: each use
//! of `identity` gets its own copy of `'a -> 'a` to unify independently.
//!
//! Generalization needs to know which variables are free in the
//! environment: a variable free in some binding must not be quantified,
//! because later uses of that binding still constrain it. Free-variable
//! collection runs under the current substitution so bindings discovered so
//! far are taken into account.

use std::collections::{HashMap, HashSet};

use super::subst::Substitution;
use super::ty::{TypeScheme, TypeVar};

/// Type environment mapping names to type schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEnv {
    bindings: HashMap<String, TypeScheme>,
    parent: Option<Box<TypeEnv>>,
}

impl TypeEnv {
    pub fn empty() -> Self {
        TypeEnv {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    pub fn with_bindings(bindings: Vec<(String, TypeScheme)>) -> Self {
        TypeEnv {
            bindings: bindings.into_iter().collect(),
            parent: None,
        }
    }

    /// A fresh scope whose lookups fall through to `parent`.
    pub fn child(parent: TypeEnv) -> Self {
        TypeEnv {
            bindings: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    /// A copy of this environment with one more binding (shadowing any
    /// existing binding of the same name).
    pub fn extend(&self, name: String, scheme: TypeScheme) -> Self {
        let mut new_env = self.clone();
        new_env.bindings.insert(name, scheme);
        new_env
    }

    /// Look up a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        match self.bindings.get(name) {
            Some(scheme) => Some(scheme),
            None => self.parent.as_ref().and_then(|p| p.lookup(name)),
        }
    }

    /// All variables free in some binding, viewed through the current
    /// substitution.
    pub fn free_type_vars(&self, subst: &Substitution) -> HashSet<TypeVar> {
        let mut free = HashSet::new();
        let mut env = Some(self);
        while let Some(current) = env {
            for scheme in current.bindings.values() {
                let applied = subst.apply(&scheme.ty);
                let mut vars = applied.free_type_vars();
                for quantified in &scheme.vars {
                    vars.remove(quantified);
                }
                free.extend(vars);
            }
            env = current.parent.as_deref();
        }
        free
    }

    /// Iterate the bindings of the innermost scope (used for reporting
    /// inferred top-level schemes).
    pub fn local_bindings(&self) -> impl Iterator<Item = (&String, &TypeScheme)> {
        self.bindings.iter()
    }
}
