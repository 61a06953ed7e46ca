//! # Core Type System Definitions
//!
//! Types, type variables, and type schemes for the Hindley-Milner
//! inferencer.
//!
//! ## Overview
//!
//! A [`Type`] is one of three shapes:
//!
//! - **Var** - a type variable (`'t0`, `'a`), standing for an unknown type
//! - **Con** - a named type constructor (`Int`, `String`, `Bool`, `Unit`),
//!   with room for argument types. Unification compares constructors by
//!   name only and treats them as structurally atomic.
//! - **Func** - a function type `from -> to`; multi-parameter functions are
//!   right-associated chains (`Int -> Int -> Int`)
//!
//! A [`TypeScheme`] quantifies type variables over a type, giving
//! polymorphism:
//!
//! ```text
//! // identity, usable at every type:
//! TypeScheme {
//!     vars: ['a],
//!     ty: Func(Var('a), Var('a)),   // 'a -> 'a
//! }
//!
//! // each use instantiates the quantified vars fresh:
//! // identity(42)  : instance 't5 -> 't5, unified to Int -> Int
//! // identity("x") : instance 't6 -> 't6, unified to String -> String
//! ```

use std::collections::HashSet;
use std::fmt;

/// Type variable for polymorphism.
///
/// Uniquely identified by `id`; `name` is an optional human-readable label
/// used only by pretty printing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: usize,
    pub name: Option<String>,
}

impl TypeVar {
    pub fn new(id: usize) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// All possible types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Var(TypeVar),
    Con { name: String, args: Vec<Type> },
    Func(Box<Type>, Box<Type>),
}

impl Type {
    /// A nullary type constructor such as `Int` or `Bool`.
    pub fn con(name: impl Into<String>) -> Self {
        Type::Con {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn int() -> Self {
        Type::con("Int")
    }

    pub fn string() -> Self {
        Type::con("String")
    }

    pub fn bool() -> Self {
        Type::con("Bool")
    }

    pub fn unit() -> Self {
        Type::con("Unit")
    }

    /// Create a function type from parameter and return types.
    pub fn func(t1: Type, t2: Type) -> Self {
        Type::Func(Box::new(t1), Box::new(t2))
    }

    /// The set of type variables occurring free in this type.
    ///
    /// Every variable in a bare type is free; binding only happens in a
    /// [`TypeScheme`].
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        match self {
            Type::Var(v) => {
                let mut set = HashSet::new();
                set.insert(v.clone());
                set
            }
            Type::Con { args, .. } => {
                let mut set = HashSet::new();
                for arg in args {
                    set.extend(arg.free_type_vars());
                }
                set
            }
            Type::Func(t1, t2) => {
                let mut set = t1.free_type_vars();
                set.extend(t2.free_type_vars());
                set
            }
        }
    }

    /// Human-readable rendering: `Int -> Int`, `'a -> 'a`,
    /// `(Int -> Int) -> String`.
    pub fn pretty(&self) -> String {
        match self {
            Type::Var(v) => {
                if let Some(name) = &v.name {
                    format!("'{}", name)
                } else {
                    format!("'t{}", v.id)
                }
            }
            Type::Con { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let rendered: Vec<_> = args.iter().map(Type::pretty).collect();
                    format!("{}[{}]", name, rendered.join(", "))
                }
            }
            Type::Func(t1, t2) => {
                let t1_str = if matches!(**t1, Type::Func(_, _)) {
                    format!("({})", t1.pretty())
                } else {
                    t1.pretty()
                };
                format!("{} -> {}", t1_str, t2.pretty())
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// Polymorphic type scheme: a type closed over a list of quantified
/// variables. The quantified variables are instantiated fresh at every use
/// site and are not free in the scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScheme {
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl TypeScheme {
    /// A scheme with no quantified variables.
    pub fn monomorphic(ty: Type) -> Self {
        TypeScheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn polymorphic(vars: Vec<TypeVar>, ty: Type) -> Self {
        TypeScheme { vars, ty }
    }

    /// The scheme's free variables: free in the type minus quantified.
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut free = self.ty.free_type_vars();
        for var in &self.vars {
            free.remove(var);
        }
        free
    }

    pub fn pretty(&self) -> String {
        self.ty.pretty()
    }
}
