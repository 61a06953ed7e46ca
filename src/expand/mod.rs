//! # Macro Expansion
//!
//! The expander rewrites the element tree bottom-up: children are expanded
//! first, then any `call` node whose name is registered as a macro is
//! replaced by its expansion, and the expansion itself is re-expanded. On a
//! fully-expanded tree the pass is the identity, so expansion is idempotent.
//!
//! A macro's pattern is a fixed positional sequence of variables: `$v1` is
//! bound to the first argument of the call, `$v2` to the second, and so on.
//! Surplus arguments are ignored. A template that references an unbound
//! pattern variable fails the whole expansion; unknown macro names are not
//! flagged, since an unregistered name is just an ordinary call.
//!
//! Generated identifiers use the reserved `__` prefix, which the parser
//! refuses in user code, so expansions cannot capture user bindings.

mod builtins;

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::element::{Element, Kind};

#[derive(Debug, Clone, Error)]
pub enum MacroError {
    #[error("macro '{macro_name}' expansion references ${var}, but the call has no argument for it")]
    UnboundPatternVar { macro_name: String, var: String },
}

/// Positional bindings for one macro application: `$params[i]` is bound to
/// `args[i]` when present.
pub struct MacroArgs<'a> {
    macro_name: &'a str,
    params: &'a [&'static str],
    args: &'a [Element],
}

impl<'a> MacroArgs<'a> {
    /// Look up the argument bound to a pattern variable. Referencing a
    /// variable the call supplied no argument for is fatal.
    pub fn get(&self, var: &str) -> Result<&'a Element, MacroError> {
        self.params
            .iter()
            .position(|p| *p == var)
            .and_then(|i| self.args.get(i))
            .ok_or_else(|| MacroError::UnboundPatternVar {
                macro_name: self.macro_name.to_string(),
                var: var.to_string(),
            })
    }
}

type BuildFn = Rc<dyn Fn(&MacroArgs) -> Result<Element, MacroError>>;

/// A registered macro: its positional pattern variables and the template
/// builder producing the expansion tree.
#[derive(Clone)]
pub struct MacroRule {
    params: Vec<&'static str>,
    build: BuildFn,
}

impl MacroRule {
    pub fn new(
        params: Vec<&'static str>,
        build: impl Fn(&MacroArgs) -> Result<Element, MacroError> + 'static,
    ) -> Self {
        MacroRule {
            params,
            build: Rc::new(build),
        }
    }
}

/// The macro table plus the expansion driver. The table is filled at
/// construction and read-only afterwards.
pub struct Expander {
    macros: HashMap<String, MacroRule>,
}

impl Expander {
    /// An expander with no registered macros.
    pub fn empty() -> Self {
        Expander {
            macros: HashMap::new(),
        }
    }

    /// An expander preloaded with the built-in macros.
    pub fn with_builtins() -> Self {
        let mut expander = Expander::empty();
        builtins::register_all(&mut expander);
        expander
    }

    /// Registration hook: make `name` expand through `rule`.
    pub fn register(&mut self, name: impl Into<String>, rule: MacroRule) {
        self.macros.insert(name.into(), rule);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Expand every macro call in the tree, bottom-up.
    pub fn expand(&self, element: &Element) -> Result<Element, MacroError> {
        let children = element
            .children
            .iter()
            .map(|child| self.expand(child))
            .collect::<Result<Vec<_>, _>>()?;

        let node = Element {
            kind: element.kind.clone(),
            name: element.name.clone(),
            attrs: element.attrs.clone(),
            children,
            span: element.span.clone(),
        };

        if node.kind == Kind::Call {
            if let Some(rule) = node.name.as_deref().and_then(|name| self.macros.get(name)) {
                let name = node.name.as_deref().unwrap_or_default();
                let args = MacroArgs {
                    macro_name: name,
                    params: &rule.params,
                    args: &node.children,
                };
                let expansion = (rule.build)(&args)?;
                debug!(macro_name = name, "expanded macro call");
                // The expansion may itself contain macro calls.
                return self.expand(&expansion);
            }
        }

        Ok(node)
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::with_builtins()
    }
}
