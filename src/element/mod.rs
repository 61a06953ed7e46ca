//! # The Element Tree
//!
//! This module defines the single uniform tree representation used by every
//! stage after parsing: the normalizer produces it, the macro expander and
//! transducer rewrite it, the type inferencer and interpreter walk it.
//!
//! ## Overview
//!
//! An [`Element`] is a node with:
//!
//! - a **kind** selecting its semantic shape (`def`, `call`, `literal`, …)
//! - an optional **name** (function name, variable name, operator symbol)
//! - an ordered list of **attrs** — (key, value) string pairs
//! - an ordered list of **children**
//! - an optional source **span** for diagnostics
//!
//! ## Attrs are a sequence, not a map
//!
//! `def` records each parameter's declared type as an attr keyed by the
//! parameter's own name, next to the `returns` attr. The same key can appear
//! more than once, and the transducer observes attr order, so attrs are kept
//! as an ordered `Vec` with [`Element::attr`] providing find-by-key lookup.
//!
//! ## Ownership
//!
//! A parent exclusively owns its children; there is no sharing and no
//! cycles. Trees are immutable by convention once a stage has produced them:
//! the expander and transducer build fresh output trees.

mod json;

pub use json::to_json;

use std::fmt;

use lachs::Span;

/// Tag selecting the semantic shape of an [`Element`].
///
/// The pipeline only produces the named variants. `Custom` carries tags
/// introduced by transducer rules, which may rewrite trees into vocabularies
/// of their own (for example renaming `def` nodes to `function`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Def,
    Param,
    Let,
    Lambda,
    Block,
    Return,
    If,
    While,
    For,
    Condition,
    From,
    To,
    Macro,
    Call,
    Var,
    Literal,
    Custom(String),
}

impl Kind {
    /// The string form of this kind, as it appears in patterns and JSON.
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Def => "def",
            Kind::Param => "param",
            Kind::Let => "let",
            Kind::Lambda => "lambda",
            Kind::Block => "block",
            Kind::Return => "return",
            Kind::If => "if",
            Kind::While => "while",
            Kind::For => "for",
            Kind::Condition => "condition",
            Kind::From => "from",
            Kind::To => "to",
            Kind::Macro => "macro",
            Kind::Call => "call",
            Kind::Var => "var",
            Kind::Literal => "literal",
            Kind::Custom(tag) => tag,
        }
    }
}

impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        match tag {
            "def" => Kind::Def,
            "param" => Kind::Param,
            "let" => Kind::Let,
            "lambda" => Kind::Lambda,
            "block" => Kind::Block,
            "return" => Kind::Return,
            "if" => Kind::If,
            "while" => Kind::While,
            "for" => Kind::For,
            "condition" => Kind::Condition,
            "from" => Kind::From,
            "to" => Kind::To,
            "macro" => Kind::Macro,
            "call" => Kind::Call,
            "var" => Kind::Var,
            "literal" => Kind::Literal,
            other => {
                assert!(!other.is_empty(), "element kind must not be empty");
                Kind::Custom(other.to_string())
            }
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the element tree.
///
/// See the module docs for field semantics. Construction goes through
/// [`Element::new`] and the builder methods, or through the shape helpers
/// ([`Element::var`], [`Element::literal`], [`Element::call`], …) that the
/// normalizer and the built-in macros use for assembling trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: Kind,
    pub name: Option<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub span: Option<Span>,
}

impl Element {
    pub fn new(kind: impl Into<Kind>) -> Self {
        Element {
            kind: kind.into(),
            name: None,
            attrs: Vec::new(),
            children: Vec::new(),
            span: None,
        }
    }

    /// Set the node name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an attr, preserving insertion order.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a source span.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Find-by-key lookup into the ordered attr list (first match wins).
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // === Shape helpers ===

    /// `var name=x`
    pub fn var(name: impl Into<String>) -> Self {
        Element::new(Kind::Var).named(name)
    }

    /// `literal attrs=[(type,T),(value,V)]`
    pub fn literal(ty: impl Into<String>, value: impl Into<String>) -> Self {
        Element::new(Kind::Literal)
            .with_attr("type", ty)
            .with_attr("value", value)
    }

    /// `call name=f children=[args…]`
    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Element>) -> Self {
        Element::new(Kind::Call).named(name).with_children(args)
    }

    /// `block children=[stmts…]`
    pub fn block(statements: impl IntoIterator<Item = Element>) -> Self {
        Element::new(Kind::Block).with_children(statements)
    }

    /// `condition children=[expr]`
    pub fn condition(expr: Element) -> Self {
        Element::new(Kind::Condition).with_child(expr)
    }

    /// `let name=x children=[value]`
    pub fn binding(name: impl Into<String>, value: Element) -> Self {
        Element::new(Kind::Let).named(name).with_child(value)
    }

    /// True for `literal` nodes; when `value` is given, the literal's value
    /// attr must equal it as well.
    pub fn is_literal(&self, value: Option<&str>) -> bool {
        self.kind == Kind::Literal
            && match value {
                Some(v) => self.attr("value") == Some(v),
                None => true,
            }
    }

    /// True for `var` nodes; when `name` is given, the node name must match.
    pub fn is_var(&self, name: Option<&str>) -> bool {
        self.kind == Kind::Var
            && match name {
                Some(n) => self.name.as_deref() == Some(n),
                None => true,
            }
    }

    /// Structural copy with every span dropped. Spans are metadata, so tests
    /// and fixpoint checks compare trees through this.
    pub fn without_spans(&self) -> Element {
        Element {
            kind: self.kind.clone(),
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            children: self.children.iter().map(Element::without_spans).collect(),
            span: None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter, el: &Element, depth: usize) -> fmt::Result {
            write!(f, "{:indent$}({}", "", el.kind, indent = depth * 2)?;
            if let Some(name) = &el.name {
                write!(f, " {}", name)?;
            }
            for (key, value) in &el.attrs {
                write!(f, " {}={:?}", key, value)?;
            }
            if el.children.is_empty() {
                write!(f, ")")
            } else {
                for child in &el.children {
                    writeln!(f)?;
                    write_node(f, child, depth + 1)?;
                }
                write!(f, ")")
            }
        }
        write_node(f, self, 0)
    }
}
