//! Templates and generation.
//!
//! A template turns the bindings of a successful match into an output tree.
//! Variable templates splice whatever was bound: a node is emitted as-is, a
//! list is spliced into the surrounding children, and a plain string is
//! wrapped into a `literal(String, …)` node. Name and attribute positions
//! take string expressions (variable, literal, or concatenation).

use crate::element::Element;

use super::pattern::{Binding, Bindings};
use super::TransducerError;

/// A string-valued expression inside a template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateExpr {
    Var(String),
    Literal(String),
    Concat(Vec<TemplateExpr>),
}

impl TemplateExpr {
    pub fn eval(&self, bindings: &Bindings) -> Result<String, TransducerError> {
        match self {
            TemplateExpr::Literal(s) => Ok(s.clone()),
            TemplateExpr::Var(var) => match bindings.get(var) {
                Some(Binding::Str(s)) => Ok(s.clone()),
                Some(Binding::Node(node)) => {
                    // A bound node can stand in for a string when it carries
                    // one: its name, or a literal's value.
                    if let Some(name) = &node.name {
                        Ok(name.clone())
                    } else if let Some(value) = node.attr("value") {
                        Ok(value.to_string())
                    } else {
                        Err(TransducerError::NotAString(var.clone()))
                    }
                }
                Some(Binding::List(_)) => Err(TransducerError::NotAString(var.clone())),
                None => Err(TransducerError::UnboundVariable(var.clone())),
            },
            TemplateExpr::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.eval(bindings)?);
                }
                Ok(out)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub kind: String,
    pub name: Option<TemplateExpr>,
    pub attrs: Vec<(String, TemplateExpr)>,
    pub children: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Node(NodeTemplate),
    /// Emit the bound value (splicing lists, wrapping strings).
    Var(String),
    /// Emit `literal(String, value)`.
    Literal(String),
    /// Splice several templates into the surrounding children list.
    List(Vec<Template>),
}

/// The result of instantiating one template: a single node, or a spliced
/// list that only a children position can absorb.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    One(Element),
    Many(Vec<Element>),
}

impl Generated {
    /// Demand a single node, as rule output positions do.
    pub fn into_node(self) -> Result<Element, TransducerError> {
        match self {
            Generated::One(el) => Ok(el),
            Generated::Many(_) => Err(TransducerError::ListWhereNodeRequired),
        }
    }
}

/// Instantiate a template against the bindings of a successful match.
pub fn instantiate(template: &Template, bindings: &Bindings) -> Result<Generated, TransducerError> {
    match template {
        Template::Literal(value) => Ok(Generated::One(Element::literal("String", value.clone()))),
        Template::Var(var) => match bindings.get(var) {
            Some(Binding::Node(node)) => Ok(Generated::One(node.clone())),
            Some(Binding::List(nodes)) => Ok(Generated::Many(nodes.clone())),
            Some(Binding::Str(s)) => Ok(Generated::One(Element::literal("String", s.clone()))),
            None => Err(TransducerError::UnboundVariable(var.clone())),
        },
        Template::List(templates) => {
            let mut out = Vec::new();
            for template in templates {
                match instantiate(template, bindings)? {
                    Generated::One(el) => out.push(el),
                    Generated::Many(els) => out.extend(els),
                }
            }
            Ok(Generated::Many(out))
        }
        Template::Node(node) => {
            let mut el = Element::new(node.kind.as_str());
            if let Some(name) = &node.name {
                el.name = Some(name.eval(bindings)?);
            }
            for (key, value) in &node.attrs {
                let value = value.eval(bindings)?;
                el.attrs.push((key.clone(), value));
            }
            for child in &node.children {
                match instantiate(child, bindings)? {
                    Generated::One(child_el) => el.children.push(child_el),
                    Generated::Many(child_els) => el.children.extend(child_els),
                }
            }
            Ok(Generated::One(el))
        }
    }
}
