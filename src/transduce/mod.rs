//! # The Tree Transducer
//!
//! A declarative rewrite engine over element trees, independent of the
//! compilation pipeline. A transducer is an ordered list of rules, each a
//! pattern, an optional condition, and a template:
//!
//! - For every node, rules are tried in declaration order; the first whose
//!   pattern matches and whose condition holds is applied.
//! - The rule's template generates the output node, and the transducer then
//!   recurses into the *output's* children.
//! - If no rule matches, the node is kept and its children are transformed
//!   recursively, so the empty transducer is the identity.
//!
//! Conditions receive the binding map mutably: a rule may compute a derived
//! value (say, fold two literal operands) and stash it under a synthetic
//! binding that its template then references.
//!
//! Composition is external: [`Transducer::pipeline`] chains transducers,
//! and [`Transducer::fixpoint`] reapplies one until the tree stops changing
//! or an iteration cap is reached.

pub mod dsl;
pub mod pattern;
pub mod template;

pub use pattern::{AttrExpect, AttrPattern, Binding, Bindings, KindPattern, ListPattern, Pattern};
pub use template::{Generated, NodeTemplate, Template, TemplateExpr};

use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::element::Element;

use pattern::match_pattern;
use template::instantiate;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransducerError {
    #[error("template references unbound variable ${0}")]
    UnboundVariable(String),
    #[error("binding ${0} does not carry a string value")]
    NotAString(String),
    #[error("a list template produced a list where a single node is required")]
    ListWhereNodeRequired,
}

pub type Condition = Rc<dyn Fn(&mut Bindings) -> bool>;

/// One rewrite rule. Build these through [`dsl::RuleBuilder`] or literally.
#[derive(Clone)]
pub struct Rule {
    pub pattern: Pattern,
    pub condition: Option<Condition>,
    pub template: Template,
}

impl Rule {
    pub fn new(pattern: Pattern, template: Template) -> Self {
        Rule {
            pattern,
            condition: None,
            template,
        }
    }

    pub fn with_condition(
        pattern: Pattern,
        condition: impl Fn(&mut Bindings) -> bool + 'static,
        template: Template,
    ) -> Self {
        Rule {
            pattern,
            condition: Some(Rc::new(condition)),
            template,
        }
    }
}

/// An ordered rule list applied top-down with recursive descent.
pub struct Transducer {
    rules: Vec<Rule>,
}

impl Transducer {
    pub fn new(rules: Vec<Rule>) -> Self {
        Transducer { rules }
    }

    /// Apply the rules to one tree, producing a fresh output tree.
    pub fn transform(&self, node: &Element) -> Result<Element, TransducerError> {
        for (index, rule) in self.rules.iter().enumerate() {
            let mut bindings = Bindings::new();
            if !match_pattern(&rule.pattern, node, &mut bindings) {
                continue;
            }
            if let Some(condition) = &rule.condition {
                if !condition(&mut bindings) {
                    // Bindings from the failed attempt are discarded.
                    continue;
                }
            }

            trace!(rule = index, kind = node.kind.as_str(), "rule fired");
            let output = instantiate(&rule.template, &bindings)?.into_node()?;

            // Recurse into the children of what the rule generated, not
            // into the original node.
            let children = output
                .children
                .iter()
                .map(|child| self.transform(child))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Element { children, ..output });
        }

        // Identity by default: keep the node, transform its children.
        let children = node
            .children
            .iter()
            .map(|child| self.transform(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Element {
            kind: node.kind.clone(),
            name: node.name.clone(),
            attrs: node.attrs.clone(),
            children,
            span: node.span.clone(),
        })
    }

    /// Apply repeatedly until the tree stops changing (structural equality)
    /// or `max_iterations` is hit, returning the last tree either way.
    pub fn fixpoint(
        &self,
        node: &Element,
        max_iterations: usize,
    ) -> Result<Element, TransducerError> {
        let mut current = node.clone();
        for _ in 0..max_iterations {
            let next = self.transform(&current)?;
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        Ok(current)
    }

    /// Apply several transducers in sequence.
    pub fn pipeline(
        transducers: &[Transducer],
        node: &Element,
    ) -> Result<Element, TransducerError> {
        let mut current = node.clone();
        for transducer in transducers {
            current = transducer.transform(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::dsl::{generate_node, generate_var, match_kind};
    use super::*;
    use crate::element::Kind;

    #[test]
    fn empty_rule_set_is_identity() {
        let transducer = Transducer::new(vec![]);
        let tree = Element::new(Kind::Def)
            .named("f")
            .with_attr("x", "Int")
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::block([Element::call(
                "+",
                [Element::var("x"), Element::literal("Int", "1")],
            )]));
        assert_eq!(transducer.transform(&tree).unwrap(), tree);
    }

    #[test]
    fn earlier_rule_wins() {
        let rule_a = match_kind("var")
            .template(generate_node("first").build());
        let rule_b = match_kind("var")
            .template(generate_node("second").build());

        let forward = Transducer::new(vec![rule_a.clone(), rule_b.clone()]);
        let backward = Transducer::new(vec![rule_b, rule_a]);
        let tree = Element::var("x");

        assert_eq!(
            forward.transform(&tree).unwrap().kind,
            Kind::Custom("first".to_string())
        );
        assert_eq!(
            backward.transform(&tree).unwrap().kind,
            Kind::Custom("second".to_string())
        );
    }

    #[test]
    fn failed_condition_falls_through_to_later_rules() {
        let guarded = match_kind("var")
            .capture_name("n")
            .when(|bindings| {
                matches!(bindings.get("n"), Some(Binding::Str(s)) if s == "special")
            })
            .template(generate_node("special").build());
        let fallback = match_kind("var")
            .template(generate_node("plain").build());

        let transducer = Transducer::new(vec![guarded, fallback]);
        assert_eq!(
            transducer.transform(&Element::var("x")).unwrap().kind,
            Kind::Custom("plain".to_string())
        );
        assert_eq!(
            transducer.transform(&Element::var("special")).unwrap().kind,
            Kind::Custom("special".to_string())
        );
    }

    #[test]
    fn output_children_are_transformed_recursively() {
        // Rewrap defs, then rename params inside the generated output.
        let rewrap = match_kind("def")
            .capture_name("fname")
            .rest("kids")
            .template(
                generate_node("function")
                    .name_var("fname")
                    .child(generate_var("kids"))
                    .build(),
            );
        let rename = match_kind("param")
            .capture_name("pname")
            .template(generate_node("argument").name_var("pname").build());

        let transducer = Transducer::new(vec![rewrap, rename]);
        let tree = Element::new(Kind::Def)
            .named("add")
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::new(Kind::Param).named("y"));

        let out = transducer.transform(&tree).unwrap();
        assert_eq!(out.kind, Kind::Custom("function".to_string()));
        assert_eq!(out.name.as_deref(), Some("add"));
        assert_eq!(out.children.len(), 2);
        for child in &out.children {
            assert_eq!(child.kind, Kind::Custom("argument".to_string()));
        }
        assert_eq!(out.children[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn condition_can_stash_computed_bindings() {
        // Constant folding: match `+` over two literals, compute the sum in
        // the condition, emit it through a synthetic binding.
        let fold = match_kind("call")
            .capture_name("op")
            .children(vec![
                Pattern::Var("l".to_string()),
                Pattern::Var("r".to_string()),
            ])
            .when(|bindings| {
                let op = matches!(bindings.get("op"), Some(Binding::Str(s)) if s == "+");
                if !op {
                    return false;
                }
                let (l, r) = match (bindings.get("l"), bindings.get("r")) {
                    (Some(Binding::Node(l)), Some(Binding::Node(r))) => (l.clone(), r.clone()),
                    _ => return false,
                };
                match (l.attr("value"), r.attr("value")) {
                    (Some(lv), Some(rv)) => {
                        let (lv, rv): (i64, i64) = match (lv.parse(), rv.parse()) {
                            (Ok(lv), Ok(rv)) => (lv, rv),
                            _ => return false,
                        };
                        bindings.insert(
                            "sum".to_string(),
                            Binding::Node(Element::literal("Int", (lv + rv).to_string())),
                        );
                        true
                    }
                    _ => false,
                }
            })
            .template(Template::Var("sum".to_string()));

        let transducer = Transducer::new(vec![fold]);
        let tree = Element::call(
            "+",
            [Element::literal("Int", "2"), Element::literal("Int", "3")],
        );
        assert_eq!(
            transducer.transform(&tree).unwrap(),
            Element::literal("Int", "5")
        );
    }

    #[test]
    fn fixpoint_reaches_stable_tree() {
        // x + 0 -> x, applied until nothing changes.
        let simplify = match_kind("call")
            .capture_name("op")
            .children(vec![
                Pattern::Var("l".to_string()),
                Pattern::Kind(KindPattern {
                    kind: "literal".to_string(),
                    name_var: None,
                    attrs: vec![AttrPattern {
                        key: "value".to_string(),
                        expect: AttrExpect::Literal("0".to_string()),
                    }],
                    children: None,
                }),
            ])
            .when(|bindings| matches!(bindings.get("op"), Some(Binding::Str(s)) if s == "+"))
            .template(Template::Var("l".to_string()));

        let transducer = Transducer::new(vec![simplify]);
        // ((x + 0) + 0) + 0
        let mut tree = Element::var("x");
        for _ in 0..3 {
            tree = Element::call("+", [tree, Element::literal("Int", "0")]);
        }
        let out = transducer.fixpoint(&tree, 10).unwrap();
        assert_eq!(out, Element::var("x"));
    }

    #[test]
    fn pipeline_applies_in_sequence() {
        let first = Transducer::new(vec![match_kind("var")
            .template(generate_node("mid").build())]);
        let second = Transducer::new(vec![match_kind("mid")
            .template(generate_node("final").build())]);

        let out = Transducer::pipeline(&[first, second], &Element::var("x")).unwrap();
        assert_eq!(out.kind, Kind::Custom("final".to_string()));
    }
}
