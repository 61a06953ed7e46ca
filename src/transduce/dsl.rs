//! Builder shorthands for rules and templates.
//!
//! The raw [`Pattern`]/[`Template`] structures say everything but take a
//! lot of syntax; these helpers cover the common shapes. A typical rename
//! rule reads:
//!
//! ```text
//! match_kind("def")
//!     .capture_name("fname")
//!     .rest("kids")
//!     .template(generate_node("function").name_var("fname").child(generate_var("kids")).build())
//! ```

use std::rc::Rc;

use crate::element::Element;

use super::pattern::{
    AttrExpect, AttrPattern, Binding, Bindings, KindPattern, ListPattern, Pattern,
};
use super::template::{NodeTemplate, Template, TemplateExpr};
use super::{Condition, Rule};

/// Start a rule from a kind pattern.
pub fn match_kind(kind: &str) -> RuleBuilder {
    RuleBuilder {
        pattern: KindPattern {
            kind: kind.to_string(),
            name_var: None,
            attrs: Vec::new(),
            children: None,
        },
        condition: None,
    }
}

/// A rule matching a binary operator call: `kind=call`, the name captured
/// as `op` and required to equal `op_symbol`, children bound as `$left` and
/// `$right`.
pub fn match_binary_op(op_symbol: &'static str) -> RuleBuilder {
    match_kind("call")
        .capture_name("op")
        .children(vec![
            Pattern::Var("left".to_string()),
            Pattern::Var("right".to_string()),
        ])
        .when(move |bindings| bound_str(bindings, "op") == Some(op_symbol))
}

/// As [`match_binary_op`] but unary: one child bound as `$operand`.
pub fn match_unary_op(op_symbol: &'static str) -> RuleBuilder {
    match_kind("call")
        .capture_name("op")
        .children(vec![Pattern::Var("operand".to_string())])
        .when(move |bindings| bound_str(bindings, "op") == Some(op_symbol))
}

pub struct RuleBuilder {
    pattern: KindPattern,
    condition: Option<Condition>,
}

impl RuleBuilder {
    /// Require a name on the matched node and bind it.
    pub fn capture_name(mut self, var: &str) -> Self {
        self.pattern.name_var = Some(var.to_string());
        self
    }

    /// Require the attr key to be present with exactly this value.
    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.pattern.attrs.push(AttrPattern {
            key: key.to_string(),
            expect: AttrExpect::Literal(value.to_string()),
        });
        self
    }

    /// Require the attr key and bind its value as a string.
    pub fn capture_attr(mut self, key: &str, var: &str) -> Self {
        self.pattern.attrs.push(AttrPattern {
            key: key.to_string(),
            expect: AttrExpect::Bind(var.to_string()),
        });
        self
    }

    /// Constrain the children positionally.
    pub fn children(mut self, patterns: Vec<Pattern>) -> Self {
        self.pattern.children = Some(patterns);
        self
    }

    /// Capture the whole child list (or, after [`RuleBuilder::children`],
    /// the remaining tail) as a list binding.
    pub fn rest(mut self, var: &str) -> Self {
        let list = Pattern::List(ListPattern {
            prefix: Vec::new(),
            rest: var.to_string(),
        });
        match &mut self.pattern.children {
            Some(patterns) => patterns.push(list),
            None => self.pattern.children = Some(vec![list]),
        }
        self
    }

    /// AND-compose a predicate with any existing condition.
    pub fn when(mut self, pred: impl Fn(&mut Bindings) -> bool + 'static) -> Self {
        self.condition = match self.condition.take() {
            Some(existing) => Some(Rc::new(move |bindings: &mut Bindings| {
                existing(bindings) && pred(bindings)
            })),
            None => Some(Rc::new(pred)),
        };
        self
    }

    /// Finish the rule with its template.
    pub fn template(self, template: impl Into<Template>) -> Rule {
        Rule {
            pattern: Pattern::Kind(self.pattern),
            condition: self.condition,
            template: template.into(),
        }
    }
}

// === Template shorthands ===

/// Start a node template.
pub fn generate_node(kind: &str) -> NodeTemplateBuilder {
    NodeTemplateBuilder {
        template: NodeTemplate {
            kind: kind.to_string(),
            name: None,
            attrs: Vec::new(),
            children: Vec::new(),
        },
    }
}

/// Emit a bound value.
pub fn generate_var(var: &str) -> Template {
    Template::Var(var.to_string())
}

/// Emit `literal(String, value)`.
pub fn generate_literal(value: &str) -> Template {
    Template::Literal(value.to_string())
}

pub struct NodeTemplateBuilder {
    template: NodeTemplate,
}

impl NodeTemplateBuilder {
    /// Fixed name.
    pub fn name(mut self, name: &str) -> Self {
        self.template.name = Some(TemplateExpr::Literal(name.to_string()));
        self
    }

    /// Name taken from a string binding.
    pub fn name_var(mut self, var: &str) -> Self {
        self.template.name = Some(TemplateExpr::Var(var.to_string()));
        self
    }

    /// Name from an arbitrary expression (e.g. a concatenation).
    pub fn name_expr(mut self, expr: TemplateExpr) -> Self {
        self.template.name = Some(expr);
        self
    }

    pub fn attr(mut self, key: &str, value: TemplateExpr) -> Self {
        self.template.attrs.push((key.to_string(), value));
        self
    }

    pub fn child(mut self, child: impl Into<Template>) -> Self {
        self.template.children.push(child.into());
        self
    }

    pub fn build(self) -> Template {
        Template::Node(self.template)
    }
}

impl From<NodeTemplateBuilder> for Template {
    fn from(builder: NodeTemplateBuilder) -> Self {
        builder.build()
    }
}

// === Condition helpers ===

/// The string bound under `var`, if any.
pub fn bound_str<'a>(bindings: &'a Bindings, var: &str) -> Option<&'a str> {
    match bindings.get(var) {
        Some(Binding::Str(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// The node bound under `var`, if any.
pub fn bound_node<'a>(bindings: &'a Bindings, var: &str) -> Option<&'a Element> {
    match bindings.get(var) {
        Some(Binding::Node(node)) => Some(node),
        _ => None,
    }
}

/// Stash a computed node under a (usually synthetic) binding for the
/// template to reference. This is how folding conditions hand their result
/// over.
pub fn bind_node(bindings: &mut Bindings, var: &str, node: Element) {
    bindings.insert(var.to_string(), Binding::Node(node));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Kind;
    use crate::transduce::Transducer;

    #[test]
    fn match_binary_op_requires_symbol_and_two_children() {
        let rule = match_binary_op("+").template(generate_node("sum").build());
        let transducer = Transducer::new(vec![rule]);

        let plus = Element::call("+", [Element::var("a"), Element::var("b")]);
        assert_eq!(
            transducer.transform(&plus).unwrap().kind,
            Kind::Custom("sum".to_string())
        );

        // Wrong operator: untouched.
        let minus = Element::call("-", [Element::var("a"), Element::var("b")]);
        assert_eq!(transducer.transform(&minus).unwrap(), minus);

        // Wrong arity: untouched.
        let unary = Element::call("+", [Element::var("a")]);
        assert_eq!(transducer.transform(&unary).unwrap(), unary);
    }

    #[test]
    fn match_unary_op_binds_operand() {
        let rule = match_unary_op("unary_!").template(generate_var("operand"));
        let transducer = Transducer::new(vec![rule]);

        let double_neg = Element::call(
            "unary_!",
            [Element::call("unary_!", [Element::var("p")])],
        );
        // One pass strips the outer negation only: the generated output is
        // not re-matched, just its children.
        assert_eq!(
            transducer.transform(&double_neg).unwrap(),
            Element::call("unary_!", [Element::var("p")])
        );
        // Re-applying to a fixed point strips both.
        assert_eq!(
            transducer.fixpoint(&double_neg, 5).unwrap(),
            Element::var("p")
        );
    }

    #[test]
    fn when_composes_conjunctively() {
        let rule = match_kind("var")
            .capture_name("n")
            .when(|bindings| bound_str(bindings, "n").is_some_and(|n| n.starts_with('a')))
            .when(|bindings| bound_str(bindings, "n").is_some_and(|n| n.len() > 2))
            .template(generate_node("hit").build());
        let transducer = Transducer::new(vec![rule]);

        assert_eq!(
            transducer.transform(&Element::var("abc")).unwrap().kind,
            Kind::Custom("hit".to_string())
        );
        // First predicate passes, second fails.
        assert_eq!(
            transducer.transform(&Element::var("ab")).unwrap(),
            Element::var("ab")
        );
    }

    #[test]
    fn capture_attr_feeds_templates() {
        let rule = match_kind("for")
            .capture_attr("var", "ivar")
            .template(generate_node("loop").name_var("ivar").build());
        let transducer = Transducer::new(vec![rule]);

        let tree = Element::new(Kind::For).with_attr("var", "i");
        let out = transducer.transform(&tree).unwrap();
        assert_eq!(out.name.as_deref(), Some("i"));
    }

    #[test]
    fn generate_literal_emits_string_literal() {
        let rule = match_kind("var").template(generate_literal("gone"));
        let transducer = Transducer::new(vec![rule]);
        assert_eq!(
            transducer.transform(&Element::var("x")).unwrap(),
            Element::literal("String", "gone")
        );
    }
}
