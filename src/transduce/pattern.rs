//! Patterns and the structural matcher.
//!
//! A pattern match runs against one node with a fresh binding map; on
//! success the map holds every captured node, sibling list, and attribute
//! string, and on failure it is discarded wholesale, so partial matches
//! never leak bindings.

use std::collections::HashMap;

use crate::element::Element;

/// A value captured during a pattern match.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Node(Element),
    List(Vec<Element>),
    Str(String),
}

/// The binding map populated by one rule attempt. Conditions may insert
/// further (computed) bindings before the template runs.
pub type Bindings = HashMap<String, Binding>;

/// What an attribute pattern requires of the value under its key. The key
/// itself must be present in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrExpect {
    /// Key must exist; value unconstrained.
    Present,
    /// Value must equal this string exactly.
    Literal(String),
    /// Value is captured under this binding name.
    Bind(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrPattern {
    pub key: String,
    pub expect: AttrExpect,
}

/// Matches a fixed prefix of siblings and then captures the remaining tail
/// as a list. Only legal as the last child pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPattern {
    pub prefix: Vec<Pattern>,
    pub rest: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindPattern {
    pub kind: String,
    /// When set, the node must carry a name, which is bound here.
    pub name_var: Option<String>,
    pub attrs: Vec<AttrPattern>,
    /// `None` leaves children unconstrained; `Some` matches positionally
    /// (exact arity unless the last pattern is a list pattern).
    pub children: Option<Vec<Pattern>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Kind(KindPattern),
    /// `$v`: match any node and bind it.
    Var(String),
    /// Match any node, bind nothing.
    Any,
    List(ListPattern),
}

/// Try to match `pattern` against `node`, extending `bindings` on the way.
/// The caller owns the map and must throw it away if the overall rule
/// attempt fails.
pub fn match_pattern(pattern: &Pattern, node: &Element, bindings: &mut Bindings) -> bool {
    match pattern {
        Pattern::Any => true,
        Pattern::Var(var) => {
            bindings.insert(var.clone(), Binding::Node(node.clone()));
            true
        }
        Pattern::Kind(kp) => match_kind_pattern(kp, node, bindings),
        // A list pattern only makes sense against a sibling sequence; as a
        // direct node pattern it never matches.
        Pattern::List(_) => false,
    }
}

fn match_kind_pattern(kp: &KindPattern, node: &Element, bindings: &mut Bindings) -> bool {
    if node.kind.as_str() != kp.kind {
        return false;
    }

    if let Some(name_var) = &kp.name_var {
        match &node.name {
            Some(name) => {
                bindings.insert(name_var.clone(), Binding::Str(name.clone()));
            }
            None => return false,
        }
    }

    for attr in &kp.attrs {
        let value = match node.attr(&attr.key) {
            Some(value) => value,
            None => return false,
        };
        match &attr.expect {
            AttrExpect::Present => {}
            AttrExpect::Literal(expected) => {
                if value != expected {
                    return false;
                }
            }
            AttrExpect::Bind(var) => {
                bindings.insert(var.clone(), Binding::Str(value.to_string()));
            }
        }
    }

    match &kp.children {
        None => true,
        Some(patterns) => match_children(patterns, &node.children, bindings),
    }
}

/// Match child patterns positionally. When the final pattern is a list
/// pattern, it consumes the remaining tail; otherwise arities must agree.
pub fn match_children(patterns: &[Pattern], children: &[Element], bindings: &mut Bindings) -> bool {
    if let Some((Pattern::List(list), head)) = patterns.split_last() {
        if children.len() < head.len() + list.prefix.len() {
            return false;
        }
        for (pattern, child) in head.iter().zip(children) {
            if !match_pattern(pattern, child, bindings) {
                return false;
            }
        }
        let tail = &children[head.len()..];
        for (pattern, child) in list.prefix.iter().zip(tail) {
            if !match_pattern(pattern, child, bindings) {
                return false;
            }
        }
        let rest = tail[list.prefix.len()..].to_vec();
        bindings.insert(list.rest.clone(), Binding::List(rest));
        true
    } else {
        if patterns.len() != children.len() {
            return false;
        }
        patterns
            .iter()
            .zip(children)
            .all(|(pattern, child)| match_pattern(pattern, child, bindings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Kind;

    fn kind_pattern(kind: &str) -> KindPattern {
        KindPattern {
            kind: kind.to_string(),
            name_var: None,
            attrs: Vec::new(),
            children: None,
        }
    }

    #[test]
    fn any_matches_everything() {
        let mut bindings = Bindings::new();
        assert!(match_pattern(&Pattern::Any, &Element::var("x"), &mut bindings));
        assert!(bindings.is_empty());
    }

    #[test]
    fn var_pattern_binds_node() {
        let mut bindings = Bindings::new();
        let node = Element::literal("Int", "3");
        assert!(match_pattern(
            &Pattern::Var("n".to_string()),
            &node,
            &mut bindings
        ));
        assert_eq!(bindings.get("n"), Some(&Binding::Node(node)));
    }

    #[test]
    fn kind_pattern_requires_matching_kind() {
        let mut bindings = Bindings::new();
        let pattern = Pattern::Kind(kind_pattern("def"));
        assert!(match_pattern(
            &pattern,
            &Element::new(Kind::Def),
            &mut bindings
        ));
        assert!(!match_pattern(
            &pattern,
            &Element::new(Kind::Let),
            &mut bindings
        ));
    }

    #[test]
    fn name_var_requires_a_name() {
        let mut kp = kind_pattern("call");
        kp.name_var = Some("op".to_string());
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &Element::call("+", []), &mut bindings));
        assert_eq!(bindings.get("op"), Some(&Binding::Str("+".to_string())));

        let mut bindings = Bindings::new();
        assert!(!match_pattern(
            &pattern,
            &Element::new(Kind::Call),
            &mut bindings
        ));
    }

    #[test]
    fn attr_literal_must_equal_exactly() {
        let mut kp = kind_pattern("literal");
        kp.attrs.push(AttrPattern {
            key: "value".to_string(),
            expect: AttrExpect::Literal("0".to_string()),
        });
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(
            &pattern,
            &Element::literal("Int", "0"),
            &mut bindings
        ));
        assert!(!match_pattern(
            &pattern,
            &Element::literal("Int", "1"),
            &mut bindings
        ));
    }

    #[test]
    fn attr_missing_key_fails() {
        let mut kp = kind_pattern("param");
        kp.attrs.push(AttrPattern {
            key: "type".to_string(),
            expect: AttrExpect::Present,
        });
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(!match_pattern(
            &pattern,
            &Element::new(Kind::Param).named("x"),
            &mut bindings
        ));
    }

    #[test]
    fn attr_bind_captures_value_string() {
        let mut kp = kind_pattern("for");
        kp.attrs.push(AttrPattern {
            key: "var".to_string(),
            expect: AttrExpect::Bind("ivar".to_string()),
        });
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(
            &pattern,
            &Element::new(Kind::For).with_attr("var", "i"),
            &mut bindings
        ));
        assert_eq!(bindings.get("ivar"), Some(&Binding::Str("i".to_string())));
    }

    #[test]
    fn child_patterns_demand_equal_arity() {
        let mut kp = kind_pattern("call");
        kp.children = Some(vec![
            Pattern::Var("l".to_string()),
            Pattern::Var("r".to_string()),
        ]);
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(
            &pattern,
            &Element::call("+", [Element::var("x"), Element::var("y")]),
            &mut bindings
        ));

        let mut bindings = Bindings::new();
        assert!(!match_pattern(
            &pattern,
            &Element::call("+", [Element::var("x")]),
            &mut bindings
        ));
    }

    #[test]
    fn empty_children_pattern_requires_no_children() {
        let mut kp = kind_pattern("var");
        kp.children = Some(vec![]);
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &Element::var("x"), &mut bindings));

        let with_child = Element::new(Kind::Var).with_child(Element::var("y"));
        assert!(!match_pattern(&pattern, &with_child, &mut bindings));
    }

    #[test]
    fn rest_capture_binds_exact_tail() {
        let mut kp = kind_pattern("def");
        kp.children = Some(vec![
            Pattern::Any,
            Pattern::List(ListPattern {
                prefix: vec![],
                rest: "tail".to_string(),
            }),
        ]);
        let pattern = Pattern::Kind(kp);

        let node = Element::new(Kind::Def)
            .with_child(Element::new(Kind::Param).named("x"))
            .with_child(Element::new(Kind::Param).named("y"))
            .with_child(Element::block([]));

        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &node, &mut bindings));
        match bindings.get("tail") {
            Some(Binding::List(tail)) => {
                assert_eq!(tail.len(), 2);
                assert_eq!(tail[0].name.as_deref(), Some("y"));
            }
            other => panic!("expected list binding, got {:?}", other),
        }
    }

    #[test]
    fn rest_capture_accepts_empty_tail() {
        let mut kp = kind_pattern("block");
        kp.children = Some(vec![Pattern::List(ListPattern {
            prefix: vec![],
            rest: "stmts".to_string(),
        })]);
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &Element::block([]), &mut bindings));
        assert_eq!(bindings.get("stmts"), Some(&Binding::List(vec![])));
    }

    #[test]
    fn list_pattern_prefix_must_match() {
        let mut kp = kind_pattern("call");
        kp.children = Some(vec![Pattern::List(ListPattern {
            prefix: vec![Pattern::Kind(kind_pattern("var"))],
            rest: "rest".to_string(),
        })]);
        let pattern = Pattern::Kind(kp);

        let mut bindings = Bindings::new();
        assert!(match_pattern(
            &pattern,
            &Element::call("f", [Element::var("x"), Element::literal("Int", "1")]),
            &mut bindings
        ));

        let mut bindings = Bindings::new();
        assert!(!match_pattern(
            &pattern,
            &Element::call("f", []),
            &mut bindings
        ));
    }
}
