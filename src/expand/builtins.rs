//! The built-in macro catalog.
//!
//! Every expansion builds a fresh tree out of the bound arguments. Bodies
//! that arrive through the block-argument form are zero-parameter lambdas;
//! `lift` unwraps those back to their block so `when(c) { … }` produces a
//! plain `if` with a block branch.

use crate::element::{Element, Kind};

use super::{Expander, MacroRule};

/// If `body` is a lambda whose only child is a block, return that block;
/// otherwise wrap the node in a single-statement block.
fn lift(body: &Element) -> Element {
    if body.kind == Kind::Lambda && body.children.len() == 1 && body.children[0].kind == Kind::Block
    {
        body.children[0].clone()
    } else {
        Element::block([body.clone()])
    }
}

pub(super) fn register_all(expander: &mut Expander) {
    // when(cond) { body }  =>  if (cond) { body }
    expander.register(
        "when",
        MacroRule::new(vec!["cond", "body"], |args| {
            let cond = args.get("cond")?;
            let body = args.get("body")?;
            Ok(Element::new(Kind::If)
                .with_child(Element::condition(cond.clone()))
                .with_child(lift(body)))
        }),
    );

    // assert(cond)  =>  if (!cond) { error("Assertion failed") }
    expander.register(
        "assert",
        MacroRule::new(vec!["cond"], |args| {
            let cond = args.get("cond")?;
            Ok(Element::new(Kind::If)
                .with_child(Element::condition(Element::call(
                    "unary_!",
                    [cond.clone()],
                )))
                .with_child(Element::block([Element::call(
                    "error",
                    [Element::literal("String", "Assertion failed")],
                )])))
        }),
    );

    // debug(expr)  =>  println("Debug: " + toString(expr))
    expander.register(
        "debug",
        MacroRule::new(vec!["expr"], |args| {
            let expr = args.get("expr")?;
            Ok(Element::call(
                "println",
                [Element::call(
                    "+",
                    [
                        Element::literal("String", "Debug: "),
                        Element::call("toString", [expr.clone()]),
                    ],
                )],
            ))
        }),
    );

    // log(msg)  =>  println("[LOG] " + msg)
    expander.register(
        "log",
        MacroRule::new(vec!["msg"], |args| {
            let msg = args.get("msg")?;
            Ok(Element::call(
                "println",
                [Element::call(
                    "+",
                    [Element::literal("String", "[LOG] "), msg.clone()],
                )],
            ))
        }),
    );

    // trace(expr)  =>  a block that evaluates expr once, prints it, and
    // yields it. The binding name is reserved, so it cannot shadow user code.
    expander.register(
        "trace",
        MacroRule::new(vec!["expr"], |args| {
            let expr = args.get("expr")?;
            Ok(Element::block([
                Element::binding("__trace_result", expr.clone()),
                Element::call(
                    "println",
                    [Element::call(
                        "+",
                        [
                            Element::literal("String", "Trace: "),
                            Element::call("toString", [Element::var("__trace_result")]),
                        ],
                    )],
                ),
                Element::var("__trace_result"),
            ]))
        }),
    );

    // inc(x)  =>  x = x + 1
    expander.register(
        "inc",
        MacroRule::new(vec!["x"], |args| {
            let x = args.get("x")?;
            Ok(Element::call(
                "=",
                [
                    x.clone(),
                    Element::call("+", [x.clone(), Element::literal("Int", "1")]),
                ],
            ))
        }),
    );

    // dec(x)  =>  x = x - 1
    expander.register(
        "dec",
        MacroRule::new(vec!["x"], |args| {
            let x = args.get("x")?;
            Ok(Element::call(
                "=",
                [
                    x.clone(),
                    Element::call("-", [x.clone(), Element::literal("Int", "1")]),
                ],
            ))
        }),
    );

    // ifZero(x) { body }  =>  if (x == 0) { body }
    expander.register(
        "ifZero",
        MacroRule::new(vec!["x", "body"], |args| {
            let x = args.get("x")?;
            let body = args.get("body")?;
            Ok(Element::new(Kind::If)
                .with_child(Element::condition(Element::call(
                    "==",
                    [x.clone(), Element::literal("Int", "0")],
                )))
                .with_child(lift(body)))
        }),
    );

    // ifPositive(x) { body }  =>  if (x > 0) { body }
    expander.register(
        "ifPositive",
        MacroRule::new(vec!["x", "body"], |args| {
            let x = args.get("x")?;
            let body = args.get("body")?;
            Ok(Element::new(Kind::If)
                .with_child(Element::condition(Element::call(
                    ">",
                    [x.clone(), Element::literal("Int", "0")],
                )))
                .with_child(lift(body)))
        }),
    );

    // until(cond) { body }  =>  while (!cond) { body }
    expander.register(
        "until",
        MacroRule::new(vec!["cond", "body"], |args| {
            let cond = args.get("cond")?;
            let body = args.get("body")?;
            Ok(Element::new(Kind::While)
                .with_child(Element::condition(Element::call(
                    "unary_!",
                    [cond.clone()],
                )))
                .with_child(lift(body)))
        }),
    );
}
