//! Source-level tests for the type inferencer.

use treep::types::TypeEnv;
use treep::TreepError;

fn check(source: &str) -> TypeEnv {
    let (_, env) = treep::check_source(source).expect("type checking failed");
    env
}

fn check_err(source: &str) -> TreepError {
    match treep::check_source(source) {
        Ok(_) => panic!("expected a type error for: {source}"),
        Err(err) => err,
    }
}

fn scheme_of(env: &TypeEnv, name: &str) -> String {
    env.lookup(name)
        .unwrap_or_else(|| panic!("no binding for {name}"))
        .pretty()
}

#[test]
fn add_is_int_to_int_to_int() {
    let env = check("def add(x, y) { return x + y }");
    assert_eq!(scheme_of(&env, "add"), "Int -> Int -> Int");
}

#[test]
fn declared_types_are_respected() {
    let env = check("def add(x: Int, y: Int) returns: Int { return x + y }");
    assert_eq!(scheme_of(&env, "add"), "Int -> Int -> Int");
}

#[test]
fn declared_return_type_mismatch_fails() {
    let err = check_err("def f(x: Int) returns: String { return x + 1 }");
    assert!(matches!(err, TreepError::Type(_)));
}

#[test]
fn factorial_is_int_to_int() {
    let env = check(
        "def factorial(n) {
             if (n == 0) { return 1 }
             return n * factorial(n - 1)
         }",
    );
    assert_eq!(scheme_of(&env, "factorial"), "Int -> Int");
}

#[test]
fn identity_is_polymorphic_across_uses() {
    // Let-polymorphism: one program uses identity at Int and at String.
    let env = check(
        "def identity(x) { return x }
         def main() returns: Int {
             let a = identity(42)
             let b = identity(\"x\")
             println(b)
             return a
         }",
    );
    let scheme = env.lookup("identity").unwrap();
    assert_eq!(scheme.vars.len(), 1, "identity should be quantified");
}

#[test]
fn identity_applications_get_separate_instances() {
    let env = check(
        "def identity(x) { return x }
         let a = identity(42)
         let b = identity(\"x\")",
    );
    assert_eq!(scheme_of(&env, "a"), "Int");
    assert_eq!(scheme_of(&env, "b"), "String");
}

#[test]
fn recursive_def_through_name_checks() {
    let env = check("def loop(x) { return loop(x) }");
    let scheme = env.lookup("loop").unwrap();
    // forall a b. a -> b
    assert_eq!(scheme.vars.len(), 2);
}

#[test]
fn direct_self_application_is_rejected_by_occurs_check() {
    // x(x) forces 'a = 'a -> 'b
    let err = check_err("def apply_self(x) { return x(x) }");
    assert!(matches!(err, TreepError::Type(_)));
    assert!(err.to_string().contains("infinite type"));
}

#[test]
fn unbound_identifier_is_a_type_error() {
    let err = check_err("let x = nowhere");
    assert!(matches!(err, TreepError::Type(_)));
    assert!(err.to_string().contains("unbound identifier"));
}

#[test]
fn call_arity_overflow_is_a_unification_failure() {
    let err = check_err("def f(x) { return x + 1 } let y = f(1, 2)");
    assert!(matches!(err, TreepError::Type(_)));
    assert!(err.to_string().contains("cannot unify"));
}

#[test]
fn operator_argument_mismatch_fails() {
    let err = check_err("let x = 1 * \"two\"");
    assert!(matches!(err, TreepError::Type(_)));
}

#[test]
fn condition_must_be_bool() {
    let err = check_err("if (1) { println(1) }");
    assert!(matches!(err, TreepError::Type(_)));
}

#[test]
fn if_branches_must_agree() {
    let err = check_err(
        "def pick(flag) {
             if (flag) { return 1 } else { return \"one\" }
         }",
    );
    assert!(matches!(err, TreepError::Type(_)));
}

#[test]
fn while_and_for_are_unit() {
    let env = check(
        "def spin() {
             let total = 0
             for (i = 1, 10) { total = total + i }
             while (total > 0) { dec(total) }
             return total
         }",
    );
    assert_eq!(scheme_of(&env, "spin"), "Int");
}

#[test]
fn for_variable_is_int_in_body() {
    let err = check_err("for (i = 1, 3) { let b = i && true }");
    assert!(matches!(err, TreepError::Type(_)));
}

#[test]
fn builtins_are_polymorphic() {
    let env = check(
        "println(1)
         println(\"two\")
         let s = toString(true)",
    );
    assert_eq!(scheme_of(&env, "s"), "String");
}

#[test]
fn string_concatenation_types_through_the_overload_hatch() {
    // `+` is declared Int -> Int -> Int, with an ad-hoc exception: once
    // either operand is a String the call concatenates and types String,
    // matching the runtime overload.
    let env = check("let s = \"a\" + \"b\" let t = \"n = \" + 1");
    assert_eq!(scheme_of(&env, "s"), "String");
    assert_eq!(scheme_of(&env, "t"), "String");
}

#[test]
fn let_is_not_self_referential() {
    let err = check_err("let x = x + 1");
    assert!(matches!(err, TreepError::Type(_)));
    assert!(err.to_string().contains("unbound identifier"));
}

#[test]
fn multiple_type_errors_are_collected() {
    let err = check_err("let a = missing1 let b = missing2");
    let rendered = err.to_string();
    assert!(rendered.contains("missing1"));
    assert!(rendered.contains("missing2"));
}

#[test]
fn macro_definitions_are_not_typed() {
    // The template references $x and calls undefined names; the checker
    // must skip it entirely.
    let env = check("macro twice pattern($x) expand { $x + $x } let y = 1");
    assert_eq!(scheme_of(&env, "y"), "Int");
}
