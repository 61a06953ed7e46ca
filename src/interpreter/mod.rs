//! Execution of the element tree against an environment model.

mod eval;
mod scope;
mod value;

pub use eval::{Interpreter, RuntimeError};
pub use scope::Scope;
pub use value::{Builtin, Closure, Value};

use crate::element::Element;

/// Run a program tree with output going to stdout.
pub fn run(root: &Element) -> Result<Value, RuntimeError> {
    Interpreter::new().run_program(root)
}
