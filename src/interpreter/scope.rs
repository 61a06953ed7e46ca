use std::collections::HashMap;

use super::value::{Builtin, CapturedEnv, Value};

type ScopeFrame = HashMap<String, Value>;

/// Manages lexical scoping during interpretation.
///
/// The global frame sits at the bottom of the stack and is never popped, so
/// top-level definitions stay visible inside function bodies; that is what
/// makes recursion (and mutual recursion between top-level `def`s) work.
pub struct Scope {
    frames: Vec<ScopeFrame>,
}

impl Scope {
    /// Create a scope with the builtin functions pre-loaded into the global
    /// frame.
    pub fn new() -> Self {
        let mut global_frame: ScopeFrame = HashMap::new();
        global_frame.insert("println".to_string(), Value::Builtin(Builtin::Println));
        global_frame.insert("toString".to_string(), Value::Builtin(Builtin::ToString));
        global_frame.insert("error".to_string(), Value::Builtin(Builtin::Error));

        Self {
            frames: vec![global_frame],
        }
    }

    /// Capture the current environment for a closure
    pub fn capture(&self) -> CapturedEnv {
        let mut captured = HashMap::new();
        for frame in &self.frames {
            captured.extend(frame.clone());
        }
        CapturedEnv(captured)
    }

    /// Enter a new scope frame
    pub fn enter(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Leave the current scope frame
    pub fn leave(&mut self) {
        self.frames.pop();
    }

    /// Push a captured environment as a temporary frame
    pub fn push_captured(&mut self, captured: &CapturedEnv) {
        self.frames.push(captured.0.clone());
    }

    /// Resolve a name by searching from innermost to outermost scope
    pub fn resolve(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.contains_key(name))
            .and_then(|frame| frame.get(name))
            .cloned()
    }

    /// Add a binding to the current (innermost) scope
    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        self.frames
            .last_mut()
            .expect("scope stack should not be empty")
            .insert(name.into(), value);
    }

    /// Overwrite the nearest enclosing binding of `name`. Returns false if
    /// no frame binds it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_searches_innermost_first() {
        let mut scope = Scope::new();
        scope.add("x", Value::Int(1));
        scope.enter();
        scope.add("x", Value::Int(2));
        assert_eq!(scope.resolve("x"), Some(Value::Int(2)));
        scope.leave();
        assert_eq!(scope.resolve("x"), Some(Value::Int(1)));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let mut scope = Scope::new();
        scope.add("x", Value::Int(1));
        scope.enter();
        assert!(scope.assign("x", Value::Int(5)));
        scope.leave();
        assert_eq!(scope.resolve("x"), Some(Value::Int(5)));
    }

    #[test]
    fn assign_to_unbound_fails() {
        let mut scope = Scope::new();
        assert!(!scope.assign("missing", Value::Unit));
    }

    #[test]
    fn capture_flattens_all_frames() {
        let mut scope = Scope::new();
        scope.add("x", Value::Int(1));
        scope.enter();
        scope.add("y", Value::Int(2));
        let captured = scope.capture();
        assert_eq!(captured.0.get("x"), Some(&Value::Int(1)));
        assert_eq!(captured.0.get("y"), Some(&Value::Int(2)));
    }
}
