use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::object::Value;

/// A lexical scope chain: bindings plus an optional outer scope. The handle
/// is a shared pointer; closures and loop bodies capture it by clone, so a
/// mutation through one handle is visible through every other.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

#[derive(Default)]
struct Scope {
    store: HashMap<String, Value>,
    outer: Option<Env>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(outer: &Env) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Resolves `name`, walking outward through the chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        match scope.store.get(name) {
            Some(value) => Some(value.clone()),
            None => scope.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().store.insert(name.to_string(), value);
    }

    /// Rebinds `name` in the innermost scope that already contains it.
    /// Returns whether any scope in the chain did.
    pub fn set_on_found(&self, name: &str, value: Value) -> bool {
        let mut scope = self.0.borrow_mut();
        if scope.store.contains_key(name) {
            scope.store.insert(name.to_string(), value);
            return true;
        }

        match &scope.outer {
            Some(outer) => outer.set_on_found(name, value),
            None => false,
        }
    }
}

// environments form cycles with the closures they bind, so the derived
// representation would never terminate
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Env")
    }
}
