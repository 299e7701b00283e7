//! Module containing the environment chain (§9's design note): a singly
//! linked list of frames with no cycles. Lookup walks outward to the root;
//! mutation always targets the innermost frame.

use crate::value::Value;
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

struct Frame {
    bindings: RefCell<AHashMap<String, Value>>,
    parent: Option<Env>,
}

/// A cheaply-cloneable handle to one frame of the environment chain.
#[derive(Clone)]
pub struct Env(Rc<Frame>);

impl Env {
    /// A fresh root frame with no parent.
    pub fn root() -> Self {
        Env(Rc::new(Frame {
            bindings: RefCell::new(AHashMap::new()),
            parent: None,
        }))
    }

    /// A new child frame, used to give `let` bindings and function calls
    /// their own scope without mutating the enclosing one.
    pub fn child(&self) -> Self {
        Env(Rc::new(Frame {
            bindings: RefCell::new(AHashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    /// Bind `name` in this frame, shadowing any outer binding of the same
    /// name. Re-binding a name already present in this same frame replaces
    /// it — the mechanism recursive `let` bindings use to tie the knot.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Walk outward from this frame looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.0.bindings.borrow().get(name) {
            return Some(v.clone());
        }
        self.0.parent.as_ref().and_then(|p| p.get(name))
    }
}
