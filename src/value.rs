//! Module containing the runtime value representation.

use crate::ast::Operand;
use crate::env::Env;
use crate::error::{Span, TeacupError};
use ahash::AHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The capability a callable value is invoked with: either its arguments are
/// evaluated eagerly before the call, or it receives a `force(i)` callback
/// and decides for itself which arguments to evaluate — how `and`/`or`
/// short-circuit (§9's design note). Modeled as an explicit enum rather
/// than a boolean flag.
#[derive(Clone)]
pub enum Callable {
    Strict(Rc<dyn Fn(&[Value], Span) -> Result<Value, TeacupError>>),
    Lazy(Rc<dyn Fn(&dyn Fn(usize) -> Result<Value, TeacupError>, usize, Span) -> Result<Value, TeacupError>>),
    /// A user-written `params -> body` closure, capturing its defining `Env`.
    Closure {
        params: Rc<[String]>,
        body: Operand,
        env: Env,
    },
    /// A method resolved off a host object (§4.4's "method binding"): `func`
    /// is called with `receiver` prepended as its first argument, so
    /// `x.m(y)` reaches the underlying function as `m(x, y)`.
    Bound { receiver: Box<Value>, func: Rc<Callable> },
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Strict(_) => f.write_str("Callable::Strict(..)"),
            Callable::Lazy(_) => f.write_str("Callable::Lazy(..)"),
            Callable::Closure { params, .. } => {
                write!(f, "Callable::Closure(params = {:?})", params)
            }
            Callable::Bound { .. } => f.write_str("Callable::Bound(..)"),
        }
    }
}

/// A runtime value. Lists and functions are reference-counted so closures
/// and shared list literals are cheap to pass around, matching how the
/// teacher represents its dynamic values.
#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<Callable>),
    /// A host object (§3's data model): a named bag of fields supplied by
    /// the embedding, not constructible from Teacup source itself. A field
    /// whose value is a function is bound to its receiver on lookup (§4.4's
    /// "method binding"), so `x.m(y)` works.
    Object(Rc<RefCell<AHashMap<String, Value>>>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Unit => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Function(_) => true,
            Value::Object(_) => true,
        }
    }

    /// Resolve `name` as a field of a host object, binding it to its
    /// receiver if it is itself callable (§4.4's "method binding").
    pub fn get_field(&self, name: &str, span: Span) -> Result<Value, TeacupError> {
        match self {
            Value::Object(fields) => match fields.borrow().get(name) {
                Some(Value::Function(func)) => Ok(Value::Function(Rc::new(Callable::Bound {
                    receiver: Box::new(self.clone()),
                    func: func.clone(),
                }))),
                Some(value) => Ok(value.clone()),
                None => Err(TeacupError::Type {
                    message: format!("object has no field {:?}", name),
                    span,
                }),
            },
            other => Err(TeacupError::Type {
                message: format!("{} has no field {:?}", other.type_name(), name),
                span,
            }),
        }
    }

    pub fn as_number(&self, span: Span) -> Result<f64, TeacupError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(TeacupError::Type {
                message: format!("expected a number, found {}", other.type_name()),
                span,
            }),
        }
    }

    pub fn as_list(&self, span: Span) -> Result<Rc<RefCell<Vec<Value>>>, TeacupError> {
        match self {
            Value::List(l) => Ok(l.clone()),
            other => Err(TeacupError::Type {
                message: format!("expected a list, found {}", other.type_name()),
                span,
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("unit"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(l) => {
                f.write_str("[")?;
                for (i, v) in l.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Value::Function(_) => f.write_str("<function>"),
            Value::Object(_) => f.write_str("<object>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}
