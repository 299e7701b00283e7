//! Module containing the default root environment: the native functions
//! `word`/`infix` leaf lookup resolves operator names to (`+`, `-`, `and`,
//! `or`, `not`, comparisons, `..`, …), installed the way a host embedding
//! would register its own builtins.

use crate::env::Env;
use crate::error::{Span, TeacupError};
use crate::value::{Callable, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn strict(f: impl Fn(&[Value], Span) -> Result<Value, TeacupError> + 'static) -> Value {
    Value::Function(Rc::new(Callable::Strict(Rc::new(f))))
}

fn lazy(
    f: impl Fn(&dyn Fn(usize) -> Result<Value, TeacupError>, usize, Span) -> Result<Value, TeacupError> + 'static,
) -> Value {
    Value::Function(Rc::new(Callable::Lazy(Rc::new(f))))
}

fn arg(args: &[Value], i: usize, span: Span) -> Result<Value, TeacupError> {
    args.get(i).cloned().ok_or_else(|| TeacupError::Type {
        message: format!("expected at least {} argument(s)", i + 1),
        span,
    })
}

fn binary_numeric(
    args: &[Value],
    span: Span,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value, TeacupError> {
    let a = arg(args, 0, span)?.as_number(span)?;
    let b = arg(args, 1, span)?.as_number(span)?;
    Ok(Value::Number(f(a, b)))
}

fn comparison(
    args: &[Value],
    span: Span,
    f: impl Fn(f64, f64) -> bool,
) -> Result<Value, TeacupError> {
    let a = arg(args, 0, span)?.as_number(span)?;
    let b = arg(args, 1, span)?.as_number(span)?;
    Ok(Value::Bool(f(a, b)))
}

/// Install the built-in operators into `env`: the `true`/`false` literals,
/// arithmetic, comparisons, short-circuiting boolean logic, the half-open
/// range constructor, and unary/prefix negation and `not`.
pub fn install(env: &Env) {
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));

    env.define("+", strict(|a, s| binary_numeric(a, s, |x, y| x + y)));
    env.define("-", strict(|a, s| binary_numeric(a, s, |x, y| x - y)));
    env.define("*", strict(|a, s| binary_numeric(a, s, |x, y| x * y)));
    env.define("/", strict(|a, s| binary_numeric(a, s, |x, y| x / y)));
    env.define("%", strict(|a, s| binary_numeric(a, s, |x, y| x.rem_euclid(y))));
    env.define("^", strict(|a, s| binary_numeric(a, s, |x, y| x.powf(y))));

    env.define("<", strict(|a, s| comparison(a, s, |x, y| x < y)));
    env.define("<=", strict(|a, s| comparison(a, s, |x, y| x <= y)));
    env.define(">", strict(|a, s| comparison(a, s, |x, y| x > y)));
    env.define(">=", strict(|a, s| comparison(a, s, |x, y| x >= y)));
    env.define("==", strict(|args, span| {
        let a = arg(args, 0, span)?;
        let b = arg(args, 1, span)?;
        Ok(Value::Bool(a == b))
    }));

    env.define(
        "..",
        strict(|args, span| {
            let from = arg(args, 0, span)?.as_number(span)? as i64;
            let to = arg(args, 1, span)?.as_number(span)? as i64;
            let items = (from..to).map(|n| Value::Number(n as f64)).collect();
            Ok(Value::List(Rc::new(RefCell::new(items))))
        }),
    );

    env.define(
        "and",
        lazy(|force, _argc, _span| {
            let left = force(0)?;
            if !left.truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(force(1)?.truthy()))
        }),
    );
    env.define(
        "or",
        lazy(|force, _argc, _span| {
            let left = force(0)?;
            if left.truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(force(1)?.truthy()))
        }),
    );

    env.define(
        "prefix:not",
        strict(|args, span| Ok(Value::Bool(!arg(args, 0, span)?.truthy()))),
    );
    env.define(
        "prefix:-",
        strict(|args, span| Ok(Value::Number(-arg(args, 0, span)?.as_number(span)?))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;

    fn call(env: &Env, name: &str, args: &[Value]) -> Value {
        let Value::Function(f) = env.get(name).unwrap() else {
            panic!("{} is not a function", name);
        };
        match &*f {
            Callable::Strict(f) => f(args, Span::default()).unwrap(),
            _ => panic!("{} is not strict", name),
        }
    }

    #[test]
    fn addition_adds() {
        let env = Env::root();
        install(&env);
        assert_eq!(
            call(&env, "+", &[Value::Number(1.0), Value::Number(2.0)]),
            Value::Number(3.0)
        );
    }

    #[test]
    fn range_is_half_open() {
        let env = Env::root();
        install(&env);
        let result = call(&env, "..", &[Value::Number(1.0), Value::Number(4.0)]);
        match result {
            Value::List(l) => {
                let items = l.borrow();
                assert_eq!(
                    *items,
                    vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
                );
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }
}
