//! Module containing the tree-walking interpreter (§4.4): evaluation
//! dispatches on a node's shape rather than walking a fixed set of AST
//! variant types, mirroring the spec's "signature string" design but,
//! per its own redesign note, implemented as a match over a classified
//! shape with the signature string kept around for diagnostics and for
//! the handler registry below.

use crate::ast::{Node, Operand};
use crate::env::Env;
use crate::error::{Span, TeacupError};
use crate::token::{Text, Token, TokenKind};
use crate::value::{Callable, Value};
use std::rc::Rc;

pub type HandlerFn = Rc<dyn Fn(&Interpreter, &Operand, &Env) -> Result<Value, TeacupError>>;

/// One registered override: `key` matches a node's `signature` (or, for a
/// leaf operand, its bare token-kind name).
pub struct Handler {
    pub key: Text,
    pub func: HandlerFn,
}

/// The ordered handler registry plus the built-in grammar fallback.
///
/// User overrides installed via [`register_handler`](Self::register_handler)
/// are consulted most-recently-registered first; the built-in forms below
/// act as the lowest-priority fallback, exactly as if they had been
/// registered before anything else.
#[derive(Default)]
pub struct Interpreter {
    handlers: Vec<Handler>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register_handler(&mut self, key: impl Into<Text>, func: HandlerFn) -> &mut Self {
        self.handlers.push(Handler {
            key: key.into(),
            func,
        });
        self
    }

    fn custom_handler(&self, key: &str) -> Option<&Handler> {
        self.handlers.iter().rev().find(|h| h.key == key)
    }

    pub fn eval(&self, operand: &Operand, env: &Env) -> Result<Value, TeacupError> {
        match operand {
            Operand::None => Ok(Value::Unit),
            Operand::Leaf(tok) => {
                if let Some(handler) = self.custom_handler(tok.kind.name()) {
                    return (handler.func)(self, operand, env);
                }
                self.eval_leaf(tok, env)
            }
            Operand::Node(node) => {
                if let Some(handler) = self.custom_handler(node.signature.as_str()) {
                    return (handler.func)(self, operand, env);
                }
                self.eval_node(node, env)
            }
        }
    }

    fn eval_leaf(&self, tok: &Token, env: &Env) -> Result<Value, TeacupError> {
        match tok.kind {
            TokenKind::Word | TokenKind::Infix => env.get(tok.text.as_str()).ok_or_else(|| {
                TeacupError::UndefinedVariable {
                    name: tok.text.to_string(),
                    span: tok.span(),
                }
            }),
            TokenKind::Prefix => {
                let name = format!("prefix:{}", tok.text);
                env.get(&name).ok_or_else(|| TeacupError::UndefinedVariable {
                    name,
                    span: tok.span(),
                })
            }
            TokenKind::Number => tok
                .text
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| TeacupError::Type {
                    message: format!("{:?} is not a valid number literal", tok.text),
                    span: tok.span(),
                }),
            TokenKind::String => {
                let s = tok.text.as_str();
                let inner = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s);
                Ok(Value::String(Rc::from(unescape(inner))))
            }
            other => Err(TeacupError::UnknownNodeType {
                signature: other.name().to_string(),
                span: tok.span(),
            }),
        }
    }

    fn eval_node(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let ops: Vec<&str> = node.ops.iter().map(|t| t.text.as_str()).collect();

        if !ops.is_empty() && ops.iter().all(|o| matches!(*o, "," | ";" | "\n")) {
            return self.eval_sequence(node, env);
        }

        match ops.as_slice() {
            ["(", ")"] if node.operands[0].is_none() => self.eval(&node.operands[1], env),
            ["(", ")"] => self.eval_call(node, env),
            ["[", "]"] if node.operands[0].is_none() => self.eval_list_literal(node, env),
            ["[", "]"] => self.eval_index(node, env),
            ["begin", "end"] => self.eval(&node.operands[1], env),
            ["->"] => self.eval_lambda(node, env),
            ["."] => self.eval_field(node, env),
            _ if node.ops[0].text == "if" => self.eval_if(node, env),
            _ if node.ops[0].text == "let" => self.eval_let(node, env),
            _ if node.ops[0].text == "for" => self.eval_for(node, env),
            _ if ops.len() == 1 => self.eval_operator(node, env),
            _ if ops.len() > 1 && ops.iter().all(|o| o == &ops[0]) => self.eval_comparison_chain(node, env),
            _ => Err(TeacupError::UnknownNodeType {
                signature: node.signature.to_string(),
                span: node.span,
            }),
        }
    }

    fn eval_sequence(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let mut last = Value::Unit;
        for operand in &node.operands {
            last = self.eval(operand, env)?;
        }
        Ok(last)
    }

    /// `_ OP E` (prefix call) or `E OP E` (binary call), where `OP` is an
    /// operator symbol or `and`/`or`/`not`: resolve the callee, normalize
    /// and evaluate the arguments, then invoke it.
    fn eval_operator(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let op = &node.ops[0];
        let callee = if op.kind == TokenKind::Prefix {
            let name = format!("prefix:{}", op.text);
            env.get(&name).ok_or_else(|| TeacupError::UndefinedVariable {
                name,
                span: op.span(),
            })?
        } else {
            env.get(op.text.as_str()).ok_or_else(|| TeacupError::UndefinedVariable {
                name: op.text.to_string(),
                span: op.span(),
            })?
        };
        let args: Vec<&Operand> = node.args().collect();
        self.invoke(callee, &args, env, node.span)
    }

    fn eval_comparison_chain(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let op = node.ops[0].text.clone();
        let callee = env.get(op.as_str()).ok_or_else(|| TeacupError::UndefinedVariable {
            name: op.to_string(),
            span: node.ops[0].span(),
        })?;
        for pair in node.operands.windows(2) {
            let result = self.invoke(callee.clone(), &[&pair[0], &pair[1]], env, node.span)?;
            if !result.truthy() {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    }

    /// Call normalization: dispatch on the callee's [`Callable`] variant,
    /// evaluating arguments eagerly for [`Callable::Strict`] and passing
    /// thunks for [`Callable::Lazy`] so it can short-circuit.
    fn invoke(&self, callee: Value, args: &[&Operand], env: &Env, span: Span) -> Result<Value, TeacupError> {
        let function = match callee {
            Value::Function(f) => f,
            other => {
                return Err(TeacupError::Type {
                    message: format!("{} is not callable", other.type_name()),
                    span,
                })
            }
        };
        match &*function {
            Callable::Strict(f) => {
                let values: Vec<Value> = args
                    .iter()
                    .map(|a| self.eval(a, env))
                    .collect::<Result<_, _>>()?;
                f(&values, span)
            }
            Callable::Lazy(f) => {
                let force = |i: usize| self.eval(args[i], env);
                f(&force, args.len(), span)
            }
            Callable::Closure { params, body, env: closure_env } => {
                if params.len() != args.len() {
                    return Err(TeacupError::Type {
                        message: format!("expected {} argument(s), found {}", params.len(), args.len()),
                        span,
                    });
                }
                let call_env = closure_env.child();
                for (param, arg) in params.iter().zip(args) {
                    let value = self.eval(arg, env)?;
                    call_env.define(param.clone(), value);
                }
                self.eval(body, &call_env)
            }
            Callable::Bound { receiver, func } => {
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push((**receiver).clone());
                for a in args {
                    values.push(self.eval(a, env)?);
                }
                self.invoke_values(func, &values, span)
            }
        }
    }

    /// Invoke an already-resolved [`Callable`] against already-evaluated
    /// argument values, used when the arguments are fixed ahead of time (a
    /// bound method's prepended receiver) rather than unevaluated operands.
    fn invoke_values(&self, function: &Callable, values: &[Value], span: Span) -> Result<Value, TeacupError> {
        match function {
            Callable::Strict(f) => f(values, span),
            Callable::Lazy(f) => {
                let force = |i: usize| {
                    values.get(i).cloned().ok_or_else(|| TeacupError::Type {
                        message: format!("expected at least {} argument(s)", i + 1),
                        span,
                    })
                };
                f(&force, values.len(), span)
            }
            Callable::Closure { params, body, env: closure_env } => {
                if params.len() != values.len() {
                    return Err(TeacupError::Type {
                        message: format!("expected {} argument(s), found {}", params.len(), values.len()),
                        span,
                    });
                }
                let call_env = closure_env.child();
                for (param, value) in params.iter().zip(values) {
                    call_env.define(param.clone(), value.clone());
                }
                self.eval(body, &call_env)
            }
            Callable::Bound { receiver, func } => {
                let mut full = Vec::with_capacity(values.len() + 1);
                full.push((**receiver).clone());
                full.extend_from_slice(values);
                self.invoke_values(func, &full, span)
            }
        }
    }

    /// `E ( E ) _` / `E ( _ ) _`: the left operand is the callee, evaluated
    /// in the caller's environment; the right operand is the argument list.
    fn eval_call(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let callee = self.eval(&node.operands[0], env)?;
        let args = flatten_call_args(&node.operands[1]);
        self.invoke(callee, &args, env, node.span)
    }

    /// `E [ E ] _`: indexing. Chained indexing (`x[i][j]`) falls out for
    /// free, since the parser nests postfix `[...]` applications and this
    /// handler only ever sees one index at a time.
    fn eval_index(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let target = self.eval(&node.operands[0], env)?;
        let index = self.eval(&node.operands[1], env)?;
        let list = target.as_list(node.span)?;
        let i = index.as_number(node.span)? as i64;
        let items = list.borrow();
        let idx = if i < 0 { i + items.len() as i64 } else { i };
        items
            .get(idx as usize)
            .cloned()
            .ok_or_else(|| TeacupError::Type {
                message: format!("index {} out of bounds (length {})", i, items.len()),
                span: node.span,
            })
    }

    fn eval_list_literal(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let elements = match &node.operands[1] {
            Operand::None => Vec::new(),
            other => flatten_call_args(other)
                .into_iter()
                .map(|o| self.eval(o, env))
                .collect::<Result<_, _>>()?,
        };
        Ok(Value::List(Rc::new(std::cell::RefCell::new(elements))))
    }

    /// `E . E`: field access. The right operand is a literal name when it
    /// is a bare `word` token; otherwise it is evaluated to a string (§9's
    /// preserved asymmetry). `length` is a built-in field on lists; every
    /// other receiver resolves its field through [`Value::get_field`],
    /// which binds a callable field to its receiver (§4.4's "method
    /// binding") so `x.m(y)` works.
    fn eval_field(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let receiver = self.eval(&node.operands[0], env)?;
        let name = match &node.operands[1] {
            Operand::Leaf(tok) if tok.kind == TokenKind::Word => tok.text.as_str().to_string(),
            other => match self.eval(other, env)? {
                Value::String(s) => s.to_string(),
                other => {
                    return Err(TeacupError::Type {
                        message: format!("field name must be a string, found {}", other.type_name()),
                        span: node.span,
                    })
                }
            },
        };
        match &receiver {
            Value::List(list) if name == "length" => Ok(Value::Number(list.borrow().len() as f64)),
            _ => receiver.get_field(&name, node.span),
        }
    }

    /// `_ if E then E (elif E then E)* (else E)? end _`.
    fn eval_if(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let mut i = 1;
        while i + 1 < node.operands.len() {
            let op_text = node.ops[i - 1].text.as_str();
            if op_text == "if" || op_text == "elif" {
                let cond = self.eval(&node.operands[i], env)?;
                if cond.truthy() {
                    return self.eval(&node.operands[i + 1], env);
                }
                i += 2;
            } else if op_text == "else" {
                return self.eval(&node.operands[i], env);
            } else {
                break;
            }
        }
        Ok(Value::Unit)
    }

    /// `_ let E in E end _`: sequential, possibly-recursive bindings in a
    /// fresh child environment.
    fn eval_let(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let scope = env.child();
        for binding in flatten_comma(&node.operands[1]) {
            self.eval_binding(binding, &scope)?;
        }
        self.eval(&node.operands[2], &scope)
    }

    /// Each binding is installed into `scope` as soon as its value is ready,
    /// so later sibling bindings (and, for function bindings, the function
    /// itself) can refer to it — this is what makes `let x = 10, y = x + 1`
    /// and recursive `let fact(n) = ...` both resolve correctly.
    fn eval_binding(&self, binding: &Operand, scope: &Env) -> Result<(), TeacupError> {
        let Operand::Node(bind) = binding else {
            return Err(TeacupError::InvalidBindingTarget {
                found: format!("{}", binding),
                span: binding.span().unwrap_or_default(),
            });
        };
        if bind.ops.len() != 1 || bind.ops[0].text != "=" {
            return Err(TeacupError::InvalidBindingTarget {
                found: format!("{}", bind),
                span: bind.span,
            });
        }
        match &bind.operands[0] {
            Operand::Leaf(tok) if matches!(tok.kind, TokenKind::Word) => {
                let value = self.eval(&bind.operands[1], scope)?;
                scope.define(tok.text.as_str(), value);
                Ok(())
            }
            Operand::Node(call) if call.ops.as_slice().iter().map(|t| t.text.as_str()).collect::<Vec<_>>() == ["(", ")"] => {
                let Operand::Leaf(name_tok) = &call.operands[0] else {
                    return Err(TeacupError::InvalidBindingTarget {
                        found: format!("{}", call.operands[0]),
                        span: call.span,
                    });
                };
                let params = flatten_call_args(&call.operands[1])
                    .into_iter()
                    .map(|o| param_name(o))
                    .collect::<Result<Vec<_>, _>>()?;
                let closure = Callable::Closure {
                    params: params.into(),
                    body: bind.operands[1].clone(),
                    env: scope.clone(),
                };
                scope.define(name_tok.text.as_str(), Value::Function(Rc::new(closure)));
                Ok(())
            }
            other => Err(TeacupError::InvalidBindingTarget {
                found: format!("{}", other),
                span: bind.span,
            }),
        }
    }

    /// `_ for E in E do E end _` / `_ for E in E when E do E end _`: a list
    /// comprehension, optionally filtered.
    fn eval_for(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let var = param_name(&node.operands[1])?;
        let iterable = self.eval(&node.operands[2], env)?;
        let list = iterable.as_list(node.span)?;

        let has_when = node.ops.iter().any(|t| t.text == "when");
        let (when_idx, body_idx) = if has_when { (3, 4) } else { (usize::MAX, 3) };

        let mut out = Vec::new();
        for item in list.borrow().iter() {
            let loop_env = env.child();
            loop_env.define(var.clone(), item.clone());
            if has_when {
                let cond = self.eval(&node.operands[when_idx], &loop_env)?;
                if !cond.truthy() {
                    continue;
                }
            }
            out.push(self.eval(&node.operands[body_idx], &loop_env)?);
        }
        Ok(Value::List(Rc::new(std::cell::RefCell::new(out))))
    }

    /// `E -> E`: a lambda. The left operand is the (possibly
    /// unparenthesized, comma-separated) parameter list; it closes over
    /// the defining environment.
    fn eval_lambda(&self, node: &Rc<Node>, env: &Env) -> Result<Value, TeacupError> {
        let params = flatten_call_args(&node.operands[0])
            .into_iter()
            .map(param_name)
            .collect::<Result<Vec<_>, _>>()?;
        let closure = Callable::Closure {
            params: params.into(),
            body: node.operands[1].clone(),
            env: env.clone(),
        };
        Ok(Value::Function(Rc::new(closure)))
    }
}

/// A call/lambda-parameter operand is either a lone argument, a
/// comma-flattened chain of arguments (`E , E , E`), or an empty slot (zero
/// arguments) — possibly wrapped in a redundant `( ... )` grouping, as a
/// lambda's parameter list always is when written `() -> ...` or
/// `(x, y) -> ...`. Unwrap the grouping, if any, then flatten commas.
fn flatten_call_args(operand: &Operand) -> Vec<&Operand> {
    flatten_comma(unwrap_group(operand))
}

/// `_ ( E ) _` / `_ ( _ ) _`: a bare parenthesized grouping (as opposed to a
/// call, which has a non-`NONE` left operand) — peel it back to its inner
/// operand so callers can see through it.
fn unwrap_group(operand: &Operand) -> &Operand {
    match operand {
        Operand::Node(n)
            if n.ops.len() == 2
                && n.ops[0].text == "("
                && n.ops[1].text == ")"
                && n.operands[0].is_none() =>
        {
            &n.operands[1]
        }
        other => other,
    }
}

fn flatten_comma(operand: &Operand) -> Vec<&Operand> {
    match operand {
        Operand::None => Vec::new(),
        Operand::Node(n) if n.ops.iter().all(|t| t.text == ",") && !n.ops.is_empty() => {
            n.operands.iter().collect()
        }
        other => vec![other],
    }
}

fn param_name(operand: &Operand) -> Result<String, TeacupError> {
    match operand {
        Operand::Leaf(tok) if matches!(tok.kind, TokenKind::Word) => Ok(tok.text.to_string()),
        other => Err(TeacupError::InvalidBindingTarget {
            found: format!("{}", other),
            span: other.span().unwrap_or_default(),
        }),
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Definition;

    fn run(src: &str) -> Value {
        Definition::teacup().evaluate(src).unwrap()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("1 + 2 * 3"), Value::Number(7.0));
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(run("2 ^ 3 ^ 2"), Value::Number(512.0));
    }

    #[test]
    fn unary_minus() {
        assert_eq!(run("-3 + 4"), Value::Number(1.0));
    }

    #[test]
    fn let_bindings_see_earlier_siblings() {
        assert_eq!(run("let x = 10, y = x + 1 in y * 2 end"), Value::Number(22.0));
    }

    #[test]
    fn recursive_function() {
        assert_eq!(
            run("let fact(n) = if n == 0 then 1 else n * fact(n - 1) end in fact(5) end"),
            Value::Number(120.0)
        );
    }

    #[test]
    fn list_comprehension_with_filter() {
        let result = run("for x in 1 .. 6 when x % 2 == 0 do x * x end");
        match result {
            Value::List(l) => {
                let items = l.borrow();
                assert_eq!(*items, vec![Value::Number(4.0), Value::Number(16.0)]);
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn or_short_circuits() {
        assert_eq!(run("true or (1 / 0)"), Value::Bool(true));
    }

    #[test]
    fn false_is_bound_too() {
        assert_eq!(run("false or true"), Value::Bool(true));
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        assert_eq!(
            run("let y = 1, f = (x -> x + y) in let y = 99 in f(0) end end"),
            Value::Number(1.0)
        );
    }

    #[test]
    fn zero_parameter_lambda_is_called_with_an_empty_argument_list() {
        assert_eq!(run("let f = (() -> 42) in f() end"), Value::Number(42.0));
    }

    #[test]
    fn a_host_object_method_is_bound_to_its_receiver() {
        use crate::value::Callable;
        use ahash::AHashMap;
        use std::cell::RefCell;

        let mut def = Definition::teacup();
        let mut fields = AHashMap::new();
        fields.insert(
            "double".to_string(),
            Value::Function(Rc::new(Callable::Strict(Rc::new(|args: &[Value], span: Span| {
                let Value::Object(receiver) = &args[0] else {
                    panic!("expected the bound receiver as the first argument");
                };
                let Some(Value::Number(n)) = receiver.borrow().get("n").cloned() else {
                    panic!("expected a numeric field `n`");
                };
                Ok(Value::Number(n * args[1].as_number(span)?))
            })))),
        );
        fields.insert("n".to_string(), Value::Number(21.0));
        def.define("counter", Value::Object(Rc::new(RefCell::new(fields))));

        assert_eq!(def.evaluate("counter.double(2)").unwrap(), Value::Number(42.0));
    }
}
