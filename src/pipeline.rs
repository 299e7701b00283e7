//! Module containing the `Definition`: the bundle of a lexer, priority
//! table, handler registry and root environment that makes up one
//! independent instance of the language (§9's design note — no global
//! mutable state, so multiple `Definition`s can coexist in one process).

use crate::env::Env;
use crate::error::TeacupError;
use crate::interpreter::{HandlerFn, Interpreter};
use crate::priority::PriorityTable;
use crate::tagger;
use crate::token::{Lexer, Text};
use crate::value::Value;
use crate::{parser, stdlib};

/// A complete, independently-configurable instance of the language: its
/// token table, operator priorities, handler overrides, and root
/// environment, built once at startup and passed around explicitly.
pub struct Definition {
    lexer: Lexer,
    priorities: PriorityTable,
    interpreter: Interpreter,
    root: Env,
}

impl Definition {
    /// An empty definition with nothing registered — a blank slate for a
    /// host embedding that wants its own token table and operators.
    pub fn empty() -> Self {
        Self {
            lexer: Lexer::new(Vec::new()),
            priorities: PriorityTable::new(),
            interpreter: Interpreter::new(),
            root: Env::root(),
        }
    }

    /// The default Teacup language: the spec's token table, priority
    /// table, and built-in operators.
    pub fn teacup() -> Self {
        let root = Env::root();
        stdlib::install(&root);
        Self {
            lexer: Lexer::teacup(),
            priorities: PriorityTable::teacup(),
            interpreter: Interpreter::new(),
            root,
        }
    }

    pub fn register_handler(&mut self, key: impl Into<Text>, func: HandlerFn) -> &mut Self {
        self.interpreter.register_handler(key, func);
        self
    }

    /// Bind `name` in the root environment — the builder-style hook a host
    /// embedding uses to add its own native functions or constants.
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.root.define(name, value);
        self
    }

    /// Run the full pipeline: lex, tag, parse, evaluate.
    pub fn evaluate(&self, src: &str) -> Result<Value, TeacupError> {
        let mut tokens = self.lexer.lex(src)?;
        tagger::tag(&mut tokens);
        let ast = parser::parse(tokens, &self.priorities)?;
        match ast {
            None => Ok(Value::Unit),
            Some(root) => self.interpreter.eval(&root, &self.root),
        }
    }
}

impl Default for Definition {
    fn default() -> Self {
        Self::teacup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_evaluates_to_unit() {
        let def = Definition::teacup();
        assert_eq!(def.evaluate("").unwrap(), Value::Unit);
    }

    #[test]
    fn lexer_errors_propagate() {
        let def = Definition::teacup();
        assert!(def.evaluate("1 ` 2").is_err());
    }

    #[test]
    fn two_definitions_do_not_share_state() {
        let mut a = Definition::teacup();
        a.define("answer", Value::Number(42.0));
        let b = Definition::teacup();
        assert_eq!(a.evaluate("answer").unwrap(), Value::Number(42.0));
        assert!(b.evaluate("answer").is_err());
    }
}
