//! Module containing error definitions for the Teacup pipeline.

use std::fmt;

/// A source span, in byte offsets, covering the input that produced a
/// token, node, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline(always)]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The span covering both `self` and `other`, in source order.
    #[inline]
    pub fn join(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The error taxonomy for the whole pipeline (§7 of the language spec).
///
/// Every stage fails fast: the first error aborts the pipeline and any
/// partially-built token stream, AST, or evaluation result is discarded.
#[derive(Debug)]
#[non_exhaustive]
pub enum TeacupError {
    /// The source contains a character no lexer rule can consume.
    Lex { text: String, at: usize },
    /// A token has no priority entry under any of the three fallback keys.
    UnknownOperator { text: String, span: Span },
    /// No handler's key matched a node's signature.
    UnknownNodeType { signature: String, span: Span },
    /// A `let`/lambda binding target was not a name-like token.
    InvalidBindingTarget { found: String, span: Span },
    /// A name was not found anywhere in the environment chain.
    UndefinedVariable { name: String, span: Span },
    /// Arithmetic, indexing, or a call was attempted on an incompatible value.
    Type { message: String, span: Span },
    /// The parser needed a specific token (a closing bracket, a `then`, the
    /// end of input, …) and found something else instead.
    UnexpectedToken { found: String, span: Span },
}

impl std::error::Error for TeacupError {}

impl fmt::Display for TeacupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex { text, at } => write!(f, "lex error: cannot tokenize {:?} at {}", text, at),
            Self::UnknownOperator { text, span } => {
                write!(f, "syntax error: unknown operator {:?} at {}", text, span)
            }
            Self::UnknownNodeType { signature, span } => write!(
                f,
                "syntax error: unknown node type {:?} at {}",
                signature, span
            ),
            Self::InvalidBindingTarget { found, span } => write!(
                f,
                "syntax error: invalid binding target {:?} at {}",
                found, span
            ),
            Self::UndefinedVariable { name, span } => {
                write!(f, "reference error: undefined variable {:?} at {}", name, span)
            }
            Self::Type { message, span } => write!(f, "type error: {} at {}", message, span),
            Self::UnexpectedToken { found, span } => {
                write!(f, "syntax error: unexpected token {:?} at {}", found, span)
            }
        }
    }
}

pub type TeacupResult<T> = Result<T, TeacupError>;
