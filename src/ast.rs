//! Module containing the uniform AST node model (§3): an ordered sequence
//! alternating operand slots and operator tokens, dispatched at evaluation
//! time purely by its `signature` string.

use crate::error::Span;
use crate::token::{Text, Token};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Most nodes are binary (one operator, two operands); inline storage for
/// that common case avoids a heap allocation per node.
pub type OperandList = SmallVec<[Operand; 2]>;
pub type OpList = SmallVec<[Token; 1]>;

/// One operand slot: either a nested node, a leaf token, or the empty slot.
#[derive(Debug, Clone)]
pub enum Operand {
    /// The empty slot, written `NONE` in the spec.
    None,
    /// A leaf token — the finalizer's collapsed form of a trivial node.
    Leaf(Token),
    /// A fully-built, immutable sub-node.
    Node(Rc<Node>),
}

impl Operand {
    pub fn is_none(&self) -> bool {
        matches!(self, Operand::None)
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Operand::None => None,
            Operand::Leaf(t) => Some(t.span()),
            Operand::Node(n) => Some(n.span),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => f.write_str("_"),
            Operand::Leaf(t) => write!(f, "{}", t.text),
            Operand::Node(n) => write!(f, "({})", n.signature),
        }
    }
}

/// A uniform n-ary AST node: `operand (op operand)*`, beginning and ending
/// with an operand slot. `operands.len() == ops.len() + 1` always holds.
#[derive(Debug, Clone)]
pub struct Node {
    pub operands: OperandList,
    pub ops: OpList,
    pub signature: Text,
    pub span: Span,
}

impl Node {
    /// The operand slots' non-`NONE` values, in order — the `args` the
    /// interpreter's handlers are invoked with.
    pub fn args(&self) -> impl Iterator<Item = &Operand> {
        self.operands.iter().filter(|o| !o.is_none())
    }

    fn signature_of(operands: &OperandList, ops: &OpList) -> Text {
        let mut out = String::new();
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(&ops[i - 1].text);
                out.push(' ');
            }
            out.push_str(if operand.is_none() { "_" } else { "E" });
        }
        Text::from(out)
    }

    fn span_of(operands: &OperandList, ops: &OpList) -> Span {
        let mut span: Option<Span> = None;
        let mut fold = |s: Span| span = Some(span.map_or(s, |acc| acc.join(s)));
        for operand in operands {
            if let Some(s) = operand.span() {
                fold(s);
            }
        }
        for op in ops {
            fold(op.span());
        }
        span.unwrap_or_default()
    }

    /// Finalize a just-closed handle `[x0, op0, x1, op1, ..., xn]` into an
    /// `Operand`: the trivial single-operator, both-slots-empty case
    /// collapses to the bare operator token (§3's leaf representation);
    /// the zero-operator case (used only for an empty program or a
    /// fully-reduced single value) returns its lone operand unchanged;
    /// anything else becomes a real `Node`.
    pub fn finalize(operands: impl Into<OperandList>, ops: impl Into<OpList>) -> Operand {
        let mut operands = operands.into();
        let ops = ops.into();
        debug_assert_eq!(operands.len(), ops.len() + 1);

        if ops.is_empty() {
            return operands.drain(..).next().unwrap_or(Operand::None);
        }

        if ops.len() == 1 && operands[0].is_none() && operands[1].is_none() {
            return Operand::Leaf(ops.into_iter().next().unwrap());
        }

        let signature = Self::signature_of(&operands, &ops);
        let span = Self::span_of(&operands, &ops);
        Operand::Node(Rc::new(Node {
            operands,
            ops,
            signature,
            span,
        }))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: Text::from(text),
            start: 0,
            end: text.len(),
        }
    }

    #[test]
    fn single_operator_with_empty_slots_collapses_to_the_operator() {
        let number = tok(TokenKind::Number, "42");
        let collapsed = Node::finalize(vec![Operand::None, Operand::None], vec![number.clone()]);
        match collapsed {
            Operand::Leaf(t) => assert_eq!(t.text, "42"),
            other => panic!("expected a collapsed leaf, got {:?}", other),
        }
    }

    #[test]
    fn zero_operators_returns_the_lone_operand_unchanged() {
        let inner = Operand::Leaf(tok(TokenKind::Number, "7"));
        let result = Node::finalize(vec![inner], Vec::<Token>::new());
        assert!(matches!(result, Operand::Leaf(_)));
    }

    #[test]
    fn binary_node_has_e_op_e_signature() {
        let lhs = Operand::Leaf(tok(TokenKind::Number, "1"));
        let rhs = Operand::Leaf(tok(TokenKind::Number, "2"));
        let plus = tok(TokenKind::Infix, "+");
        let node = Node::finalize(vec![lhs, rhs], vec![plus]);
        match node {
            Operand::Node(n) => assert_eq!(n.signature.as_str(), "E + E"),
            other => panic!("expected a node, got {:?}", other),
        }
    }
}
