//! Module containing the parser (§4.3): precedence climbing over the same
//! [`crate::priority::PriorityTable`] the tagger and lexer feed into,
//! producing the uniform [`crate::ast::Node`] shape the interpreter
//! dispatches on by signature.
//!
//! Bracketed and keyword-delimited forms (`(...)`, `[...]`, `if/.../end`,
//! `let/.../end`, `for/.../end`, `begin/.../end`) are recognized by direct
//! recursive descent rather than through the generic climbing loop, since
//! their closing tokens must match a specific keyword rather than merely
//! "whatever binds tighter" — the same split the tree-walker later relies
//! on when it recognizes these shapes by signature.

use crate::ast::{Node, Operand};
use crate::error::TeacupError;
use crate::priority::{Priority, PriorityTable};
use crate::token::{Token, TokenKind};

/// Parse a full token stream into a single root operand, or `None` for an
/// empty program. Errs if the stream isn't fully consumed.
pub fn parse(tokens: Vec<Token>, priorities: &PriorityTable) -> Result<Option<Operand>, TeacupError> {
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        priorities,
    };
    let result = parser.parse_binary(0)?;
    if let Some(tok) = parser.peek() {
        return Err(TeacupError::UnexpectedToken {
            found: tok.text.to_string(),
            span: tok.span(),
        });
    }
    Ok(Some(result))
}

struct Parser<'p> {
    tokens: Vec<Token>,
    pos: usize,
    priorities: &'p PriorityTable,
}

impl<'p> Parser<'p> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    fn priority_of(&self, tok: &Token) -> Result<Priority, TeacupError> {
        self.priorities.lookup(tok).ok_or_else(|| TeacupError::UnknownOperator {
            text: tok.text.to_string(),
            span: tok.span(),
        })
    }

    fn eof_error(&self) -> TeacupError {
        let at = self.tokens.last().map(|t| t.end).unwrap_or(0);
        TeacupError::UnexpectedToken {
            found: String::new(),
            span: crate::error::Span::new(at, at),
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str) -> Result<Token, TeacupError> {
        match self.peek() {
            Some(t) if t.kind == kind && t.text == text => Ok(self.bump()),
            Some(t) => Err(TeacupError::UnexpectedToken {
                found: t.text.to_string(),
                span: t.span(),
            }),
            None => Err(self.eof_error()),
        }
    }

    fn at_keyword(&self, kind: TokenKind, text: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == kind && t.text == text)
    }

    /// Binary-operator precedence climbing: absorbs infix-kind operators
    /// whose `left` binding power is at least `min_left`. Same-priority runs
    /// are handled per their associativity — `left == right` flattens into
    /// one n-ary node (the spec's `,`/`;`/`\n`/comparison chains), `right >
    /// left` recurses into the right-hand side (right-assoc), `right <
    /// left` returns to this loop for the next iteration (left-assoc).
    fn parse_binary(&mut self, min_left: i32) -> Result<Operand, TeacupError> {
        let mut lhs = self.parse_unary_postfix()?;

        loop {
            let tok = match self.peek() {
                Some(t) if t.kind == TokenKind::Infix => t.clone(),
                _ => break,
            };
            let prio = self.priority_of(&tok)?;
            if prio.left < min_left {
                break;
            }

            if prio.left == prio.right {
                let mut operands = vec![lhs];
                let mut ops = Vec::new();
                loop {
                    let op = self.bump();
                    let rhs = self.parse_binary(prio.right + 1)?;
                    ops.push(op);
                    operands.push(rhs);
                    let continues = match self.peek() {
                        Some(next) if next.kind == TokenKind::Infix => self
                            .priority_of(next)
                            .map(|p| p.left == prio.left && p.right == prio.right)
                            .unwrap_or(false),
                        _ => false,
                    };
                    if !continues {
                        break;
                    }
                }
                lhs = Node::finalize(operands, ops);
            } else if prio.right > prio.left {
                self.bump();
                let rhs = self.parse_binary(prio.left)?;
                lhs = Node::finalize(vec![lhs, rhs], vec![tok]);
            } else {
                self.bump();
                let rhs = self.parse_binary(prio.left + 1)?;
                lhs = Node::finalize(vec![lhs, rhs], vec![tok]);
            }
        }

        Ok(lhs)
    }

    /// A primary expression followed by any number of postfix applications:
    /// `f(args)`, `x[index]`, `x.field`. All three chain at the same tight
    /// binding so `x.m(y)`, `x.m(y)[0]`, `f(x).g` etc. apply left to right
    /// regardless of `.`'s own priority-table entry — the generic climbing
    /// loop in [`Self::parse_binary`] never sees a `.` token, since it is
    /// always consumed here first.
    fn parse_unary_postfix(&mut self) -> Result<Operand, TeacupError> {
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut operand: Operand) -> Result<Operand, TeacupError> {
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::Open && t.text == "(" => {
                    let open = self.bump();
                    let args = if self.at_close(")") {
                        Operand::None
                    } else {
                        self.parse_binary(0)?
                    };
                    let close = self.expect(TokenKind::Close, ")")?;
                    operand = Node::finalize(vec![operand, args, Operand::None], vec![open, close]);
                }
                Some(t) if t.kind == TokenKind::Open && t.text == "[" => {
                    let open = self.bump();
                    let index = self.parse_binary(0)?;
                    let close = self.expect(TokenKind::Close, "]")?;
                    operand = Node::finalize(vec![operand, index, Operand::None], vec![open, close]);
                }
                Some(t) if t.kind == TokenKind::Infix && t.text == "." => {
                    let dot = self.bump();
                    let name = self.parse_field_name()?;
                    operand = Node::finalize(vec![operand, name], vec![dot]);
                }
                _ => break,
            }
        }
        Ok(operand)
    }

    /// The right operand of `.`: a bare `word` (the common case — a literal
    /// field name, never evaluated) or a parenthesized expression (a
    /// computed name, evaluated at call time per `spec.md` §9's preserved
    /// asymmetry). Deliberately narrower than [`Self::parse_primary`] — a
    /// bare number/string/prefix-operator is not a meaningful field name.
    fn parse_field_name(&mut self) -> Result<Operand, TeacupError> {
        let tok = self.peek().cloned().ok_or_else(|| self.eof_error())?;
        match tok.kind {
            TokenKind::Word => {
                self.bump();
                Ok(Operand::Leaf(tok))
            }
            TokenKind::Open => self.parse_open(),
            _ => Err(TeacupError::UnexpectedToken {
                found: tok.text.to_string(),
                span: tok.span(),
            }),
        }
    }

    fn at_close(&self, text: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Close && t.text == text)
    }

    fn parse_primary(&mut self) -> Result<Operand, TeacupError> {
        let tok = self.peek().cloned().ok_or_else(|| self.eof_error())?;
        match tok.kind {
            TokenKind::Number | TokenKind::Word | TokenKind::String => {
                self.bump();
                Ok(Operand::Leaf(tok))
            }
            TokenKind::Prefix => {
                let op = self.bump();
                let prio = self.priority_of(&op)?;
                let operand = self.parse_binary(prio.left)?;
                Ok(Node::finalize(vec![Operand::None, operand], vec![op]))
            }
            TokenKind::Open => self.parse_open(),
            _ => Err(TeacupError::UnexpectedToken {
                found: tok.text.to_string(),
                span: tok.span(),
            }),
        }
    }

    fn parse_open(&mut self) -> Result<Operand, TeacupError> {
        let tok = self.peek().cloned().expect("caller checked Open");
        match tok.text.as_str() {
            "(" => self.parse_bracket("(", ")"),
            "[" => self.parse_bracket("[", "]"),
            "{" => self.parse_bracket("{", "}"),
            "let" => self.parse_let(),
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "begin" => self.parse_begin(),
            _ => self.parse_bracket(tok.text.as_str(), tok.text.as_str()),
        }
    }

    /// `_ ( E ) _` / `_ [ E ] _` / `_ [ _ ] _`, and the generic fallback for
    /// any other bracket-like open token.
    fn parse_bracket(&mut self, _open_text: &str, close_text: &str) -> Result<Operand, TeacupError> {
        let open = self.bump();
        let inner = if self.at_close(close_text) {
            Operand::None
        } else {
            self.parse_binary(0)?
        };
        let close = self.expect(TokenKind::Close, close_text)?;
        Ok(Node::finalize(
            vec![Operand::None, inner, Operand::None],
            vec![open, close],
        ))
    }

    /// `_ begin E end _`.
    fn parse_begin(&mut self) -> Result<Operand, TeacupError> {
        let begin = self.bump();
        let body = self.parse_binary(0)?;
        let end = self.expect(TokenKind::Close, "end")?;
        Ok(Node::finalize(
            vec![Operand::None, body, Operand::None],
            vec![begin, end],
        ))
    }

    /// `_ let E in E end _`, where the first `E` is a (possibly comma-flattened)
    /// run of `name = expr` / `f(args) = expr` bindings.
    fn parse_let(&mut self) -> Result<Operand, TeacupError> {
        let let_tok = self.bump();
        let bindings = self.parse_binary(0)?;
        let in_tok = self.expect(TokenKind::Middle, "in")?;
        let body = self.parse_binary(0)?;
        let end_tok = self.expect(TokenKind::Close, "end")?;
        Ok(Node::finalize(
            vec![Operand::None, bindings, body, Operand::None],
            vec![let_tok, in_tok, end_tok],
        ))
    }

    /// `_ if E then E (elif E then E)* (else E)? end _`.
    fn parse_if(&mut self) -> Result<Operand, TeacupError> {
        let if_tok = self.bump();
        let mut ops = vec![if_tok];
        let mut operands = vec![Operand::None];

        let cond = self.parse_binary(0)?;
        let then_tok = self.expect(TokenKind::Middle, "then")?;
        let body = self.parse_binary(0)?;
        ops.push(then_tok);
        operands.push(cond);
        operands.push(body);

        while self.at_keyword(TokenKind::Middle, "elif") {
            let elif_tok = self.bump();
            let cond = self.parse_binary(0)?;
            let then_tok = self.expect(TokenKind::Middle, "then")?;
            let body = self.parse_binary(0)?;
            ops.push(elif_tok);
            operands.push(cond);
            ops.push(then_tok);
            operands.push(body);
        }

        if self.at_keyword(TokenKind::Middle, "else") {
            let else_tok = self.bump();
            let body = self.parse_binary(0)?;
            ops.push(else_tok);
            operands.push(body);
        }

        let end_tok = self.expect(TokenKind::Close, "end")?;
        ops.push(end_tok);
        operands.push(Operand::None);

        Ok(Node::finalize(operands, ops))
    }

    /// `_ for E in E (when E)? do E end _`.
    fn parse_for(&mut self) -> Result<Operand, TeacupError> {
        let for_tok = self.bump();
        let var = self.parse_binary(0)?;
        let in_tok = self.expect(TokenKind::Middle, "in")?;
        let iterable = self.parse_binary(0)?;

        let mut ops = vec![for_tok, in_tok];
        let mut operands = vec![Operand::None, var, iterable];

        if self.at_keyword(TokenKind::Middle, "when") {
            let when_tok = self.bump();
            let cond = self.parse_binary(0)?;
            ops.push(when_tok);
            operands.push(cond);
        }

        let do_tok = self.expect(TokenKind::Middle, "do")?;
        let body = self.parse_binary(0)?;
        ops.push(do_tok);
        operands.push(body);

        let end_tok = self.expect(TokenKind::Close, "end")?;
        ops.push(end_tok);
        operands.push(Operand::None);

        Ok(Node::finalize(operands, ops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node as AstNode;
    use crate::priority::PriorityTable;
    use crate::tagger;
    use crate::token::Lexer;

    fn parse_src(src: &str) -> Operand {
        let mut tokens = Lexer::teacup().lex(src).unwrap();
        tagger::tag(&mut tokens);
        parse(tokens, &PriorityTable::teacup()).unwrap().unwrap()
    }

    fn signature(op: &Operand) -> String {
        match op {
            Operand::Node(n) => n.signature.to_string(),
            Operand::Leaf(t) => t.text.to_string(),
            Operand::None => "_".to_string(),
        }
    }

    fn node(op: &Operand) -> std::rc::Rc<AstNode> {
        match op {
            Operand::Node(n) => n.clone(),
            other => panic!("expected a node, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let ast = parse_src("1 + 2 * 3");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E + E");
        assert_eq!(signature(&top.operands[0]), "1");
        assert_eq!(signature(&top.operands[1]), "E * E");
    }

    #[test]
    fn power_is_right_associative() {
        let ast = parse_src("2 ^ 3 ^ 2");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E ^ E");
        assert_eq!(signature(&top.operands[0]), "2");
        assert_eq!(signature(&top.operands[1]), "E ^ E");
    }

    #[test]
    fn minus_is_left_associative() {
        let ast = parse_src("1 - 2 - 3");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E - E");
        assert_eq!(signature(&top.operands[0]), "E - E");
        assert_eq!(signature(&top.operands[1]), "3");
    }

    #[test]
    fn parens_group_a_subexpression() {
        let ast = parse_src("(1 + 2) * 3");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E * E");
        let group = node(&top.operands[0]);
        assert_eq!(group.signature.as_str(), "_ ( E ) _");
        assert_eq!(signature(&group.operands[1]), "E + E");
    }

    #[test]
    fn unary_minus_binds_tighter_than_addition() {
        let ast = parse_src("-3 + 4");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E + E");
        assert_eq!(signature(&top.operands[0]), "_ - E");
    }

    #[test]
    fn comparisons_flatten_into_one_chain() {
        let ast = parse_src("1, 2, 3");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E , E , E");
    }

    #[test]
    fn call_and_index_chain_as_postfix() {
        let ast = parse_src("f(x)[0]");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E [ E ] _");
        let callee = node(&top.operands[0]);
        assert_eq!(callee.signature.as_str(), "E ( E ) _");
    }

    #[test]
    fn if_then_else_end_parses_to_the_required_signature() {
        let ast = parse_src("if x then 1 else 2 end");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "_ if E then E else E end _");
    }

    #[test]
    fn let_in_end_parses_to_the_required_signature() {
        let ast = parse_src("let x = 1 in x end");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "_ let E in E end _");
    }

    #[test]
    fn for_when_do_end_parses_to_the_required_signature() {
        let ast = parse_src("for x in xs when x do x end");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "_ for E in E when E do E end _");
    }

    #[test]
    fn a_method_call_applies_to_the_whole_field_access() {
        // `.` binds tighter than `(`, but both are postfix, so `x.m(y)` must
        // parse as `(x.m)(y)` — a call whose callee is the field access —
        // not as `x . (m(y))`, which would make the field name a call node.
        let ast = parse_src("x.m(y)");
        let top = node(&ast);
        assert_eq!(top.signature.as_str(), "E ( E ) _");
        let callee = node(&top.operands[0]);
        assert_eq!(callee.signature.as_str(), "E . E");
        assert_eq!(signature(&callee.operands[1]), "m");
    }
}
