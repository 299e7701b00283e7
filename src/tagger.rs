//! Module containing the prefix tagger (§4.2): a single left-to-right pass
//! that reclassifies ambiguous `infix` tokens as `prefix` wherever they
//! appear where an operand was expected instead of a second operand.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrevKind {
    Start,
    Infix,
    Open,
    Other,
}

/// Mutate `tokens` in place, retagging `infix` tokens that sit where an
/// operand is expected as `prefix` tokens instead.
///
/// State is a single `prev_kind`, seeded with the `start` sentinel. An
/// `infix` token is reclassified when `prev_kind` is `start`, `infix`, or
/// `open` — except that `start` does not count when the current token is
/// itself `open` (so a leading `(` or `let` is never mistaken for an
/// operand position needing a prefix operator before it).
pub fn tag(tokens: &mut [Token]) {
    let mut prev = PrevKind::Start;

    for token in tokens.iter_mut() {
        let wants_prefix = match prev {
            PrevKind::Start => token.kind != TokenKind::Open,
            PrevKind::Infix | PrevKind::Open => true,
            PrevKind::Other => false,
        };

        if token.kind == TokenKind::Infix && wants_prefix {
            token.kind = TokenKind::Prefix;
        }

        prev = match token.kind {
            TokenKind::Infix => PrevKind::Infix,
            TokenKind::Open => PrevKind::Open,
            _ => PrevKind::Other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Lexer;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut tokens = Lexer::teacup().lex(src).unwrap();
        tag(&mut tokens);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn leading_minus_becomes_prefix() {
        assert_eq!(
            kinds("-1 + 2"),
            vec![
                TokenKind::Prefix,
                TokenKind::Number,
                TokenKind::Infix,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn minus_after_infix_is_prefix() {
        assert_eq!(
            kinds("1 - -2"),
            vec![
                TokenKind::Number,
                TokenKind::Infix,
                TokenKind::Prefix,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn minus_after_open_paren_is_prefix() {
        assert_eq!(
            kinds("(-1)"),
            vec![
                TokenKind::Open,
                TokenKind::Prefix,
                TokenKind::Number,
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn minus_after_operand_stays_infix() {
        assert_eq!(
            kinds("1 - 2"),
            vec![
                TokenKind::Number,
                TokenKind::Infix,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn leading_open_is_not_retagged() {
        assert_eq!(kinds("(1)"), vec![TokenKind::Open, TokenKind::Number, TokenKind::Close]);
    }

    #[test]
    fn tagging_is_idempotent() {
        let mut tokens = Lexer::teacup().lex("1 - -2 * -3").unwrap();
        tag(&mut tokens);
        let once = tokens.clone();
        tag(&mut tokens);
        assert_eq!(once, tokens);
    }
}
