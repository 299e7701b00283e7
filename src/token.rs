//! Module containing the lexer: source text in, a flat token sequence out.

use crate::error::{Span, TeacupError};
use once_cell::sync::Lazy;
use regex::Regex;
use smartstring::{LazyCompact, SmartString};
use std::fmt;

/// Compact string type for token lexemes and identifiers, small-string
/// optimized the way the teacher's `Identifier` type is.
pub type Text = SmartString<LazyCompact>;

/// The kind of a token. `Prefix` is never produced by the [`Lexer`] itself —
/// it is assigned only by the prefix tagger (see [`crate::tagger`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Open,
    Middle,
    Close,
    Infix,
    Prefix,
    Word,
    String,
}

impl TokenKind {
    /// The lowercase name used as a dispatch/priority key, matching the
    /// spec's `kind` vocabulary exactly.
    pub fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Open => "open",
            Self::Middle => "middle",
            Self::Close => "close",
            Self::Infix => "infix",
            Self::Prefix => "prefix",
            Self::Word => "word",
            Self::String => "string",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single lexical token: `{ kind, text, start, end }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Text,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// One entry of the lexer's kind → pattern table. Declaration order is the
/// alternation's first-match priority order.
struct Rule {
    kind: Option<TokenKind>,
    pattern: &'static str,
}

/// A lexer built from an ordered `kind -> regex fragment` table, compiled
/// into a single alternation regex so that earlier kinds win ties, exactly
/// as required by the spec's first-match alternation semantics.
pub struct Lexer {
    rules: Vec<Rule>,
    regex: Regex,
}

/// Join a rule table into a single alternation pattern, one capturing group
/// per rule so `lex` can tell which alternative fired.
fn alternation_of(table: &[(Option<TokenKind>, &'static str)]) -> String {
    table
        .iter()
        .map(|(_, pattern)| format!("({})", pattern))
        .collect::<Vec<_>>()
        .join("|")
}

fn teacup_table() -> Vec<(Option<TokenKind>, &'static str)> {
    vec![
        (Some(TokenKind::Number), r"\d+(?:\.\d+)?(?:[eE][+-]?\d+)?"),
        (
            Some(TokenKind::Open),
            r"[(\[{]|\blet\b|\bfor\b|\bif\b|\bbegin\b",
        ),
        (
            Some(TokenKind::Middle),
            r"\bthen\b|\belif\b|\belse\b|\bin\b|\bdo\b|\bwhen\b",
        ),
        (Some(TokenKind::Close), r"[)\]}]|\bend\b"),
        (
            Some(TokenKind::Infix),
            r#"[,;\n]|[!@$%^&*|/?.:~+=<>-]+|\band\b|\bor\b|\bnot\b"#,
        ),
        (Some(TokenKind::Word), r"[A-Za-z_][A-Za-z0-9_]*"),
        (Some(TokenKind::String), r#""(?:\\.|[^"\\])*""#),
        (None, r"#[^\n]*"),
    ]
}

/// The default Teacup alternation, compiled once per process: every
/// [`Lexer::teacup`] call (one per [`crate::pipeline::Definition::teacup`])
/// clones this instead of recompiling the same regex from scratch.
static TEACUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&alternation_of(&teacup_table())).expect("default Teacup lexer table is valid regex")
});

impl Lexer {
    /// Build a lexer from an ordered list of `(kind, pattern)` pairs.
    /// `kind = None` marks a pattern (e.g. comments) whose matches are
    /// always discarded regardless of text.
    pub fn new(table: Vec<(Option<TokenKind>, &'static str)>) -> Self {
        let regex = Regex::new(&alternation_of(&table)).expect("default Teacup lexer table is valid regex");
        let rules = table
            .into_iter()
            .map(|(kind, pattern)| Rule { kind, pattern })
            .collect();
        Self { rules, regex }
    }

    /// The default Teacup token table (§4.1), in the precise declaration
    /// order the spec requires.
    pub fn teacup() -> Self {
        let table = teacup_table();
        let rules = table
            .into_iter()
            .map(|(kind, pattern)| Rule { kind, pattern })
            .collect();
        Self {
            rules,
            regex: TEACUP_REGEX.clone(),
        }
    }

    /// Tokenize `src`, discarding unmatched gaps (as long as they contain
    /// only whitespace), comments, and empty-text matches.
    pub fn lex(&self, src: &str) -> Result<Vec<Token>, TeacupError> {
        let mut tokens = Vec::new();
        let mut cursor = 0usize;

        for caps in self.regex.captures_iter(src) {
            let whole = caps.get(0).expect("group 0 always matches");

            if whole.start() > cursor {
                let gap = &src[cursor..whole.start()];
                self.check_gap(gap, cursor)?;
            }

            let rule_idx = (1..caps.len())
                .find(|&i| caps.get(i).is_some())
                .expect("alternation always fires exactly one named branch");
            let kind = self.rules[rule_idx - 1].kind;

            if let Some(kind) = kind {
                if !whole.as_str().is_empty() {
                    tokens.push(Token {
                        kind,
                        text: Text::from(whole.as_str()),
                        start: whole.start(),
                        end: whole.end(),
                    });
                }
            }

            cursor = whole.end();
        }

        if cursor < src.len() {
            self.check_gap(&src[cursor..], cursor)?;
        }

        Ok(tokens)
    }

    fn check_gap(&self, gap: &str, offset: usize) -> Result<(), TeacupError> {
        if let Some(bad) = gap.find(|c: char| !c.is_whitespace()) {
            let ch = gap[bad..].chars().next().unwrap();
            return Err(TeacupError::Lex {
                text: ch.to_string(),
                at: offset + bad,
            });
        }
        Ok(())
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::teacup()
    }
}
