//! Module containing the operator priority table that drives the parser.

use crate::token::{Text, Token};
use ahash::AHashMap;

/// Binding power on the left and right of an operator. Associativity falls
/// out of which side is larger (see the module-level helpers below).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub left: i32,
    pub right: i32,
}

impl Priority {
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// `lassoc(n) = (n, n-1)`.
    pub const fn lassoc(n: i32) -> Self {
        Self::new(n, n - 1)
    }

    /// `rassoc(n) = (n, n+1)`.
    pub const fn rassoc(n: i32) -> Self {
        Self::new(n, n + 1)
    }

    /// `xassoc(n) = (n, n)` — non-associative.
    pub const fn xassoc(n: i32) -> Self {
        Self::new(n, n)
    }

    /// `prefix(n) = (n, LOOSE)`.
    pub const fn prefix(n: i32) -> Self {
        Self::new(n, LOOSE)
    }

    /// `suffix(n) = (LOOSE, n)`.
    pub const fn suffix(n: i32) -> Self {
        Self::new(LOOSE, n)
    }
}

/// A binding power looser than any real operator's, used for the
/// "infinitely loose" side of prefix/suffix operators.
pub const LOOSE: i32 = 10_004;

/// Ordered lookup table, keyed by one of three fallback forms (§3):
/// `"<kind>:<text>"`, then `"<text>"`, then `"type:<kind>"`.
#[derive(Debug, Clone, Default)]
pub struct PriorityTable {
    entries: AHashMap<Text, Priority>,
}

impl PriorityTable {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<Text>, priority: Priority) -> &mut Self {
        self.entries.insert(key.into(), priority);
        self
    }

    /// Look up a token's priority using the three-tier fallback order.
    pub fn lookup(&self, token: &Token) -> Option<Priority> {
        let kind_text: Text = format!("{}:{}", token.kind.name(), token.text).into();
        if let Some(p) = self.entries.get(&kind_text) {
            return Some(*p);
        }
        if let Some(p) = self.entries.get(&token.text) {
            return Some(*p);
        }
        let type_key: Text = format!("type:{}", token.kind.name()).into();
        self.entries.get(&type_key).copied()
    }

    /// The definitional Teacup priority table (§4.3).
    pub fn teacup() -> Self {
        let mut t = Self::new();
        t.insert("type:open", Priority::new(5, LOOSE))
            .insert("type:middle", Priority::xassoc(5))
            .insert("type:close", Priority::new(LOOSE + 1, 5))
            .insert("infix:\n", Priority::xassoc(15))
            .insert("infix:;", Priority::xassoc(15))
            .insert("infix:,", Priority::xassoc(25))
            .insert("infix:=", Priority::rassoc(35))
            .insert("infix:->", Priority::rassoc(35))
            .insert("not", Priority::prefix(105))
            .insert("or", Priority::new(115, 114))
            .insert("and", Priority::new(125, 124))
            .insert("infix:<", Priority::xassoc(205))
            .insert("infix:<=", Priority::xassoc(205))
            .insert("infix:>", Priority::xassoc(205))
            .insert("infix:>=", Priority::xassoc(205))
            .insert("infix:==", Priority::xassoc(205))
            .insert("infix:..", Priority::xassoc(305))
            .insert("infix:+", Priority::lassoc(505))
            .insert("infix:-", Priority::lassoc(505))
            .insert("prefix:-", Priority::prefix(605))
            .insert("infix:*", Priority::lassoc(605))
            .insert("infix:/", Priority::lassoc(605))
            .insert("infix:%", Priority::lassoc(605))
            .insert("infix:^", Priority::rassoc(705))
            .insert("type:infix", Priority::xassoc(905))
            .insert("type:prefix", Priority::prefix(905))
            .insert("infix:.", Priority::new(15_005, 1_004))
            .insert("type:word", Priority::xassoc(20_005))
            .insert("type:number", Priority::xassoc(20_005))
            .insert("type:string", Priority::xassoc(20_005));
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let t = PriorityTable::teacup();
        let plus = t.entries.get(&Text::from("infix:+")).copied().unwrap();
        let star = t.entries.get(&Text::from("infix:*")).copied().unwrap();
        assert!(plus.right < star.left);
    }

    #[test]
    fn power_is_right_associative() {
        let t = PriorityTable::teacup();
        let caret = t.entries.get(&Text::from("infix:^")).copied().unwrap();
        assert!(caret.right > caret.left);
    }
}
