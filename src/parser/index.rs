//! Secondary lookup indices for container nodes
//!
//! Structs, services and functions keep their children in source order in a
//! `Vec`. A [`ChildIndex`] sits next to that `Vec` and maps a child's
//! defining token (and its identifier) to the child's position, so tools can
//! jump straight to a child without walking the tree.

use super::token::TokenKey;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildIndex {
    by_token: FxHashMap<TokenKey, usize>,
    by_ident: FxHashMap<String, usize>,
}

impl ChildIndex {
    pub fn new() -> Self {
        ChildIndex::default()
    }

    /// Record the child at `slot`. For duplicate identifiers the first
    /// declaration keeps the identifier entry.
    pub(crate) fn insert(&mut self, key: TokenKey, ident: &str, slot: usize) {
        self.by_token.insert(key, slot);
        self.by_ident.entry(ident.to_string()).or_insert(slot);
    }

    /// Position of the child whose start token has identity `key`.
    pub fn by_token(&self, key: &TokenKey) -> Option<usize> {
        self.by_token.get(key).copied()
    }

    /// Position of the first child declared as `ident`.
    pub fn by_ident(&self, ident: &str) -> Option<usize> {
        self.by_ident.get(ident).copied()
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::SourceLocation;

    fn key(offset: usize, lexeme: &str) -> TokenKey {
        TokenKey {
            location: SourceLocation::new(offset, 1, offset + 1),
            lexeme: lexeme.to_string(),
        }
    }

    #[test]
    fn test_first_declaration_wins() {
        let mut index = ChildIndex::new();
        index.insert(key(0, "1"), "a", 0);
        index.insert(key(10, "2"), "a", 1);

        assert_eq!(index.len(), 2);
        assert_eq!(index.by_ident("a"), Some(0));
        assert_eq!(index.by_token(&key(10, "2")), Some(1));
        assert_eq!(index.by_token(&key(10, "3")), None);
    }
}
