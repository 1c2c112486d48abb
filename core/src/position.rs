//! Per-offset character columns used for incremental prefix matching.
//!
//! Each parent command keeps one column per character offset of its
//! children's leaf names. A column maps a character to the set of sibling
//! ordinals whose name has that character at that offset. Matching a token
//! intersects the sets for each typed character, so abbreviations narrow the
//! candidates one character at a time.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{ParseContext, PositionColumns};
//!
//! let mut columns = PositionColumns::new();
//! columns.insert("show", 0);
//! columns.insert("shutdown", 1);
//!
//! let mut ctx = ParseContext::new("sho");
//! let candidates = columns.match_token(&mut ctx);
//! assert_eq!(candidates.iter().collect::<Vec<_>>(), vec![0]);
//! ```

use std::collections::BTreeMap;

use crate::bitmap::Bitmap;
use crate::context::ParseContext;

/// Characters that may appear in a matched token.
pub fn is_token_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Candidate sets for one character offset.
#[derive(Debug, Clone, Default)]
pub struct PositionColumn {
    by_char: BTreeMap<u8, Bitmap>,
}

impl PositionColumn {
    /// Candidates having `ch` at this offset.
    pub fn get(&self, ch: u8) -> Option<&Bitmap> {
        self.by_char.get(&ch)
    }

    /// Smallest character recorded at this offset.
    pub fn min_char(&self) -> Option<u8> {
        self.by_char.keys().next().copied()
    }

    /// Iterates all candidate sets of this offset.
    pub fn bitmaps(&self) -> impl Iterator<Item = &Bitmap> {
        self.by_char.values()
    }
}

/// Column table over one parent's sibling names.
#[derive(Debug, Clone, Default)]
pub struct PositionColumns {
    columns: Vec<PositionColumn>,
}

impl PositionColumns {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns (the longest name folded in so far).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` before any name has been folded in.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at `offset`.
    pub fn column(&self, offset: usize) -> Option<&PositionColumn> {
        self.columns.get(offset)
    }

    /// Folds `name` into the columns under sibling ordinal `ordinal`.
    pub fn insert(&mut self, name: &str, ordinal: usize) {
        let bytes = name.as_bytes();
        if bytes.len() > self.columns.len() {
            self.columns.resize_with(bytes.len(), PositionColumn::default);
        }
        for (column, &ch) in self.columns.iter_mut().zip(bytes) {
            column.by_char.entry(ch).or_default().insert(ordinal);
        }
    }

    /// Reads one token from `ctx` and returns the siblings it can name.
    ///
    /// Leading whitespace is skipped. The token ends at a space (consumed),
    /// at end of input, or at the first character outside
    /// `[A-Za-z0-9_-]` (left in place). An empty result means no match,
    /// one bit a unique match, more than one an ambiguous match.
    ///
    /// When several candidates survive, a candidate whose whole name equals
    /// the token wins over the longer names sharing it as a prefix. Without
    /// such a candidate the set stays ambiguous.
    pub fn match_token(&self, ctx: &mut ParseContext) -> Bitmap {
        ctx.skip_whitespace();

        let mut matched = Bitmap::new();
        let mut offset = 0;
        loop {
            match ctx.next_byte() {
                Some(ch) if is_token_char(ch) => {
                    let Some(column) = self.columns.get(offset) else {
                        return Bitmap::new();
                    };
                    let Some(candidates) = column.get(ch) else {
                        return Bitmap::new();
                    };
                    if offset == 0 {
                        matched = candidates.clone();
                    } else {
                        matched.and_with(candidates);
                    }
                    if matched.is_empty() {
                        return matched;
                    }
                    offset += 1;
                }
                Some(b' ') | None => break,
                Some(_) => {
                    ctx.unread();
                    break;
                }
            }
        }

        if matched.count_ones() > 1 {
            if let Some(column) = self.columns.get(offset) {
                let mut exact = matched.clone();
                for longer in column.bitmaps() {
                    exact.and_not_with(longer);
                }
                if !exact.is_empty() {
                    matched = exact;
                }
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> PositionColumns {
        let mut columns = PositionColumns::new();
        for (ordinal, name) in names.iter().enumerate() {
            columns.insert(name, ordinal);
        }
        columns
    }

    fn matches(columns: &PositionColumns, input: &str) -> Vec<usize> {
        let mut ctx = ParseContext::new(input);
        columns.match_token(&mut ctx).iter().collect()
    }

    #[test]
    fn test_columns_extend_to_longest_name() {
        let mut table = PositionColumns::new();
        table.insert("ab", 0);
        assert_eq!(table.len(), 2);
        table.insert("abcdef", 1);
        assert_eq!(table.len(), 6);
        table.insert("x", 2);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_new_minimum_character_keeps_existing_entries() {
        let mut table = PositionColumns::new();
        table.insert("show", 0);
        table.insert("add", 1);
        let column = table.column(0).unwrap();
        assert_eq!(column.min_char(), Some(b'a'));
        assert!(column.get(b's').unwrap().contains(0));
        assert!(column.get(b'a').unwrap().contains(1));
    }

    #[test]
    fn test_abbreviations() {
        let table = columns(&["show", "shutdown"]);
        assert_eq!(matches(&table, "s"), vec![0, 1]);
        assert_eq!(matches(&table, "sh"), vec![0, 1]);
        assert_eq!(matches(&table, "sho"), vec![0]);
        assert_eq!(matches(&table, "show"), vec![0]);
        assert_eq!(matches(&table, "shu"), vec![1]);
    }

    #[test]
    fn test_exact_length_tie_break() {
        let table = columns(&["int", "interface"]);
        assert_eq!(matches(&table, "int"), vec![0]);
        assert_eq!(matches(&table, "inte"), vec![1]);
        assert_eq!(matches(&table, "in"), vec![0, 1]);
    }

    #[test]
    fn test_no_match() {
        let table = columns(&["show", "reload"]);
        assert!(matches(&table, "x").is_empty());
        assert!(matches(&table, "showing").is_empty());
        assert!(matches(&table, "sx").is_empty());
        assert!(matches(&table, "").is_empty());
    }

    #[test]
    fn test_stops_at_space_and_punctuation() {
        let table = columns(&["show", "reload"]);

        let mut ctx = ParseContext::new("  sh instance");
        assert_eq!(table.match_token(&mut ctx).iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(ctx.remaining(), "instance");

        let mut ctx = ParseContext::new("re?");
        assert_eq!(table.match_token(&mut ctx).iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(ctx.remaining(), "?");
    }
}
