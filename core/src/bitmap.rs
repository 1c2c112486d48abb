//! Growable bit vectors used as sibling candidate sets.
//!
//! A [`Bitmap`] is an ordered set of small integers. The command tree uses
//! one bit per sibling ordinal, so a bitmap answers "which siblings are still
//! consistent with the input read so far".
//!
//! Writes grow the storage as needed and never shrink it; reads past the end
//! behave as if the missing words were zero.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::Bitmap;
//!
//! let mut a = Bitmap::new();
//! a.insert(1);
//! a.insert(70);
//!
//! let mut b = Bitmap::new();
//! b.insert(70);
//!
//! a.and_with(&b);
//! assert_eq!(a.count_ones(), 1);
//! assert_eq!(a.first_set(), Some(70));
//! ```

const WORD_BITS: usize = u64::BITS as usize;

/// Boolean operation combining a bitmap with a single bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    /// Set the bit.
    Or,
    /// Intersect with the single-bit set `{index}`.
    And,
    /// Clear the bit.
    AndNot,
    /// Flip the bit.
    Xor,
}

/// Dynamic bit storage with word-wise boolean operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    words: Vec<u64>,
}

impl Bitmap {
    /// Creates an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bitmap holding exactly one bit.
    pub fn with_bit(index: usize) -> Self {
        let mut bitmap = Self::new();
        bitmap.insert(index);
        bitmap
    }

    fn ensure_words(&mut self, len: usize) {
        if self.words.len() < len {
            self.words.resize(len, 0);
        }
    }

    /// Combines the bitmap with the bit `index` using `op`.
    pub fn apply(&mut self, op: BitOp, index: usize) -> &mut Self {
        let word = index / WORD_BITS;
        let mask = 1u64 << (index % WORD_BITS);
        match op {
            BitOp::Or => {
                self.ensure_words(word + 1);
                self.words[word] |= mask;
            }
            BitOp::Xor => {
                self.ensure_words(word + 1);
                self.words[word] ^= mask;
            }
            BitOp::AndNot => {
                if let Some(w) = self.words.get_mut(word) {
                    *w &= !mask;
                }
            }
            BitOp::And => {
                for (i, w) in self.words.iter_mut().enumerate() {
                    *w &= if i == word { mask } else { 0 };
                }
            }
        }
        self
    }

    /// Sets bit `index`.
    pub fn insert(&mut self, index: usize) {
        self.apply(BitOp::Or, index);
    }

    /// Clears bit `index`.
    pub fn remove(&mut self, index: usize) {
        self.apply(BitOp::AndNot, index);
    }

    /// Flips bit `index`.
    pub fn toggle(&mut self, index: usize) {
        self.apply(BitOp::Xor, index);
    }

    /// Returns `true` if bit `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    fn combine(&mut self, other: &Bitmap, f: impl Fn(u64, u64) -> u64) -> &mut Self {
        self.ensure_words(other.words.len());
        for (i, w) in self.words.iter_mut().enumerate() {
            let b = other.words.get(i).copied().unwrap_or(0);
            *w = f(*w, b);
        }
        self
    }

    /// `self |= other`.
    pub fn or_with(&mut self, other: &Bitmap) -> &mut Self {
        self.combine(other, |a, b| a | b)
    }

    /// `self &= other`.
    pub fn and_with(&mut self, other: &Bitmap) -> &mut Self {
        self.combine(other, |a, b| a & b)
    }

    /// `self &= !other`.
    pub fn and_not_with(&mut self, other: &Bitmap) -> &mut Self {
        self.combine(other, |a, b| a & !b)
    }

    /// `self ^= other`.
    pub fn xor_with(&mut self, other: &Bitmap) -> &mut Self {
        self.combine(other, |a, b| a ^ b)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Lowest set bit, or `None` for an empty bitmap.
    pub fn first_set(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// Iterates set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }
}
