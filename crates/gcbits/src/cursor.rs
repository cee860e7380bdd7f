//! Bit cursors: a position on one specific bit of a [`GcBits`] array.
//!
//! [`GcBits`]: crate::GcBits

use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::bits::BITS_PER_WORD;

/// Mask value for the last bit before a word boundary.
const TOP_BIT: u32 = 1 << (BITS_PER_WORD - 1);

/// A lightweight, copyable handle on one bit of a bit array.
///
/// Holds the containing word, a single-bit mask selecting the bit within
/// that word, and the logical 0-based bit index. Derived from
/// [`GcBits::cursor_at`](crate::GcBits::cursor_at) or by resolving a heap
/// address through [`mark_bits_for_addr`](crate::mark_bits_for_addr).
///
/// Advancing past the last valid bit is not checked here; the caller is
/// expected to bound the traversal by the array's element count (or use the
/// counted [`GcBits::iter`](crate::GcBits::iter)). An out-of-range cursor
/// panics on its next word access rather than touching foreign memory.
#[derive(Clone, Copy, Debug)]
pub struct BitCursor<'a> {
    words: &'a [AtomicU32],
    word: usize,
    mask: u32,
    index: usize,
}

impl<'a> BitCursor<'a> {
    pub(crate) fn new(words: &'a [AtomicU32], word: usize, mask: u32, index: usize) -> Self {
        debug_assert_eq!(mask.count_ones(), 1);
        Self {
            words,
            word,
            mask,
            index,
        }
    }

    /// Logical bit index from the start of the array.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Single-bit mask selecting this bit within its word.
    #[must_use]
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    fn word(&self) -> &AtomicU32 {
        &self.words[self.word]
    }

    /// Reports whether the bit is set.
    ///
    /// Plain load, no synchronization: concurrent writers may make the
    /// result stale by the time it is observed. Use it for optimistic
    /// checks, not authoritative decisions.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.word().load(Ordering::Relaxed) & self.mask != 0
    }

    /// Atomically sets the bit.
    ///
    /// Compare-and-exchange retry loop: concurrent workers may target
    /// different bits of the same word and no update is lost regardless of
    /// interleaving. Idempotent. Relaxed ordering is sufficient; the only
    /// contract is single-word linearization.
    pub fn set_marked(&self) {
        self.rmw(|old| old | self.mask);
    }

    /// Atomically clears the bit, under the same retry discipline as
    /// [`set_marked`](Self::set_marked).
    pub fn clear_marked(&self) {
        self.rmw(|old| old & !self.mask);
    }

    fn rmw(&self, apply: impl Fn(u32) -> u32) {
        let word = self.word();
        let mut old = word.load(Ordering::Relaxed);
        loop {
            match word.compare_exchange_weak(old, apply(old), Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(current) => old = current,
            }
        }
    }

    /// Moves the cursor to the next bit in logical order.
    ///
    /// Crossing a word boundary moves the word reference forward and resets
    /// the mask to the lowest bit; otherwise the mask shifts left. The
    /// logical index increments by exactly one either way.
    pub fn advance(&mut self) {
        if self.mask == TOP_BIT {
            self.word += 1;
            self.mask = 1;
        } else {
            self.mask <<= 1;
        }
        self.index += 1;
    }
}

/// Counted iterator over the bits of an array, in logical order.
///
/// Yields exactly `nelems` booleans; see
/// [`GcBits::iter`](crate::GcBits::iter).
#[derive(Debug)]
pub struct BitIter<'a> {
    cursor: BitCursor<'a>,
    remaining: usize,
}

impl<'a> BitIter<'a> {
    pub(crate) fn new(words: &'a [AtomicU32], nelems: usize) -> Self {
        Self {
            cursor: BitCursor::new(words, 0, 1, 0),
            remaining: nelems,
        }
    }
}

impl Iterator for BitIter<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        let marked = self.cursor.is_marked();
        self.remaining -= 1;
        self.cursor.advance();
        Some(marked)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BitIter<'_> {}
impl FusedIterator for BitIter<'_> {}
