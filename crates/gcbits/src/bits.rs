//! Per-span mark/alloc bit arrays.
//!
//! A [`GcBits`] packs one bit per object slot into 32-bit words, allocated in
//! whole 64-bit blocks. A span owns two of these: alloc bits and mark bits,
//! each sized to the span's object count. During the mark phase the array is
//! shared by all marking workers and mutated through atomic
//! [`BitCursor`](crate::BitCursor) operations; during initialization and
//! sweep the owner holds it exclusively and may use the non-atomic
//! [`ExclusiveBits`] fast path.

use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::cursor::{BitCursor, BitIter};
use crate::error::AllocError;
use crate::store::{BitStore, StoreHandle};

/// Bits per addressing word.
pub const BITS_PER_WORD: usize = 32;

/// A packed bit array, one bit per tracked object slot.
///
/// Storage is rounded up to whole 64-bit blocks even though addressing is in
/// 32-bit words, so any 64-bit-wide bulk read of the array stays inside the
/// allocation.
///
/// # Example
///
/// ```
/// use gcbits::{BitStore, GcBits};
///
/// let store = BitStore::new();
/// let bits = GcBits::new_mark_bits(&store, 128, true).unwrap();
///
/// let cursor = bits.cursor_at(5);
/// assert!(!cursor.is_marked());
/// cursor.set_marked();
/// assert!(cursor.is_marked());
/// ```
pub struct GcBits {
    words: NonNull<AtomicU32>,
    word_count: usize,
    nelems: usize,
    /// Keeps the backing mappings alive for as long as this array exists.
    _store: StoreHandle,
}

// SAFETY: the word block is exclusively owned by this array and all shared
// mutation goes through the atomics.
unsafe impl Send for GcBits {}
// SAFETY: see above; `&GcBits` only exposes atomic word access.
unsafe impl Sync for GcBits {}

impl GcBits {
    /// Creates a bit array sized for `nelems` object slots.
    ///
    /// With `zeroed` every bit starts clear; the storage comes zero-filled
    /// from the allocator, so no initialization pass runs. Without `zeroed`
    /// every bit starts set: each allocated word is flipped to all-ones,
    /// which is correct regardless of word-count parity. The polarity of the
    /// bits (1 = free vs. 1 = allocated) is a caller convention.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the underlying allocator cannot satisfy the
    /// storage request. The failure is not retried here.
    pub fn new_mark_bits(store: &BitStore, nelems: usize, zeroed: bool) -> Result<Self, AllocError> {
        let word_count = Self::words_for(nelems);
        let words = if word_count == 0 {
            NonNull::dangling()
        } else {
            store.alloc_words(word_count)?
        };
        let bits = Self {
            words,
            word_count,
            nelems,
            _store: store.handle(),
        };
        if !zeroed {
            for word in bits.words() {
                word.store(!word.load(Ordering::Relaxed), Ordering::Relaxed);
            }
        }
        Ok(bits)
    }

    /// Creates an alloc-bit array: every bit starts set.
    ///
    /// Sugar for `new_mark_bits(store, nelems, false)`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if storage cannot be allocated.
    pub fn new_alloc_bits(store: &BitStore, nelems: usize) -> Result<Self, AllocError> {
        Self::new_mark_bits(store, nelems, false)
    }

    /// Number of 32-bit words allocated for `nelems` bits: whole 64-bit
    /// blocks, i.e. `ceil(nelems / 64) * 2`.
    #[must_use]
    pub const fn words_for(nelems: usize) -> usize {
        nelems.div_ceil(64) * 2
    }

    /// Logical bit count this array was sized for.
    #[must_use]
    pub const fn nelems(&self) -> usize {
        self.nelems
    }

    /// Number of allocated 32-bit words.
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Word index and single-bit mask for bit `n`. Pure arithmetic, no
    /// bounds check.
    #[must_use]
    pub const fn bit_position(n: usize) -> (usize, u32) {
        (n / BITS_PER_WORD, 1 << (n % BITS_PER_WORD))
    }

    pub(crate) fn words(&self) -> &[AtomicU32] {
        // SAFETY: the block holds `word_count` words, is exclusively owned
        // by this array, and the mappings are kept alive by `_store`.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr(), self.word_count) }
    }

    /// Returns a cursor positioned on bit `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    #[must_use]
    pub fn cursor_at(&self, n: usize) -> BitCursor<'_> {
        assert!(
            n < self.nelems,
            "bit index {n} out of range for {} elements",
            self.nelems
        );
        // SAFETY: just checked n < nelems.
        unsafe { self.cursor_at_unchecked(n) }
    }

    /// Returns a cursor positioned on bit `n` without a bounds check.
    ///
    /// # Safety
    ///
    /// `n` must be less than [`nelems`](Self::nelems).
    #[must_use]
    pub unsafe fn cursor_at_unchecked(&self, n: usize) -> BitCursor<'_> {
        let (word, mask) = Self::bit_position(n);
        BitCursor::new(self.words(), word, mask, n)
    }

    /// Reports whether bit `n` is set. Convenience for deriving a cursor
    /// and calling [`BitCursor::is_marked`].
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    #[must_use]
    pub fn is_marked(&self, n: usize) -> bool {
        self.cursor_at(n).is_marked()
    }

    /// Atomically sets bit `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    pub fn set_marked(&self, n: usize) {
        self.cursor_at(n).set_marked();
    }

    /// Atomically clears bit `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    pub fn clear_marked(&self, n: usize) {
        self.cursor_at(n).clear_marked();
    }

    /// Flips every word covering the first `len` bits.
    ///
    /// Used to flip an entire bitmap's polarity in bulk, e.g. converting
    /// swept bits back to free bits between GC cycles. Each word is flipped
    /// with an individual atomic store; concurrent readers may observe the
    /// flip word by word.
    ///
    /// # Panics
    ///
    /// Panics if `len > nelems`.
    pub fn invert(&self, len: usize) {
        assert!(
            len <= self.nelems,
            "invert length {len} out of range for {} elements",
            self.nelems
        );
        let mut num = len / BITS_PER_WORD + 1;
        if len % BITS_PER_WORD == 0 {
            num -= 1;
        }
        for word in &self.words()[..num] {
            word.store(!word.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    /// Iterates over all `nelems` bits in logical order.
    ///
    /// This is the bounded counterpart to manually advancing a cursor: the
    /// iterator stops after exactly `nelems` bits.
    #[must_use]
    pub fn iter(&self) -> BitIter<'_> {
        BitIter::new(self.words(), self.nelems)
    }

    /// Claims exclusive access for non-atomic mutation.
    ///
    /// The `&mut` borrow is the proof that no marking worker can observe the
    /// array, making the plain read-modify-write in [`ExclusiveBits`] sound.
    /// Intended for single-threaded bitmap initialization and sweep-phase
    /// clearing.
    #[must_use]
    pub fn exclusive(&mut self) -> ExclusiveBits<'_> {
        // SAFETY: `&mut self` guarantees no other reference to the block
        // exists for the lifetime of the returned token.
        let words =
            unsafe { std::slice::from_raw_parts_mut(self.words.as_ptr(), self.word_count) };
        ExclusiveBits {
            words,
            nelems: self.nelems,
        }
    }
}

impl<'a> IntoIterator for &'a GcBits {
    type Item = bool;
    type IntoIter = BitIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for GcBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcBits")
            .field("nelems", &self.nelems)
            .field("word_count", &self.word_count)
            .finish_non_exhaustive()
    }
}

/// Capability token for the non-atomic mutation fast path.
///
/// Obtained from [`GcBits::exclusive`]; holding it statically proves the
/// exclusive-phase precondition, so mutation here is a plain `|=`/`&=` with
/// no synchronization.
pub struct ExclusiveBits<'a> {
    words: &'a mut [AtomicU32],
    nelems: usize,
}

impl ExclusiveBits<'_> {
    /// Sets bit `n` non-atomically.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    pub fn set(&mut self, n: usize) {
        let (word, mask) = self.position(n);
        *self.words[word].get_mut() |= mask;
    }

    /// Clears bit `n` non-atomically.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    pub fn clear(&mut self, n: usize) {
        let (word, mask) = self.position(n);
        *self.words[word].get_mut() &= !mask;
    }

    /// Reports whether bit `n` is set.
    ///
    /// # Panics
    ///
    /// Panics if `n >= nelems`.
    #[must_use]
    pub fn is_set(&self, n: usize) -> bool {
        let (word, mask) = self.position(n);
        self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    fn position(&self, n: usize) -> (usize, u32) {
        assert!(
            n < self.nelems,
            "bit index {n} out of range for {} elements",
            self.nelems
        );
        GcBits::bit_position(n)
    }
}
