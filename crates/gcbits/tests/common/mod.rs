//! Span/heap fixtures standing in for the surrounding allocator.

#![allow(dead_code)]

use gcbits::{BitStore, GcBits, Heap, ResolveError, Span};

/// A span with a fixed base address and slot size.
pub struct FixedSpan {
    pub base: usize,
    pub slot_size: usize,
    pub nelems: usize,
    /// Deliberate slot-index offset, used to fake a misaligned bitmap start.
    bit_offset: usize,
    bits: GcBits,
}

impl FixedSpan {
    pub fn new(store: &BitStore, base: usize, slot_size: usize, nelems: usize) -> Self {
        Self::with_offset(store, base, slot_size, nelems, 0)
    }

    /// A span whose bitmap base is offset by `bit_offset` bits, violating
    /// the word-alignment invariant when non-zero.
    pub fn with_offset(
        store: &BitStore,
        base: usize,
        slot_size: usize,
        nelems: usize,
        bit_offset: usize,
    ) -> Self {
        Self {
            base,
            slot_size,
            nelems,
            bit_offset,
            bits: GcBits::new_mark_bits(store, nelems + bit_offset, true).unwrap(),
        }
    }

    pub fn limit(&self) -> usize {
        self.base + self.slot_size * self.nelems
    }

    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.limit()
    }

    pub fn bits(&self) -> &GcBits {
        &self.bits
    }
}

impl Span for FixedSpan {
    fn obj_index(&self, addr: usize) -> usize {
        (addr - self.base) / self.slot_size + self.bit_offset
    }

    fn mark_bits(&self) -> &GcBits {
        &self.bits
    }

    fn set_mark_bits_for_index(&self, index: usize) {
        self.bits.set_marked(index);
    }
}

/// A heap over a fixed list of spans.
pub struct FixedHeap {
    pub spans: Vec<FixedSpan>,
}

impl Heap for FixedHeap {
    type Span = FixedSpan;

    fn span_of(&self, addr: usize) -> Result<&FixedSpan, ResolveError> {
        self.spans
            .iter()
            .find(|span| span.contains(addr))
            .ok_or(ResolveError::NotFound)
    }
}
