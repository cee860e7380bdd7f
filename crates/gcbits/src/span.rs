//! Address-to-bit resolution at the span/bitmap seam.
//!
//! The span and heap structures live in the surrounding allocator; this
//! module only defines the interface it consumes ([`Span`], [`Heap`]) and
//! the two entry points the mark phase calls through it.

use crate::bits::GcBits;
use crate::cursor::BitCursor;
use crate::error::ResolveError;

/// A contiguous heap region divided into equally-sized object slots.
///
/// Implemented by the allocator's span type. The bitmap engine never
/// inspects span layout itself; it trusts [`obj_index`](Self::obj_index) to
/// map an address (including interior pointers) to its slot.
pub trait Span {
    /// Slot index of the object containing `addr`.
    ///
    /// `addr` is guaranteed to lie inside this span (the heap resolved it
    /// here first).
    fn obj_index(&self, addr: usize) -> usize;

    /// The span's mark-bit array.
    fn mark_bits(&self) -> &GcBits;

    /// Hook invoked after a mark-bit cursor is resolved for an address,
    /// letting the span record the mark in its own bookkeeping.
    fn set_mark_bits_for_index(&self, index: usize);
}

/// Address-to-span resolution, supplied by the heap.
pub trait Heap {
    /// The span type this heap manages.
    type Span: Span;

    /// Finds the span owning `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if no span contains the address.
    fn span_of(&self, addr: usize) -> Result<&Self::Span, ResolveError>;
}

/// Resolves `addr` to its mark bit and records the mark.
///
/// This is the single entry point by which the collector marks an object
/// reachable: it resolves the owning span, computes the slot index, invokes
/// the span's [`set_mark_bits_for_index`](Span::set_mark_bits_for_index)
/// hook, and returns a cursor on the slot's mark bit. Resolve-and-mutate,
/// not a pure query.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if no span contains `addr`; no bitmap
/// state is touched in that case.
///
/// # Panics
///
/// Panics if the span reports a slot index outside its own mark-bit array,
/// which indicates a span-layout bug upstream.
pub fn mark_bits_for_addr<H: Heap>(addr: usize, heap: &H) -> Result<BitCursor<'_>, ResolveError> {
    let span = heap.span_of(addr)?;
    let index = span.obj_index(addr);
    span.set_mark_bits_for_index(index);
    #[cfg(feature = "tracing")]
    tracing::trace!(addr, index, "mark_bits_for_addr");
    Ok(span.mark_bits().cursor_at(index))
}

/// Resolves the mark bit for a span's first object and validates alignment.
///
/// Every span's bitmap must start at a word boundary; the returned cursor
/// therefore must carry mask 1 and index 0. A violation indicates a bug in
/// the span-layout logic upstream, surfaced as
/// [`ResolveError::UnalignedSpanStart`] so the caller can treat it as a
/// fatal internal-consistency failure.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if `base` resolves to no span, and
/// [`ResolveError::UnalignedSpanStart`] if the resolved cursor is not
/// word-aligned.
pub fn mark_bits_for_span<H: Heap>(base: usize, heap: &H) -> Result<BitCursor<'_>, ResolveError> {
    let cursor = mark_bits_for_addr(base, heap)?;
    if cursor.mask() != 1 || cursor.index() != 0 {
        return Err(ResolveError::UnalignedSpanStart);
    }
    Ok(cursor)
}
