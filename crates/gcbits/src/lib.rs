//! Mark/alloc bitmap engine for a span-based tracing garbage collector.
//!
//! Every memory span tracks, per object slot, an **alloc bit** (does the
//! slot hold a live allocation?) and a **mark bit** (was the object reached
//! during the current mark phase?). This crate owns exactly that tracking:
//! bit array allocation and sizing, bit addressing, atomic and non-atomic
//! bit mutation, sequential cursor traversal, and the translation from a
//! raw heap address to its bit position inside a span's bitmap.
//!
//! The span/heap allocator itself, mark-phase scheduling, and sweep-phase
//! reclamation are external collaborators, reachable only through the
//! [`Span`] and [`Heap`] traits.
//!
//! # Layout
//!
//! Bits are packed into 32-bit words, allocated in whole 64-bit blocks from
//! a [`BitStore`] arena, so 64-bit-wide bulk reads never leave the
//! allocation.
//!
//! # Phases and concurrency
//!
//! During the mark phase a bit array is shared by all marking workers:
//! [`BitCursor::set_marked`]/[`BitCursor::clear_marked`] are
//! compare-and-exchange retry loops, so concurrent updates to different
//! bits of the same word are never lost. During initialization and sweep
//! the owner holds the array exclusively and can take the non-atomic fast
//! path through [`GcBits::exclusive`], where the `&mut` borrow stands in
//! for the exclusive-phase precondition.
//!
//! # Quick start
//!
//! ```
//! use gcbits::{BitStore, GcBits};
//!
//! let store = BitStore::new();
//!
//! // One mark-bit array per span, sized to the span's object count.
//! let marks = GcBits::new_mark_bits(&store, 512, true).unwrap();
//! marks.cursor_at(17).set_marked();
//!
//! // Sweep: one pass over the span with a counted iterator.
//! let live = marks.iter().filter(|&marked| marked).count();
//! assert_eq!(live, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod bits;
mod cursor;
mod error;
mod render;
mod span;
mod store;

pub use bits::{ExclusiveBits, GcBits, BITS_PER_WORD};
pub use cursor::{BitCursor, BitIter};
pub use error::{AllocError, ResolveError};
#[cfg(feature = "tracing")]
pub use render::log_bitmap;
pub use render::{bit_string, render32, render64};
pub use span::{mark_bits_for_addr, mark_bits_for_span, Heap, Span};
pub use store::BitStore;
