//! Backing storage for bitmap words.
//!
//! A [`BitStore`] is a bump arena over anonymous memory mappings. Every block
//! it hands out is 64-bit aligned and zero-filled: blocks come straight from
//! fresh mappings and are never recycled, so the zero-fill guarantee of
//! [`raw_mem::Mmap::map_zeroed`] carries through to every bitmap with no
//! initialization pass.
//!
//! Mappings stay alive until the store *and* every bitmap carved from it have
//! been dropped; each [`GcBits`](crate::GcBits) holds a handle on the arena.

use std::ptr::NonNull;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use parking_lot::Mutex;
use raw_mem::{page_size, Mmap};

use crate::error::AllocError;

/// Minimum bytes mapped per arena chunk.
const MIN_CHUNK_BYTES: usize = 64 * 1024;

/// Arena supplying zeroed, 64-bit-aligned word blocks for bitmaps.
///
/// Cloning is cheap; clones share the same arena.
#[derive(Clone)]
pub struct BitStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    bump: Mutex<Bump>,
}

struct Bump {
    chunks: Vec<Mmap>,
    /// Bump offset into the last chunk.
    offset: usize,
}

/// Opaque keep-alive handle held by each bitmap.
pub(crate) struct StoreHandle(#[allow(dead_code)] Arc<StoreInner>);

impl BitStore {
    /// Creates an empty store. No memory is mapped until the first request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                bump: Mutex::new(Bump {
                    chunks: Vec::new(),
                    offset: 0,
                }),
            }),
        }
    }

    /// Hands out `word_count` zeroed 32-bit words, 64-bit aligned.
    ///
    /// `word_count` must be a non-zero multiple of 2 so that every block
    /// covers whole 64-bit units.
    pub(crate) fn alloc_words(&self, word_count: usize) -> Result<NonNull<AtomicU32>, AllocError> {
        debug_assert!(word_count > 0 && word_count % 2 == 0);
        let bytes = word_count * 4;

        let mut bump = self.inner.bump.lock();
        let offset = bump.offset;
        let remaining = bump.chunks.last().map_or(0, |chunk| chunk.len() - offset);
        if remaining < bytes {
            let chunk_len = bytes
                .max(MIN_CHUNK_BYTES)
                .next_multiple_of(page_size().max(8));
            bump.chunks.push(Mmap::map_zeroed(chunk_len)?);
            bump.offset = 0;
        }

        let Some(chunk) = bump.chunks.last() else {
            unreachable!()
        };
        // Chunks are page-aligned and `bytes` is always a multiple of 8, so
        // every block starts 64-bit aligned.
        // SAFETY: offset + bytes <= chunk.len() was just established.
        let block = unsafe { chunk.ptr().add(bump.offset) };
        bump.offset += bytes;

        // SAFETY: the mapping base is non-null and offsets stay in bounds.
        Ok(unsafe { NonNull::new_unchecked(block.cast::<AtomicU32>()) })
    }

    /// Total bytes currently mapped by the arena.
    #[must_use]
    pub fn mapped_bytes(&self) -> usize {
        self.inner.bump.lock().chunks.iter().map(Mmap::len).sum()
    }

    pub(crate) fn handle(&self) -> StoreHandle {
        StoreHandle(Arc::clone(&self.inner))
    }
}

impl Default for BitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::BitStore;
    use std::sync::atomic::Ordering;

    #[test]
    fn blocks_are_zeroed_and_aligned() {
        let store = BitStore::new();
        for _ in 0..16 {
            let block = store.alloc_words(6).unwrap();
            assert_eq!(block.as_ptr() as usize % 8, 0);
            for i in 0..6 {
                let word = unsafe { &*block.as_ptr().add(i) };
                assert_eq!(word.load(Ordering::Relaxed), 0);
            }
        }
    }

    #[test]
    fn blocks_do_not_overlap() {
        let store = BitStore::new();
        let a = store.alloc_words(2).unwrap();
        let b = store.alloc_words(2).unwrap();
        assert!(b.as_ptr() as usize >= a.as_ptr() as usize + 8);
    }

    #[test]
    fn arena_grows_by_whole_chunks() {
        let store = BitStore::new();
        assert_eq!(store.mapped_bytes(), 0);
        store.alloc_words(2).unwrap();
        let after_first = store.mapped_bytes();
        assert!(after_first >= 8);
        // Oversized request forces a dedicated chunk.
        store.alloc_words(after_first / 2).unwrap();
        assert!(store.mapped_bytes() > after_first);
    }
}
