//! Zero-filled anonymous memory mappings.
//!
//! Bitmap word storage is carved out of mappings obtained here. The OS
//! guarantees fresh anonymous pages are zero-filled, which is what lets the
//! bitmap layer hand out "all bits clear" storage without an initialization
//! pass.

use std::io;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as os;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as os;

pub use os::page_size;

/// A handle to a zero-filled anonymous memory mapping.
///
/// The region is automatically unmapped when this handle is dropped.
pub struct Mmap {
    inner: os::MmapInner,
}

impl Mmap {
    /// Maps `len` bytes of zero-filled anonymous memory.
    ///
    /// The returned region is readable and writable, page-aligned, and
    /// guaranteed to contain only zero bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is zero or the OS cannot satisfy the
    /// mapping request.
    pub fn map_zeroed(len: usize) -> io::Result<Self> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "length must be greater than 0",
            ));
        }
        // SAFETY: len is non-zero; the backend validates the rest.
        let inner = unsafe { os::MmapInner::map_anon(len)? };
        Ok(Self { inner })
    }

    /// Returns a pointer to the start of the mapping.
    #[must_use]
    pub fn ptr(&self) -> *mut u8 {
        self.inner.ptr()
    }

    /// Returns the length of the mapping in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the mapping has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

// SAFETY: the mapping is plain memory; the handle carries no thread affinity.
unsafe impl Send for Mmap {}
// SAFETY: shared access to the handle only exposes the pointer and length.
unsafe impl Sync for Mmap {}

#[cfg(test)]
mod tests {
    use super::Mmap;

    #[test]
    fn map_zeroed_returns_zero_filled_memory() {
        let map = Mmap::map_zeroed(4096).unwrap();
        assert_eq!(map.len(), 4096);
        let slice = unsafe { std::slice::from_raw_parts(map.ptr(), map.len()) };
        assert!(slice.iter().all(|&b| b == 0));
    }

    #[test]
    fn map_zeroed_memory_is_writable() {
        let map = Mmap::map_zeroed(4096).unwrap();
        unsafe {
            map.ptr().write(0xAB);
            assert_eq!(map.ptr().read(), 0xAB);
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(Mmap::map_zeroed(0).is_err());
    }

    #[test]
    fn page_size_is_nonzero_power_of_two() {
        let size = super::page_size();
        assert!(size.is_power_of_two());
    }
}
