//! Diagnostic renderers for bitmap contents.
//!
//! Read-only, best-effort formatting for human inspection; the exact output
//! is not contractual. Reads tolerate concurrent mutation (a word observed
//! mid-flip is acceptable for diagnostics).
//!
//! Words print most-significant bit first, so bit 0 of a word is the
//! rightmost character of its group.

use std::fmt::Write;
use std::sync::atomic::Ordering;

use crate::bits::GcBits;

/// Renders the words covering the first `len` bits, one 32-bit binary group
/// per word, space-separated.
#[must_use]
pub fn render32(bits: &GcBits, len: usize) -> String {
    let num = len.div_ceil(32).min(bits.word_count());
    let mut out = String::with_capacity(num * 33);
    for word in &bits.words()[..num] {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{:032b}", word.load(Ordering::Relaxed));
    }
    out
}

/// Renders the words covering the first `len` bits at 64-bit granularity.
///
/// Each group is assembled from a little-endian pair of 32-bit words; the
/// sizing rule guarantees the pair is always allocated.
#[must_use]
pub fn render64(bits: &GcBits, len: usize) -> String {
    let num = len.div_ceil(64).min(bits.word_count() / 2);
    let words = bits.words();
    let mut out = String::with_capacity(num * 65);
    for i in 0..num {
        let lo = u64::from(words[2 * i].load(Ordering::Relaxed));
        let hi = u64::from(words[2 * i + 1].load(Ordering::Relaxed));
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{:064b}", lo | (hi << 32));
    }
    out
}

/// Renders every word covering the array's elements as one unseparated
/// binary string.
#[must_use]
pub fn bit_string(bits: &GcBits) -> String {
    let num = bits.nelems().div_ceil(32);
    let mut out = String::with_capacity(num * 32);
    for word in &bits.words()[..num] {
        let _ = write!(out, "{:032b}", word.load(Ordering::Relaxed));
    }
    out
}

/// Emits the 32-bit rendering of the first `len` bits as a debug event.
#[cfg(feature = "tracing")]
pub fn log_bitmap(bits: &GcBits, len: usize) {
    tracing::debug!(len, words = %render32(bits, len), "bitmap");
}
