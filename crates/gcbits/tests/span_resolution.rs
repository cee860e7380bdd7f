//! Address-to-bit resolution against fixture spans.

mod common;

use common::{FixedHeap, FixedSpan};
use gcbits::{mark_bits_for_addr, mark_bits_for_span, BitStore, ResolveError};

fn two_span_heap(store: &BitStore) -> FixedHeap {
    FixedHeap {
        spans: vec![
            FixedSpan::new(store, 0x1000, 64, 128),
            FixedSpan::new(store, 0x2000_0000, 16, 256),
        ],
    }
}

#[test]
fn resolving_an_address_marks_its_slot() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);

    let cursor = mark_bits_for_addr(0x1000 + 5 * 64, &heap).unwrap();
    assert_eq!(cursor.index(), 5);
    assert!(cursor.is_marked());

    let span = &heap.spans[0];
    for n in 0..span.nelems {
        assert_eq!(span.bits().is_marked(n), n == 5);
    }
}

#[test]
fn interior_pointers_resolve_to_the_containing_slot() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);

    let cursor = mark_bits_for_addr(0x1000 + 5 * 64 + 13, &heap).unwrap();
    assert_eq!(cursor.index(), 5);
}

#[test]
fn spans_are_selected_by_address() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);

    mark_bits_for_addr(0x2000_0000 + 7 * 16, &heap).unwrap();
    assert!(heap.spans[1].bits().is_marked(7));
    assert!(heap.spans[0].bits().iter().all(|marked| !marked));
}

#[test]
fn unknown_address_is_not_found_and_mutates_nothing() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);

    assert_eq!(
        mark_bits_for_addr(0xdead, &heap).unwrap_err(),
        ResolveError::NotFound
    );
    for span in &heap.spans {
        assert!(span.bits().iter().all(|marked| !marked));
    }
}

#[test]
fn span_base_resolves_to_an_aligned_cursor() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);

    let cursor = mark_bits_for_span(0x1000, &heap).unwrap();
    assert_eq!(cursor.mask(), 1);
    assert_eq!(cursor.index(), 0);
    assert!(cursor.is_marked());
}

#[test]
fn offset_bitmap_base_is_rejected() {
    let store = BitStore::new();
    let heap = FixedHeap {
        spans: vec![FixedSpan::with_offset(&store, 0x1000, 64, 128, 1)],
    };

    assert_eq!(
        mark_bits_for_span(0x1000, &heap).unwrap_err(),
        ResolveError::UnalignedSpanStart
    );
}

#[test]
fn sweep_traversal_enumerates_resolved_marks() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);
    let span = &heap.spans[0];

    for slot in [0, 31, 32, 100, 127] {
        mark_bits_for_addr(span.base + slot * span.slot_size, &heap).unwrap();
    }

    // Sweep walks the bitmap once instead of re-resolving addresses.
    let live: Vec<usize> = span
        .bits()
        .iter()
        .enumerate()
        .filter_map(|(n, marked)| marked.then_some(n))
        .collect();
    assert_eq!(live, vec![0, 31, 32, 100, 127]);
}

#[test]
fn cursor_advance_walks_a_span_without_re_resolving() {
    let store = BitStore::new();
    let heap = two_span_heap(&store);
    let span = &heap.spans[0];
    mark_bits_for_addr(span.base + 40 * span.slot_size, &heap).unwrap();

    let mut cursor = mark_bits_for_span(span.base, &heap).unwrap();
    // Bit 0 was set by resolving the base; clear it to isolate slot 40.
    cursor.clear_marked();

    let mut live = Vec::new();
    for n in 0..span.nelems {
        if cursor.is_marked() {
            live.push(n);
        }
        if n + 1 < span.nelems {
            cursor.advance();
        }
    }
    assert_eq!(live, vec![40]);
}
