use super::*;
use std::alloc::Layout;

// -- Raw allocation ---------------------------------------------------------

#[test]
fn new_and_drop() {
    let arena = Arena::new();
    assert_eq!(arena.allocated_bytes(), 0);
    drop(arena);
}

#[test]
fn alloc_returns_aligned_pointers() {
    let arena = Arena::new();
    for align in [1, 2, 4, 8, 16] {
        let layout = Layout::from_size_align(16, align).unwrap();
        let ptr = arena.alloc(layout);
        assert_eq!(ptr.as_ptr() as usize % align, 0, "align={align}");
    }
}

#[test]
fn alloc_multiple_no_overlap() {
    let arena = Arena::new();
    let layout = Layout::from_size_align(64, 8).unwrap();
    let a = arena.alloc(layout);
    let b = arena.alloc(layout);

    let a_range = a.as_ptr() as usize..a.as_ptr() as usize + 64;
    assert!(!a_range.contains(&(b.as_ptr() as usize)));
}

#[test]
fn alloc_triggers_slab_growth() {
    let arena = Arena::new();
    let layout = Layout::from_size_align(128, 1).unwrap();
    for _ in 0..20 {
        let ptr = arena.alloc(layout);
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), 0xCC, 128);
        }
    }
    // 20 * 128 bytes cannot fit the first 1 KiB slab.
    assert!(arena.allocated_bytes() > INITIAL_SLAB_SIZE);
}

#[test]
fn alloc_zst() {
    let arena = Arena::new();
    let layout = Layout::from_size_align(0, 1).unwrap();
    let ptr = arena.alloc(layout);
    assert_eq!(ptr.as_ptr() as usize, 1);
    assert_eq!(arena.allocated_bytes(), 0);
}

// -- Typed helpers ----------------------------------------------------------

#[test]
fn alloc_str_copies() {
    let arena = Arena::new();
    let source = String::from("duplicated");
    let copy = arena.alloc_str(&source);
    drop(source);
    assert_eq!(copy, "duplicated");
    assert_eq!(arena.alloc_str(""), "");
}

#[test]
fn alloc_value_and_slice_copy() {
    let arena = Arena::new();
    let n = arena.alloc_value(0x1234_5678_u64);
    assert_eq!(*n, 0x1234_5678);
    assert_eq!(n as *const u64 as usize % std::mem::align_of::<u64>(), 0);

    let items = arena.alloc_slice_copy(&[1u16, 2, 3]);
    assert_eq!(items, &[1, 2, 3]);
    let empty: &[u16] = arena.alloc_slice_copy(&[]);
    assert!(empty.is_empty());
}

#[test]
fn alloc_slice_with_fills_in_order() {
    let arena = Arena::new();
    let squares = arena
        .alloc_slice_with(5, |i| Ok::<_, ()>((i * i) as u32))
        .unwrap();
    assert_eq!(squares, &[0, 1, 4, 9, 16]);
}

#[test]
fn alloc_slice_with_allows_nested_allocation() {
    let arena = Arena::new();
    let words = arena
        .alloc_slice_with(3, |i| Ok::<_, ()>(arena.alloc_str(&"x".repeat(i + 1))))
        .unwrap();
    assert_eq!(words, &["x", "xx", "xxx"]);
}

#[test]
fn alloc_slice_with_stops_at_first_error() {
    let arena = Arena::new();
    let mut calls = 0;
    let result = arena.alloc_slice_with(4, |i| {
        calls += 1;
        if i == 2 { Err("boom") } else { Ok(i as u8) }
    });
    assert_eq!(result, Err("boom"));
    assert_eq!(calls, 3);
}

#[test]
fn alloc_slice_fill_mut_is_writable() {
    let arena = Arena::new();
    let slots = arena.alloc_slice_fill_mut(3, 7i32);
    assert_eq!(slots, &[7, 7, 7]);
    slots[1] = 9;
    assert_eq!(slots, &[7, 9, 7]);
}

// -- Scratch ----------------------------------------------------------------

#[test]
fn scratch_push_extend_commit() {
    let arena = Arena::new();
    arena.alloc(Layout::from_size_align(1, 1).unwrap());

    let mut scratch = unsafe { arena.scratch() };
    scratch.push(b'h');
    scratch.push(b'i');
    scratch.extend(b" there");
    assert_eq!(scratch.as_bytes(), b"hi there");
    assert_eq!(scratch.commit(), b"hi there");
}

#[test]
fn scratch_commit_empty() {
    let arena = Arena::new();
    let scratch = unsafe { arena.scratch() };
    assert_eq!(scratch.commit(), b"");
}

#[test]
fn scratch_commit_advances_ptr() {
    let arena = Arena::new();
    arena.alloc(Layout::from_size_align(1, 1).unwrap());

    let mut scratch = unsafe { arena.scratch() };
    scratch.extend(b"data");
    let committed = scratch.commit();

    let next = arena.alloc(Layout::from_size_align(4, 1).unwrap());
    let committed_range =
        committed.as_ptr() as usize..committed.as_ptr() as usize + committed.len();
    assert!(!committed_range.contains(&(next.as_ptr() as usize)));
}

#[test]
fn scratch_drop_without_commit_is_reused() {
    let arena = Arena::new();
    arena.alloc(Layout::from_size_align(1, 1).unwrap());
    let ptr_before = arena.ptr.get();

    {
        let mut scratch = unsafe { arena.scratch() };
        scratch.extend(b"discarded");
    }

    assert_eq!(arena.ptr.get(), ptr_before);
}

#[test]
fn scratch_grow_preserves_data() {
    let arena = Arena::new();
    arena.alloc(Layout::from_size_align(1, 1).unwrap());

    let mut scratch = unsafe { arena.scratch() };
    let pattern: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
    scratch.extend(&pattern);
    scratch.push(b'!');
    let committed = scratch.commit();
    assert_eq!(&committed[..2048], &pattern[..]);
    assert_eq!(committed[2048], b'!');
}
