//! Integration tests against the public free-function API (§6), exercising
//! the real process break rather than [`crate::mock_break::MockBreak`].
//!
//! Every other test module in this crate builds a fresh [`crate::heap::Heap`]
//! per test, so tests can assert on exact chunk-list shape. The global
//! [`alloc`]/[`free`]/[`realloc`] surface shares one process-wide heap
//! (§9's resolution for "no heap-state parameter"), so these tests instead
//! assert on round-trip behavior local to each test's own allocations, and
//! serialize with a mutex since the allocator itself carries no thread
//! safety (§5) and `cargo test` runs tests on multiple threads by default.

use std::sync::Mutex;

use crate::{alloc, dump, free, realloc};

static SERIAL: Mutex<()> = Mutex::new(());

#[test]
fn alloc_write_read_free_round_trips() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let p = alloc(64) as *mut u64;
        assert!(!p.is_null());
        *p = 0xC0FFEE;
        assert_eq!(*p, 0xC0FFEE);
        free(p as *mut u8);
    }
}

#[test]
fn zero_size_alloc_returns_null() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        assert!(alloc(0).is_null());
    }
}

#[test]
fn free_of_null_does_not_panic() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        free(std::ptr::null_mut());
    }
}

#[test]
fn realloc_null_behaves_like_alloc() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let p = realloc(std::ptr::null_mut(), 32);
        assert!(!p.is_null());
        free(p);
    }
}

#[test]
fn realloc_to_zero_frees_and_returns_null() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let p = alloc(32);
        let r = realloc(p, 0);
        assert!(r.is_null());
    }
}

#[test]
fn realloc_preserves_contents_across_growth() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let p = alloc(8) as *mut u64;
        assert!(!p.is_null());
        *p = 0xDEAD_BEEF;
        let grown = realloc(p as *mut u8, 256) as *mut u64;
        assert!(!grown.is_null());
        assert_eq!(*grown, 0xDEAD_BEEF);
        free(grown as *mut u8);
    }
}

#[test]
fn freed_space_is_reusable_by_a_later_allocation_of_the_same_size() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let a = alloc(40);
        assert!(!a.is_null());
        free(a);
        let b = alloc(40);
        assert!(!b.is_null());
        free(b);
    }
}

#[test]
fn dump_does_not_panic_before_or_after_allocation() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        dump();
        let p = alloc(16);
        dump();
        free(p);
        dump();
    }
}

#[test]
fn many_small_allocations_all_get_distinct_writable_regions() {
    let _guard = SERIAL.lock().unwrap();
    unsafe {
        let ptrs: Vec<*mut u8> = (0..32).map(|_| alloc(24)).collect();
        assert!(ptrs.iter().all(|p| !p.is_null()));
        for (i, &p) in ptrs.iter().enumerate() {
            *(p as *mut u8) = i as u8;
        }
        for (i, &p) in ptrs.iter().enumerate() {
            assert_eq!(*(p as *mut u8), i as u8);
        }
        for p in ptrs {
            free(p);
        }
    }
}
