//! # brkalloc - A First-Fit Chunk-List Heap Allocator
//!
//! This crate provides a user-space general-purpose dynamic memory
//! allocator built on the program-break (`sbrk`) primitive. It is the
//! classical chunk-list design: a singly-threaded list of in-band headers
//! covering every byte between the heap's start and the current break, with
//! first-fit search, split-on-allocate, and coalesce-on-free.
//!
//! ## Overview
//!
//! ```text
//!   Chunk List Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌──────┬─────┬──────┬─────┬──────┬─────┬───────────────────────┐  │
//!   │   │ Hdr  │BUSY │ Hdr  │FREE │ Hdr  │BUSY │                       │  │
//!   │   └──────┴─────┴──────┴─────┴──────┴─────┴───────────────────────┘  │
//!   │   ▲                                       ▲                         │
//!   │   │                                       │                         │
//!   │  first                                  last                 break  │
//!   │                                                                     │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Every chunk's header + size gives the address of the next chunk —
//!   no separate index, the list lives entirely in the bytes it manages.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── break_source  - BreakSource trait + SbrkBreak (real sbrk)
//!   ├── mock_break     - in-memory BreakSource used only by tests
//!   ├── chunk          - ChunkHeader layout, Flags, address arithmetic
//!   ├── search         - first-fit
//!   ├── split          - split-on-allocate
//!   ├── coalesce       - coalesce-on-free
//!   ├── error          - internal HeapError
//!   ├── heap           - Heap<B>: the Alloc/Free/Realloc dispatch
//!   └── dump           - read-only diagnostic walk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brkalloc::{alloc, free, realloc};
//!
//! fn main() {
//!     unsafe {
//!         let p = alloc(64) as *mut u64;
//!         *p = 42;
//!         println!("Value: {}", *p);
//!
//!         let p = realloc(p as *mut u8, 128);
//!         free(p);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! The allocator uses `sbrk(2)` to extend the program's data segment, the
//! same mechanism described in the diagram below, and never shrinks it —
//! freed chunks stay in the list as FREE, available for reuse, rather than
//! being returned to the OS.
//!
//! ```text
//!   Program Memory Layout:
//!
//!   High Address ┌─────────────────────┐
//!                │       Stack         │ ↓ grows down
//!                │         │           │
//!                │         ▼           │
//!                │                     │
//!                │         ▲           │
//!                │         │           │
//!                │       Heap          │ ↑ grows up (sbrk)
//!                ├─────────────────────┤ ← Program Break
//!                │   Uninitialized     │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │   Initialized       │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │       Text          │
//!   Low Address  └─────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **First-fit search**: walks the chunk list in address order
//! - **Split on allocate**: a chunk larger than needed donates its tail back
//!   to the free list rather than being handed out whole
//! - **Coalesce on free**: adjacent FREE chunks merge immediately, bounding
//!   external fragmentation to one free run between any two BUSY chunks
//! - **In-place realloc**: grows into a free successor or the break itself
//!   before falling back to allocate-copy-free
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; see [`heap`]
//! - **Monotonic break**: the break only ever grows
//! - **Unix-only**: requires `libc` and `sbrk` (POSIX systems)
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! All allocation and deallocation operations require `unsafe` blocks, and
//! none of them are safe to call concurrently from more than one thread.

pub mod break_source;
pub mod chunk;
pub mod coalesce;
pub mod dump;
pub mod error;
pub mod heap;
#[cfg(test)]
mod mock_break;
pub mod search;
pub mod split;

#[cfg(test)]
mod tests;

use std::cell::UnsafeCell;

use break_source::SbrkBreak;
use heap::Heap;

/// The process-wide heap instance. A `static` (rather than the usual
/// per-allocation-site construction pattern) is what lets [`alloc`],
/// [`free`] and [`realloc`] take no heap-state parameter, matching the
/// classical C allocator surface this crate mirrors. `UnsafeCell` opts the
/// static out of requiring `Sync`; the crate's explicit non-goal of thread
/// safety (§5) means nothing here synchronizes concurrent access, so two
/// threads calling these functions at once is undefined behavior by
/// contract, not just by omission.
struct GlobalHeap(UnsafeCell<Heap<SbrkBreak>>);

// SAFETY: not actually safe to share across threads; asserted here only so
// the static below can exist. Concurrent use remains the caller's
// responsibility per the crate's documented non-goal.
unsafe impl Sync for GlobalHeap {}

static HEAP: GlobalHeap = GlobalHeap(UnsafeCell::new(Heap::new(SbrkBreak)));

/// # Safety
///
/// Must not be called concurrently with any other call into this module.
unsafe fn with_heap<R>(f: impl FnOnce(&mut Heap<SbrkBreak>) -> R) -> R {
    // SAFETY: upheld by the caller; `HEAP` is never aliased across an
    // `&raw mut` reborrow within a single-threaded call sequence.
    let heap = unsafe { &mut *HEAP.0.get() };
    f(heap)
}

/// `Alloc(n)`. Returns null on failure (out of memory, or `n == 0`).
///
/// # Safety
///
/// Must not be called concurrently with any other call into this module.
pub unsafe fn alloc(size: usize) -> *mut u8 {
    unsafe { with_heap(|heap| heap.alloc(size)) }
}

/// `Free(p)`. A silent no-op for null, already-free, or out-of-range
/// pointers.
///
/// # Safety
///
/// `p` must be null or a value previously returned by [`alloc`]/[`realloc`].
/// Must not be called concurrently with any other call into this module.
pub unsafe fn free(payload: *mut u8) {
    unsafe { with_heap(|heap| heap.free(payload)) }
}

/// `Realloc(p, m)`.
///
/// # Safety
///
/// Same obligations as [`free`]/[`alloc`] combined.
pub unsafe fn realloc(payload: *mut u8, new_size: usize) -> *mut u8 {
    unsafe { with_heap(|heap| heap.realloc(payload, new_size)) }
}

/// Prints the current chunk list to stdout for diagnostics. See
/// [`dump::dump`].
///
/// # Safety
///
/// Must not be called concurrently with any other call into this module.
pub unsafe fn dump() {
    unsafe { with_heap(|heap| dump::dump(heap.first_chunk())) }
}
