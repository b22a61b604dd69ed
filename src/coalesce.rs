//! Coalesce (§4.2 steps 2-4): merging adjacent FREE chunks on `Free`.
//!
//! A single leftward step followed by a greedy rightward walk is enough to
//! restore invariant §3.3.6 (no two consecutive FREE chunks) because the
//! leftward neighbor of a FREE chunk can never itself be FREE — if it were,
//! the previous `Free` call would already have merged them.

use crate::chunk::{next_addr, ChunkHeader, Flags};

/// Merges `chunk` (already marked FREE by the caller) with its FREE
/// neighbors. Returns the header of the chunk that survives the merge
/// (which may be `chunk` itself, or its left neighbor).
///
/// Updates `last` if the rightward walk consumes the former last chunk.
///
/// # Safety
///
/// `chunk` must be FREE and part of a well-formed chunk list headed
/// somewhere reachable from the allocator's `first`.
pub unsafe fn coalesce(
    mut chunk: *mut ChunkHeader,
    last: &mut *mut ChunkHeader,
) -> *mut ChunkHeader {
    unsafe {
        debug_assert_eq!((*chunk).flags, Flags::FREE);

        // Leftward merge: a single step suffices (see module docs).
        let left = (*chunk).prev;
        if !left.is_null() && (*left).flags == Flags::FREE {
            chunk = left;
        }

        // Rightward merge: walk while successors are FREE, accumulating
        // their footprints (header + payload) into the survivor's size.
        let mut extra = 0usize;
        let mut stop = next_addr(chunk);
        while !stop.is_null() && (*stop).flags == Flags::FREE {
            extra += crate::chunk::header_size() + (*stop).size;
            stop = (*stop).next;
        }

        if extra > 0 {
            (*chunk).size += extra;
            (*chunk).next = stop;
            if !stop.is_null() {
                (*stop).prev = chunk;
            } else {
                *last = chunk;
            }
        }

        chunk
    }
}
