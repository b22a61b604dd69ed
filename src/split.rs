//! Split (§4.5): divide a FREE chunk into a left chunk of the requested
//! size and a right FREE remainder.

use crate::chunk::{header_size, write_header, ChunkHeader, Flags, MIN_BLOCK};

/// Returns `true` if splitting a FREE chunk of `chunk_size` payload bytes at
/// `requested` would leave a remainder big enough to host its own chunk
/// (header + `MIN_BLOCK`). Both [`crate::heap`]'s Alloc and Realloc paths
/// consult this before calling [`split`].
pub fn remainder_is_splittable(chunk_size: usize, requested: usize) -> bool {
    chunk_size >= requested + header_size() + MIN_BLOCK
}

/// Splits `chunk` (which must be FREE and large enough, see
/// [`remainder_is_splittable`]) into a left chunk of `requested` payload
/// bytes and a new FREE right chunk holding the remainder. Returns the new
/// right chunk's header.
///
/// The caller owns the left chunk's flag transition (split itself never
/// changes `chunk`'s flags).
///
/// # Safety
///
/// `chunk` must point to a valid FREE chunk header satisfying
/// `remainder_is_splittable(chunk.size, requested)`, and must be linked into
/// a well-formed chunk list.
pub unsafe fn split(
    chunk: *mut ChunkHeader,
    requested: usize,
    last: &mut *mut ChunkHeader,
) -> *mut ChunkHeader {
    unsafe {
        // No flag precondition here: Alloc only ever splits a FREE chunk,
        // but Realloc's shrink path (§4.3) splits the live BUSY chunk being
        // shrunk, so `chunk.flags` may legitimately be either. Split's own
        // body never reads the left chunk's flags, only `size`/`next`.
        let rest = (*chunk).size - requested - header_size();
        let old_next = (*chunk).next;

        (*chunk).size = requested;
        let right_at = (chunk as *mut u8).add(header_size()).add(requested);
        let right = write_header(right_at, Flags::FREE, rest, chunk, old_next);

        (*chunk).next = right;
        if !old_next.is_null() {
            (*old_next).prev = right;
        } else {
            *last = right;
        }

        right
    }
}
