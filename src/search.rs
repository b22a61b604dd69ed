//! First-fit search (§4.4): the only lookup strategy this allocator knows.
//! No best-fit, no segregated free lists — just a walk in address order.

use crate::chunk::{ChunkHeader, Flags};
use std::ptr;

/// Walks the chunk list starting at `first`, returning the first chunk that
/// is FREE and whose payload `size` is at least `request`. Returns null if
/// no such chunk exists.
///
/// # Safety
///
/// `first` must either be null or point to the first header of a
/// well-formed chunk list (§3.3).
pub unsafe fn first_fit(first: *mut ChunkHeader, request: usize) -> *mut ChunkHeader {
    let mut current = first;
    while !current.is_null() {
        // SAFETY: current is non-null and, by the list invariant, valid.
        let chunk = unsafe { &*current };
        if chunk.flags == Flags::FREE && chunk.size >= request {
            return current;
        }
        current = chunk.next;
    }
    ptr::null_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::write_header;

    unsafe fn chain(sizes_and_flags: &[(usize, Flags)]) -> *mut ChunkHeader {
        let header_size = crate::chunk::header_size();
        let mut backing = vec![0u8; sizes_and_flags.len() * (header_size + 64)];
        let base = backing.as_mut_ptr();
        std::mem::forget(backing);

        let mut headers = Vec::new();
        let mut offset = 0usize;
        for (size, flags) in sizes_and_flags {
            let at = unsafe { base.add(offset) };
            let header =
                unsafe { write_header(at, *flags, *size, ptr::null_mut(), ptr::null_mut()) };
            headers.push(header);
            offset += header_size + size;
        }
        for i in 0..headers.len() {
            unsafe {
                (*headers[i]).prev = if i == 0 {
                    ptr::null_mut()
                } else {
                    headers[i - 1]
                };
                (*headers[i]).next = if i + 1 == headers.len() {
                    ptr::null_mut()
                } else {
                    headers[i + 1]
                };
            }
        }
        headers[0]
    }

    #[test]
    fn returns_first_large_enough_free_chunk() {
        unsafe {
            let first = chain(&[
                (64, Flags::BUSY),
                (128, Flags::FREE),
                (200, Flags::FREE),
                (50, Flags::FREE),
            ]);
            let found = first_fit(first, 100);
            assert_eq!((*found).size, 128);
        }
    }

    #[test]
    fn skips_busy_chunks_even_if_large() {
        unsafe {
            let first = chain(&[(500, Flags::BUSY), (100, Flags::FREE)]);
            let found = first_fit(first, 100);
            assert_eq!((*found).size, 100);
        }
    }

    #[test]
    fn returns_null_when_nothing_fits() {
        unsafe {
            let first = chain(&[(16, Flags::FREE), (32, Flags::FREE)]);
            assert!(first_fit(first, 1000).is_null());
        }
    }

    #[test]
    fn returns_null_on_empty_list() {
        assert!(unsafe { first_fit(ptr::null_mut(), 16) }.is_null());
    }
}
