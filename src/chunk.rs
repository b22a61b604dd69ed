//! Chunk layout: the in-band header and the address arithmetic around it.
//!
//! A chunk is a header immediately followed by `size` payload bytes. Given a
//! chunk's header address, the header/payload addresses of its neighbors can
//! always be derived without a separate lookup table — that's the whole
//! point of boundary tags.

use std::mem;
use std::ptr;

/// Smallest payload a chunk may hold. Requests at or below this are rounded
/// up to it.
pub const MIN_BLOCK: usize = 16;

/// Size of the very first chunk carved out at lazy-init time.
pub const INITIAL_BLOCK_SIZE: usize = 512;

/// Payload sizes are always a multiple of this many bytes.
pub const GRANULE: usize = 4;

/// A chunk's occupancy state, stored as a plain byte rather than a Rust
/// `enum`. `Free` validates pointers it was never given by this allocator
/// (§4.2), which means this field can legitimately hold garbage bit
/// patterns read from arbitrary memory — a typed enum with only two valid
/// discriminants would make that read undefined behavior. `Flags` stays a
/// transparent wrapper around `u8` precisely so "neither FREE nor BUSY" is
/// an ordinary runtime value, not UB.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Flags(u8);

impl Flags {
    pub const FREE: Flags = Flags(0b01);
    pub const BUSY: Flags = Flags(0b10);

    pub fn is_free(self) -> bool {
        self == Flags::FREE
    }

    pub fn is_busy(self) -> bool {
        self == Flags::BUSY
    }

    /// `false` for any bit pattern other than FREE or BUSY — the case §4.2
    /// and §7 call `InvalidPointer`.
    pub fn is_valid(self) -> bool {
        self.is_free() || self.is_busy()
    }
}

/// The boundary tag placed at the start of every chunk.
///
/// `#[repr(C)]` pins the field layout so `header_size()` is a stable,
/// predictable stride — the allocator writes these fields through raw
/// pointers computed from chunk addresses, so the layout must not be left to
/// the compiler's discretion.
#[repr(C)]
pub struct ChunkHeader {
    pub flags: Flags,
    pub size: usize,
    pub prev: *mut ChunkHeader,
    pub next: *mut ChunkHeader,
}

/// Size in bytes of a `ChunkHeader`, i.e. the offset from a chunk's header
/// address to its payload address.
pub fn header_size() -> usize {
    mem::size_of::<ChunkHeader>()
}

/// Rounds a requested payload size up per §4.1: anything at or below
/// `MIN_BLOCK` becomes `MIN_BLOCK`; anything larger rounds up to the next
/// multiple of `GRANULE`.
pub fn normalize_size(requested: usize) -> usize {
    if requested <= MIN_BLOCK {
        return MIN_BLOCK;
    }
    (requested + GRANULE - 1) & !(GRANULE - 1)
}

/// The payload address of the chunk whose header lives at `header`.
///
/// # Safety
///
/// `header` must be non-null.
pub unsafe fn payload_addr(header: *mut ChunkHeader) -> *mut u8 {
    unsafe { (header as *mut u8).add(header_size()) }
}

/// Recovers a chunk's header address from a payload address previously
/// handed out by `payload_addr`.
///
/// # Safety
///
/// `payload` must be non-null and at least `header_size()` bytes past some
/// valid allocation base.
pub unsafe fn header_from_payload(payload: *mut u8) -> *mut ChunkHeader {
    unsafe { payload.sub(header_size()) as *mut ChunkHeader }
}

/// The header address of the chunk that would immediately follow `header`,
/// given its current `size` — i.e. `header + header_size + size` (§3.1).
///
/// # Safety
///
/// `header` must point to a valid, initialized `ChunkHeader`.
pub unsafe fn next_addr(header: *mut ChunkHeader) -> *mut ChunkHeader {
    unsafe {
        (header as *mut u8)
            .add(header_size())
            .add((*header).size) as *mut ChunkHeader
    }
}

/// Writes a fresh chunk header at `at`, returning it as a pointer.
///
/// # Safety
///
/// `at` must designate `header_size() + size` bytes of writable memory that
/// the allocator owns exclusively.
pub unsafe fn write_header(
    at: *mut u8,
    flags: Flags,
    size: usize,
    prev: *mut ChunkHeader,
    next: *mut ChunkHeader,
) -> *mut ChunkHeader {
    unsafe {
        let header = at as *mut ChunkHeader;
        ptr::write(
            header,
            ChunkHeader {
                flags,
                size,
                prev,
                next,
            },
        );
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rounds_small_requests_up_to_min_block() {
        for k in 0..=MIN_BLOCK {
            assert_eq!(normalize_size(k), MIN_BLOCK);
        }
    }

    #[test]
    fn normalize_rounds_large_requests_to_granule() {
        assert_eq!(normalize_size(17), 20);
        assert_eq!(normalize_size(20), 20);
        assert_eq!(normalize_size(100), 100);
        assert_eq!(normalize_size(101), 104);
        assert_eq!(normalize_size(2000), 2000);
    }

    #[test]
    fn payload_and_header_addresses_round_trip() {
        let mut backing = vec![0u8; header_size() + 64];
        let base = backing.as_mut_ptr();
        let header =
            unsafe { write_header(base, Flags::FREE, 64, ptr::null_mut(), ptr::null_mut()) };
        let payload = unsafe { payload_addr(header) };
        assert_eq!(unsafe { header_from_payload(payload) }, header);
        assert_eq!(payload as usize - header as usize, header_size());
    }

    #[test]
    fn next_addr_accounts_for_header_and_payload() {
        let mut backing = vec![0u8; header_size() + 100];
        let base = backing.as_mut_ptr();
        let header =
            unsafe { write_header(base, Flags::FREE, 100, ptr::null_mut(), ptr::null_mut()) };
        let expected = unsafe { base.add(header_size() + 100) } as *mut ChunkHeader;
        assert_eq!(unsafe { next_addr(header) }, expected);
    }

    #[test]
    fn flags_validity_rejects_garbage_bit_patterns() {
        assert!(Flags::FREE.is_valid());
        assert!(Flags::BUSY.is_valid());
        assert!(!Flags(0).is_valid());
        assert!(!Flags(0b11).is_valid());
    }
}
