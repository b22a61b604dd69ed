//! The Allocator Facade (§4.1-§4.3): lazy initialization and the `Alloc`,
//! `Free`, `Realloc` dispatch logic that ties every other component
//! together.

use std::ptr;

use crate::break_source::BreakSource;
use crate::chunk::{
    header_from_payload, header_size, next_addr, normalize_size, payload_addr, write_header,
    ChunkHeader, Flags, INITIAL_BLOCK_SIZE,
};
use crate::coalesce::coalesce;
use crate::error::HeapError;
use crate::search::first_fit;
use crate::split::{remainder_is_splittable, split};

/// The heap-state record described in §3.2 and §9: `first`, `last`, `limit`
/// and `initialized`, plus whatever [`BreakSource`] supplies the program
/// break. Generic over `B` so tests can swap in
/// [`crate::mock_break::MockBreak`] without touching the real process
/// break; production code uses [`crate::break_source::SbrkBreak`].
pub struct Heap<B: BreakSource> {
    break_source: B,
    initialized: bool,
    first: *mut ChunkHeader,
    last: *mut ChunkHeader,
    limit: *mut u8,
}

// A `Heap` owns raw pointers into memory it alone manages (via its
// `BreakSource`), and the crate's non-goals explicitly exclude thread
// safety (§5) — so `Heap` is deliberately left `!Send`/`!Sync` rather than
// asserted otherwise.

impl<B: BreakSource> Heap<B> {
    /// Builds an uninitialized heap over the given break source. No break
    /// extension happens until the first `alloc`/`free`/`realloc` call.
    pub const fn new(break_source: B) -> Self {
        Self {
            break_source,
            initialized: false,
            first: ptr::null_mut(),
            last: ptr::null_mut(),
            limit: ptr::null_mut(),
        }
    }

    /// Lazily carves out the first chunk (§4.1 "Lazy init") the first time
    /// any operation needs one.
    fn ensure_initialized(&mut self) -> Result<(), HeapError> {
        if self.initialized {
            return Ok(());
        }
        let grant = header_size() + INITIAL_BLOCK_SIZE;
        // SAFETY: no chunks exist yet, so there is nothing else to corrupt
        // if this fails.
        let initial = unsafe { self.break_source.extend_break(grant as isize)? };
        // SAFETY: `initial..initial+grant` was just granted by the break
        // source and is otherwise unused.
        let chunk = unsafe {
            write_header(
                initial,
                Flags::FREE,
                INITIAL_BLOCK_SIZE,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        self.first = chunk;
        self.last = chunk;
        self.limit = self.break_source.current_break();
        self.initialized = true;
        Ok(())
    }

    fn try_alloc(&mut self, requested: usize) -> Result<*mut u8, HeapError> {
        if requested == 0 {
            return Err(HeapError::ZeroRequest);
        }
        let size = normalize_size(requested);
        self.ensure_initialized()?;

        // SAFETY: the chunk list is well-formed by the loop invariant
        // maintained across every public entry point.
        let found = unsafe { first_fit(self.first, size) };
        if !found.is_null() {
            unsafe {
                if remainder_is_splittable((*found).size, size) {
                    split(found, size, &mut self.last);
                }
                (*found).flags = Flags::BUSY;
                return Ok(payload_addr(found));
            }
        }

        // No free chunk large enough exists: grow the break (§4.1 dispatch,
        // second half).
        unsafe {
            if (*self.last).flags.is_free() {
                let shortfall = size - (*self.last).size;
                self.break_source.extend_break(shortfall as isize)?;
                (*self.last).size = size;
                (*self.last).flags = Flags::BUSY;
                self.limit = self.break_source.current_break();
                Ok(payload_addr(self.last))
            } else {
                let grant = header_size() + size;
                let at = self.break_source.extend_break(grant as isize)?;
                let chunk = write_header(at, Flags::BUSY, size, self.last, ptr::null_mut());
                (*self.last).next = chunk;
                self.last = chunk;
                self.limit = self.break_source.current_break();
                Ok(payload_addr(chunk))
            }
        }
    }

    /// Resolves a payload pointer to its header, validating it per §4.2:
    /// the header must fall within `[first, last]` and carry a valid flag.
    ///
    /// # Safety
    ///
    /// `payload` must either be null or a value that could plausibly have
    /// been returned by `alloc`/`realloc` on this heap (an offset header
    /// read is performed before any validation).
    unsafe fn resolve(&self, payload: *mut u8) -> Result<*mut ChunkHeader, HeapError> {
        if payload.is_null() || !self.initialized {
            return Err(HeapError::InvalidPointer);
        }
        // SAFETY: upheld by the caller; the result is only dereferenced
        // after the range check below.
        let header = unsafe { header_from_payload(payload) };
        if (header as usize) < (self.first as usize) || (header as usize) > (self.last as usize) {
            return Err(HeapError::InvalidPointer);
        }
        // SAFETY: header lies within [first, last], both valid chunks, and
        // every address in that range that *is* a chunk header starts with
        // a `Flags` byte; reading it does not require the byte to already
        // be a valid discriminant since `Flags` is a transparent `u8`.
        let flags = unsafe { (*header).flags };
        if !flags.is_valid() {
            return Err(HeapError::InvalidPointer);
        }
        Ok(header)
    }

    fn try_free(&mut self, payload: *mut u8) -> Result<(), HeapError> {
        if payload.is_null() {
            return Ok(());
        }
        // SAFETY: payload is non-null; resolve() performs the required
        // range/flag validation before this code treats it as a header.
        let header = unsafe { self.resolve(payload)? };
        unsafe {
            if (*header).flags.is_free() {
                return Err(HeapError::DoubleFree);
            }
            (*header).flags = Flags::FREE;
            coalesce(header, &mut self.last);
        }
        Ok(())
    }

    fn try_realloc(&mut self, payload: *mut u8, new_size: usize) -> Result<*mut u8, HeapError> {
        if new_size == 0 {
            let _ = self.try_free(payload);
            return Ok(ptr::null_mut());
        }
        if payload.is_null() {
            return self.try_alloc(new_size);
        }

        // SAFETY: payload is non-null; §4.3 does not require validating it
        // here (an invalid pointer is documented undefined behavior).
        let header = unsafe { header_from_payload(payload) };
        let m = normalize_size(new_size);
        let old = unsafe { (*header).size };
        let delta = m as isize - old as isize;

        if delta == 0 {
            return Ok(payload);
        }

        if delta < 0 && delta.unsigned_abs() >= header_size() + crate::chunk::MIN_BLOCK {
            unsafe {
                split(header, m, &mut self.last);
            }
            return Ok(payload);
        }

        // The successor must come from the stored `next` link, not from
        // `next_addr(header)`'s raw address arithmetic: when `header` is
        // genuinely `last`, that computed address is the program break
        // itself, with no `ChunkHeader` ever written there — dereferencing
        // it would read past the break. `next` is null in exactly that
        // case, which the `is_null()` check below handles.
        //
        // Gated on `delta > 0`: this is a growth strategy (§4.3's own
        // heading), and a shrink too small for the dedicated shrink path
        // above is specified to leave the chunk unchanged, not to nibble a
        // byte off the boundary with a free successor.
        let successor = unsafe { (*header).next };
        if delta > 0 && !successor.is_null() && unsafe { (*successor).flags.is_free() } {
            let successor_size = unsafe { (*successor).size } as isize;
            let rem = successor_size - delta;

            if rem > (header_size() + crate::chunk::MIN_BLOCK) as isize {
                unsafe {
                    let successor_next = (*successor).next;
                    let new_free_at = (header as *mut u8).add(header_size()).add(m);
                    let new_free = write_header(
                        new_free_at,
                        Flags::FREE,
                        rem as usize,
                        header,
                        successor_next,
                    );
                    if !successor_next.is_null() {
                        (*successor_next).prev = new_free;
                    } else {
                        self.last = new_free;
                    }
                    (*header).next = new_free;
                    (*header).size = m;
                }
                return Ok(payload);
            } else if successor == self.last {
                // The remainder is too small to stand as its own chunk, so
                // absorb the successor whole rather than leave orphaned
                // slack bytes unaccounted for by any chunk (which would
                // violate the break-alignment invariant, §3.3.5). Only
                // extend the break for whatever `m` still doesn't cover;
                // never shrink it.
                let absorbed = old as isize + header_size() as isize + successor_size;
                let final_size = if absorbed < m as isize {
                    self.break_source.extend_break(m as isize - absorbed)?;
                    m as isize
                } else {
                    absorbed
                };
                unsafe {
                    (*header).next = ptr::null_mut();
                    (*header).size = final_size as usize;
                    self.last = header;
                    self.limit = self.break_source.current_break();
                }
                return Ok(payload);
            }
            // Otherwise fall through to the remaining strategies.
        }

        if delta > 0 && header == self.last {
            unsafe {
                self.break_source.extend_break(delta)?;
                (*header).size = m;
                self.limit = self.break_source.current_break();
            }
            return Ok(payload);
        }

        // A shrink too small for the dedicated shrink path above, with no
        // free successor or break boundary to absorb it, leaves the chunk
        // unchanged (§4.3's note on the shrink predicate).
        if delta < 0 {
            return Ok(payload);
        }

        // Relocate: allocate fresh, copy, free the old region.
        let new_payload = self.try_alloc(new_size)?;
        unsafe {
            ptr::copy_nonoverlapping(payload, new_payload, old);
        }
        let _ = self.try_free(payload);
        Ok(new_payload)
    }

    /// `Alloc(n)` (§4.1). Returns null on failure, matching the classical
    /// C allocator contract rather than a `Result`.
    ///
    /// # Safety
    ///
    /// Must not be called concurrently with any other operation on this
    /// heap (§5 — no thread safety).
    pub unsafe fn alloc(&mut self, requested: usize) -> *mut u8 {
        self.try_alloc(requested).unwrap_or(ptr::null_mut())
    }

    /// `Free(p)` (§4.2). A silent no-op for null, already-free, or
    /// out-of-range pointers.
    ///
    /// # Safety
    ///
    /// `p` must be null or a value previously returned by `alloc`/`realloc`
    /// on this same heap. Must not run concurrently with other operations.
    pub unsafe fn free(&mut self, payload: *mut u8) {
        let _ = self.try_free(payload);
    }

    /// `Realloc(p, m)` (§4.3).
    ///
    /// # Safety
    ///
    /// Same obligations as `free`/`alloc` combined: `p` must be null or a
    /// live pointer from this heap, and no concurrent use is permitted.
    pub unsafe fn realloc(&mut self, payload: *mut u8, new_size: usize) -> *mut u8 {
        self.try_realloc(payload, new_size).unwrap_or(ptr::null_mut())
    }

    /// The lowest-address chunk header, or null if nothing has been
    /// allocated yet. Exposed for the dump observer and for tests asserting
    /// invariants.
    pub fn first_chunk(&self) -> *mut ChunkHeader {
        self.first
    }
}
