//! The program-break primitive, abstracted behind a trait.
//!
//! Everything above this module talks in terms of [`BreakSource`] rather than
//! `sbrk` directly, so the heap-state machinery in [`crate::heap`] can be
//! driven by an in-memory arena during tests instead of the real process
//! break.

use std::fmt;

use libc::{c_void, intptr_t, sbrk};

/// A failure to extend or read the break. The allocator never inspects the
/// reason beyond "the OS refused" — out-of-memory is the only case the
/// contract in §7 of the spec distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakError;

impl fmt::Display for BreakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to extend the program break")
    }
}

impl std::error::Error for BreakError {}

/// A source of program-break memory.
///
/// Mirrors the two operations in §6.2: reading the current break, and
/// advancing it by a signed delta. `extend_break` returns the break address
/// as it stood *before* the extension, which is where the allocator writes
/// new chunk headers.
pub trait BreakSource {
    /// Returns the current program break without moving it.
    fn current_break(&self) -> *mut u8;

    /// Advances the break by `delta` bytes (may be negative). Returns the
    /// break address from before the move on success.
    ///
    /// # Safety
    ///
    /// The caller must not use the returned address after a later call
    /// shrinks the break below it.
    unsafe fn extend_break(&mut self, delta: isize) -> Result<*mut u8, BreakError>;
}

/// The production [`BreakSource`]: the real process break via `sbrk(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SbrkBreak;

impl BreakSource for SbrkBreak {
    fn current_break(&self) -> *mut u8 {
        // SAFETY: sbrk(0) only reads the break, never moves it.
        unsafe { sbrk(0) as *mut u8 }
    }

    unsafe fn extend_break(&mut self, delta: isize) -> Result<*mut u8, BreakError> {
        // SAFETY: upheld by the caller; sbrk is the documented OS primitive
        // for moving the process break, and this is the only place in the
        // crate that calls it.
        let previous = unsafe { sbrk(delta as intptr_t) };
        if previous == usize::MAX as *mut c_void {
            return Err(BreakError);
        }
        Ok(previous as *mut u8)
    }
}
