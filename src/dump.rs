//! Dump Observer (§4.7): a read-only walk over the chunk list for
//! diagnostics. Never mutates state, never allocates.

use crate::chunk::ChunkHeader;

/// Prints one line per chunk, in address order, showing its state and
/// payload size — e.g. `BUSY   104 bytes` or `FREE   512 bytes`. Mirrors the
/// teacher's `print_alloc` in spirit: a plain stdout dump, not a structured
/// log, since this is meant to be read directly at a REPL or test harness,
/// not machine-parsed.
///
/// # Safety
///
/// `first` must be null or point to the first header of a well-formed chunk
/// list (§3.3).
pub unsafe fn dump(first: *mut ChunkHeader) {
    if first.is_null() {
        println!("(heap not yet initialized)");
        return;
    }

    let mut current = first;
    let mut index = 0;
    while !current.is_null() {
        // SAFETY: current is non-null and, by the list invariant, valid.
        let chunk = unsafe { &*current };
        let state = if chunk.flags.is_free() {
            "FREE"
        } else if chunk.flags.is_busy() {
            "BUSY"
        } else {
            "????"
        };
        println!("[{index:>3}] {state}  {:>8} bytes  @ {current:p}", chunk.size);
        index += 1;
        current = chunk.next;
    }
}
