use std::io::Read;

use brkalloc::{alloc, dump, free, realloc};
use libc::sbrk;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  unsafe {
    // Initial heap state
    print_program_break("start");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Allocate space for a u32.
    // --------------------------------------------------------------------
    let first_block = alloc(4) as *mut u32;
    println!("\n[1] Allocate u32");
    dump();

    first_block.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_block.read());

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Allocate 12 bytes (u8[12]).
    //    This shows how the allocator handles "odd-sized" allocations.
    // --------------------------------------------------------------------
    let second_block = alloc(12);
    println!("\n[2] Allocate [u8; 12]");
    dump();

    std::ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Allocate a u64.
    // --------------------------------------------------------------------
    let third_block = alloc(8) as *mut u64;
    println!("\n[3] Allocate u64");
    dump();

    third_block.write(0x1122334455667788);
    println!("[3] Value written = 0x{:X}", third_block.read());

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Allocate an array of u16 to force more pointer movement.
    // --------------------------------------------------------------------
    let fourth_block = alloc(32) as *mut u16;
    println!("\n[4] Allocate [u16; 16]");
    dump();

    for i in 0..16 {
      fourth_block.add(i).write(i as u16);
    }
    println!("[4] Wrote 0..15 into the u16 array");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Free the first block.
    //
    //    Unlike a pure bump allocator, this chunk becomes FREE and is
    //    eligible for first-fit reuse by a later allocation.
    // --------------------------------------------------------------------
    free(first_block as *mut u8);
    println!("\n[5] Freed first_block at {:?}", first_block);
    dump();
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 6) Allocate a small block (2 bytes) to see if the allocator
    //    reuses the freed block.
    // --------------------------------------------------------------------
    let fifth_block = alloc(2);
    println!("\n[6] Allocate [u8; 2] (check reuse of freed block)");
    dump();

    println!(
      "[6] fifth_block == first_block? {}",
      if fifth_block as *mut u32 == first_block {
        "Yes, it reused the freed block"
      } else {
        "No, it allocated somewhere else"
      }
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 7) Allocate a large block to observe heap growth.
    //    This usually changes the result of `sbrk(0)`.
    // --------------------------------------------------------------------
    print_program_break("before large alloc");

    // Example: 64 KiB
    let big_block = alloc(64 * 1024);
    println!("\n[7] Allocate large 64 KiB block");
    dump();

    print_program_break("after large alloc");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 8) Grow the u64 block in place via realloc, then free everything
    //    still outstanding.
    // --------------------------------------------------------------------
    let grown = realloc(third_block as *mut u8, 128) as *mut u64;
    println!("\n[8] Reallocated third_block to 128 bytes, value preserved = 0x{:X}", grown.read());
    dump();

    free(second_block);
    free(grown as *mut u8);
    free(fourth_block as *mut u8);
    free(fifth_block);
    free(big_block);

    println!("\n[9] End of example. All outstanding blocks freed.");
    dump();
  }
}
