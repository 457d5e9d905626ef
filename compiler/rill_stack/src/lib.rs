//! Stack growth guard for recursive walks over runtime values and for
//! nested calls.
//!
//! Deep clone, structural equality, ordering and the textual renderers all
//! recurse through nested vectors, tables and records. Implementation and
//! closure calls recurse through the code runner. A user program can nest
//! either arbitrarily deep, so every such walk goes through
//! [`ensure_sufficient_stack`] instead of trusting the thread's stack size.
//!
//! - **Native targets**: grows the stack with `stacker` when the remaining
//!   space drops under [`RED_ZONE`].
//! - **WASM targets**: plain call.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
