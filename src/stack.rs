//! Stack growth for the recursive parts of the front end and evaluator.
//!
//! Deeply nested expressions or blocks recurse once per level. Before each
//! level we make sure a red zone is left, growing the stack on the heap when
//! it is not. Runaway *function* recursion is bounded separately by the
//! evaluator's call-depth limit.

/// If less than this remains, grow.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
