//! Debug assertion macros for ring and container invariants.
//!
//! Active only in debug builds (`debug_assert!`), zero overhead in release.
//! Shared by `SpscRing<T, N>`, `HeapRing<T>` and the sequential containers.

// =============================================================================
// Cursor range
// =============================================================================

/// Assert that a stored cursor stays inside the slot array.
///
/// **Invariant**: every cursor value is in `[0, N)`; wrapping is done with a
/// mask before the store, never after.
macro_rules! debug_assert_cursor_range {
    ($name:literal, $cursor:expr, $slots:expr) => {
        debug_assert!(
            $cursor < $slots,
            "cursor invariant violated: {} = {} outside [0, {})",
            $name,
            $cursor,
            $slots
        )
    };
}

// =============================================================================
// Bounded occupancy
// =============================================================================

/// Assert that occupancy never exceeds usable capacity.
///
/// **Invariant**: `(head - tail) mod N <= N - 1`; one slot stays reserved so
/// full and empty are distinguishable.
macro_rules! debug_assert_occupancy {
    ($occupied:expr, $usable:expr) => {
        debug_assert!(
            $occupied <= $usable,
            "occupancy invariant violated: {} items in a ring with usable capacity {}",
            $occupied,
            $usable
        )
    };
}

// =============================================================================
// Split-copy geometry
// =============================================================================

/// Assert that a two-segment copy covers exactly the requested count.
///
/// **Invariant**: `first + second == n` with `first <= slots_to_physical_end`;
/// the wrapped segment starts at slot 0.
macro_rules! debug_assert_chunk_geometry {
    ($first:expr, $second:expr, $n:expr) => {
        debug_assert!(
            $first + $second == $n && ($n == 0 || $first > 0),
            "split-copy geometry violated: first {} + second {} != n {}",
            $first,
            $second,
            $n
        )
    };
}

// =============================================================================
// Initialized reads
// =============================================================================

/// Assert that a read stays inside the occupied (initialized) window.
///
/// **Invariant**: the consumer reads at most `(head - tail) mod N` items; a
/// slot is initialized iff it lies in `[tail, head)` in ring order.
macro_rules! debug_assert_readable {
    ($count:expr, $available:expr) => {
        debug_assert!(
            $count <= $available,
            "initialized-read invariant violated: reading {} of {} available items",
            $count,
            $available
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_chunk_geometry;
pub(crate) use debug_assert_cursor_range;
pub(crate) use debug_assert_occupancy;
pub(crate) use debug_assert_readable;
