//! Lock-free SPSC ring buffer with compile-time capacity.
//!
//! [`SpscRing<T, N>`] is a bounded single-producer single-consumer queue whose
//! storage is embedded directly in the struct (no heap allocation, usable in
//! `static` position). Capacity is fixed at `N - 1`: one slot stays reserved
//! so a full ring and an empty ring are distinguishable by cursor comparison
//! alone.
//!
//! # Usage
//!
//! ```ignore
//! use ringspsc::SpscRing;
//!
//! let mut ring: SpscRing<u32, 1024> = SpscRing::new();
//! let (mut tx, mut rx) = ring.split();
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         for v in 0..100u32 {
//!             while !tx.push(v) {}
//!         }
//!     });
//!     s.spawn(move || {
//!         let mut got = 0;
//!         while got < 100 {
//!             if rx.pop().is_some() {
//!                 got += 1;
//!             }
//!         }
//!     });
//! });
//! ```
//!
//! For a `static` ring shared with an interrupt handler, use
//! [`SpscRing::split_unchecked`] and keep one handle on each side:
//!
//! ```ignore
//! static EVENTS: SpscRing<u8, 64> = SpscRing::new();
//!
//! // at init, before any concurrent access:
//! let (tx, rx) = unsafe { EVENTS.split_unchecked() };
//! ```

use crate::invariants::{
    debug_assert_chunk_geometry, debug_assert_cursor_range, debug_assert_occupancy,
    debug_assert_readable,
};

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic two-cursor SPSC protocol over a power-of-two slot array.
//
// ## Cursors
//
// `head` is the next slot the producer writes; `tail` is the next slot the
// consumer reads. Both are stored modulo `N` (masked before every store), so
// cursor values index the array directly. Occupancy is `(head - tail) mod N`,
// and one slot is always left unused:
//   - empty  <=>  head == tail
//   - full   <=>  (head + 1) mod N == tail
//
// Modulo cursors cannot be confused across laps because the consumer never
// passes the producer: each cursor chases the other inside a window smaller
// than `N`.
//
// ## Ordering protocol
//
// **Producer (push path):**
// 1. Read own `head` (plain field on the handle, single writer)
// 2. Check the cached copy of `tail`; refresh with an Acquire load only when
//    the cache says full (staleness over-reports occupancy, never under)
// 3. Plain write of the item into slot `head`
// 4. Release-store `head` (publishes the slot write to the consumer)
//
// **Consumer (pop path):**
// 1. Read own `tail` (plain field on the handle, single writer)
// 2. Check the cached copy of `head`; refresh with an Acquire load only when
//    the cache says empty (staleness under-reports availability, never over)
// 3. Plain read of the item from slot `tail`
// 4. Release-store `tail` (returns the slot to the producer)
//
// Chunked operations skip the cache and always Acquire-load the opposite
// cursor; the copy loop amortizes the cost, and the fresh view maximizes how
// much a single call can transfer.
//
// ## Single-writer invariants
//
// - `head` atomic: written only by the producer handle
// - `tail` atomic: written only by the consumer handle
// - `buffer[i]`: written by the producer while `i` is outside `[tail, head)`,
//   read by the consumer while `i` is inside it; the Release/Acquire pair on
//   the owning cursor orders the two
//
// =============================================================================

/// A lock-free single-producer single-consumer ring buffer with inline
/// storage and compile-time capacity.
///
/// `N` must be a nonzero power of two (checked at compile time); usable
/// capacity is `N - 1`. `T: Copy` keeps slot reads and writes plain memory
/// copies with no drop obligations.
///
/// # Memory layout
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │ head: CachePadded<AtomicUsize>   producer writes, consumer   │
/// │                                  reads                       │
/// ├──────────────────────────────────────────────────────────────┤
/// │ tail: CachePadded<AtomicUsize>   consumer writes, producer   │
/// │                                  reads                       │
/// ├──────────────────────────────────────────────────────────────┤
/// │ buffer: [UnsafeCell<MaybeUninit<T>>; N]                      │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// The two cursors live on separate cache lines so producer stores do not
/// invalidate the consumer's line and vice versa.
#[repr(C)]
pub struct SpscRing<T, const N: usize> {
    /// Next slot to write (written by producer, read by consumer).
    head: CachePadded<AtomicUsize>,
    /// Next slot to read (written by consumer, read by producer).
    tail: CachePadded<AtomicUsize>,
    /// Slot array. `UnsafeCell<MaybeUninit<T>>` so slots can be written
    /// through a shared reference without requiring `T: Default`.
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
}

// Safety: the ring may be shared between exactly one producer and one
// consumer thread. Each atomic cursor has a single writer, and slot accesses
// are ordered by the Release/Acquire pairing on the owning cursor. `T: Send`
// is required because items cross threads by value.
unsafe impl<T: Send, const N: usize> Send for SpscRing<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for SpscRing<T, N> {}

impl<T: Copy, const N: usize> SpscRing<T, N> {
    /// Index mask: `N - 1` (valid because `N` is a power of two).
    const MASK: usize = N - 1;

    /// Creates an empty ring.
    ///
    /// Const, so rings can live in `static` position.
    ///
    /// Fails to compile if `N` is zero or not a power of two.
    pub const fn new() -> Self {
        const {
            assert!(
                N != 0 && N.is_power_of_two(),
                "SpscRing capacity must be a nonzero power of two"
            );
        }

        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            buffer: [const { UnsafeCell::new(MaybeUninit::uninit()) }; N],
        }
    }

    // -------------------------------------------------------------------------
    // HANDLES
    // -------------------------------------------------------------------------

    /// Splits the ring into a producer and a consumer handle.
    ///
    /// The exclusive borrow guarantees no other handles exist while these two
    /// are alive. Splitting again after the handles are dropped resumes from
    /// the current cursor positions; unconsumed items stay in place.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        // SAFETY: `&mut self` proves exclusivity; the pair partitions the
        // producer and consumer roles between the two handles.
        unsafe { self.split_unchecked() }
    }

    /// Splits a shared ring into a producer and a consumer handle.
    ///
    /// For rings in `static` position (main loop on one side, interrupt
    /// handler on the other) where an exclusive borrow is not available.
    ///
    /// # Safety
    ///
    /// At most one `Producer` and one `Consumer` obtained from this ring may
    /// be alive at a time, and the call must not race with ring operations
    /// through previously obtained handles.
    pub unsafe fn split_unchecked(&self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        (
            Producer {
                ring: self,
                head,
                cached_tail: tail,
            },
            Consumer {
                ring: self,
                tail,
                cached_head: head,
            },
        )
    }

    // -------------------------------------------------------------------------
    // ADVISORY STATUS
    // -------------------------------------------------------------------------
    //
    // Snapshots from relaxed loads of both cursors. Each may be stale by the
    // time the caller looks at it; the push/pop paths never gate on these,
    // only on the owning handle's own cursor plus an acquire view of the
    // opposite one.

    /// Usable capacity: `N - 1` (one slot stays reserved).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of items currently buffered. Advisory snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail) & Self::MASK
    }

    /// Whether the ring holds no items. Advisory snapshot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Relaxed) == self.tail.load(Ordering::Relaxed)
    }

    /// Whether the ring is at capacity. Advisory snapshot.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Free slots remaining. Advisory snapshot.
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    // -------------------------------------------------------------------------
    // INTERNAL
    // -------------------------------------------------------------------------

    /// Raw pointer to slot `idx`. The pointer itself is safe to form; reading
    /// or writing through it is governed by the cursor protocol.
    #[inline]
    fn slot(&self, idx: usize) -> *mut T {
        debug_assert_cursor_range!("slot index", idx, N);
        self.buffer[idx].get().cast::<T>()
    }
}

impl<T: Copy, const N: usize> Default for SpscRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// No Drop impl: `T: Copy` types have no drop glue, so abandoned items need no
// cleanup.

// =============================================================================
// PRODUCER HANDLE
// =============================================================================

/// Write side of a split ring. One per ring; mutating calls take `&mut self`.
pub struct Producer<'a, T, const N: usize> {
    ring: &'a SpscRing<T, N>,
    /// Own cursor: next slot to write. Mirrors `ring.head`, which this handle
    /// alone stores to.
    head: usize,
    /// Last observed value of the consumer's cursor. Only ever a past value,
    /// so it over-reports occupancy at worst.
    cached_tail: usize,
}

impl<T: Copy, const N: usize> Producer<'_, T, N> {
    const MASK: usize = N - 1;

    /// Appends one item. Returns `false` without side effects when the ring
    /// is full.
    #[inline]
    pub fn push(&mut self, item: T) -> bool {
        let next = (self.head + 1) & Self::MASK;

        // Full per the cached view: refresh once, then decide.
        if next == self.cached_tail {
            self.cached_tail = self.ring.tail.load(Ordering::Acquire);
            if next == self.cached_tail {
                return false;
            }
        }

        // SAFETY: slot `head` is outside the occupied window `[tail, head)`:
        // the check above proved `next != tail`, so the consumer is not and
        // will not be reading this slot until the release-store below
        // publishes it.
        unsafe {
            self.ring.slot(self.head).write(item);
        }

        debug_assert_cursor_range!("head", next, N);
        self.ring.head.store(next, Ordering::Release);
        self.head = next;
        true
    }

    /// Appends all of `items` or nothing.
    ///
    /// Returns `false` when `items` is empty or free space is insufficient;
    /// the ring is untouched in both cases. The copy runs in at most two
    /// segments (up to the physical end of the array, then from slot 0) and
    /// becomes visible to the consumer with a single cursor publish.
    pub fn push_chunk(&mut self, items: &[T]) -> bool {
        let n = items.len();
        if n == 0 {
            return false;
        }

        let head = self.head;
        let tail = self.ring.tail.load(Ordering::Acquire);
        self.cached_tail = tail;

        let occupied = head.wrapping_sub(tail) & Self::MASK;
        debug_assert_occupancy!(occupied, N - 1);
        if (N - 1) - occupied < n {
            return false;
        }

        let first = n.min(N - head);
        let second = n - first;
        debug_assert_chunk_geometry!(first, second, n);

        // SAFETY: the free-space check proved slots `[head, head + n)` (mod N)
        // are outside the occupied window, so the consumer does not touch them
        // until the release-store below. Source and destination never overlap:
        // `items` is a borrowed slice outside the ring.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), self.ring.slot(head), first);
            if second > 0 {
                ptr::copy_nonoverlapping(items.as_ptr().add(first), self.ring.slot(0), second);
            }
        }

        let next = (head + n) & Self::MASK;
        self.ring.head.store(next, Ordering::Release);
        self.head = next;
        true
    }

    /// Free slots remaining, from this handle's view of the consumer cursor.
    /// Advisory: the true value can only be larger.
    #[inline]
    pub fn free(&self) -> usize {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        (N - 1) - (self.head.wrapping_sub(tail) & Self::MASK)
    }

    /// Whether a `push` would currently fail. Advisory.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Usable capacity of the underlying ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }
}

// =============================================================================
// CONSUMER HANDLE
// =============================================================================

/// Read side of a split ring. One per ring; mutating calls take `&mut self`.
pub struct Consumer<'a, T, const N: usize> {
    ring: &'a SpscRing<T, N>,
    /// Own cursor: next slot to read. Mirrors `ring.tail`, which this handle
    /// alone stores to.
    tail: usize,
    /// Last observed value of the producer's cursor. Only ever a past value,
    /// so it under-reports availability at worst.
    cached_head: usize,
}

impl<T: Copy, const N: usize> Consumer<'_, T, N> {
    const MASK: usize = N - 1;

    /// Removes and returns the oldest item, or `None` when the ring is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.tail;

        // Empty per the cached view: refresh once, then decide.
        if tail == self.cached_head {
            self.cached_head = self.ring.head.load(Ordering::Acquire);
            if tail == self.cached_head {
                return None;
            }
        }

        // SAFETY: `head != tail`, so slot `tail` is inside the occupied
        // window; the acquire load that observed `head` synchronizes with the
        // producer's release-store, making the slot write visible.
        let item = unsafe { self.ring.slot(tail).read() };

        let next = (tail + 1) & Self::MASK;
        debug_assert_cursor_range!("tail", next, N);
        self.ring.tail.store(next, Ordering::Release);
        self.tail = next;
        Some(item)
    }

    /// Copies out up to `dst.len()` items and returns how many were moved.
    ///
    /// Best-effort: an empty ring or empty `dst` yields 0; otherwise the
    /// count is clamped to what is available. The copy runs in at most two
    /// segments, and the consumer cursor is published exactly once, on every
    /// path.
    pub fn pop_chunk(&mut self, dst: &mut [T]) -> usize {
        if dst.is_empty() {
            return 0;
        }

        let tail = self.tail;
        let head = self.ring.head.load(Ordering::Acquire);
        self.cached_head = head;

        let available = head.wrapping_sub(tail) & Self::MASK;
        let n = dst.len().min(available);
        if n == 0 {
            return 0;
        }
        debug_assert_readable!(n, available);

        let first = n.min(N - tail);
        let second = n - first;
        debug_assert_chunk_geometry!(first, second, n);

        // SAFETY: slots `[tail, tail + n)` (mod N) are inside the occupied
        // window published by the acquire load of `head` above. Destination
        // is a borrowed slice outside the ring, so the regions are disjoint.
        unsafe {
            ptr::copy_nonoverlapping(self.ring.slot(tail), dst.as_mut_ptr(), first);
            if second > 0 {
                ptr::copy_nonoverlapping(self.ring.slot(0), dst.as_mut_ptr().add(first), second);
            }
        }

        // Own cursor, advanced past everything read, straight or wrapped.
        let next = (tail + n) & Self::MASK;
        self.ring.tail.store(next, Ordering::Release);
        self.tail = next;
        n
    }

    /// Items available to read, from this handle's view of the producer
    /// cursor. Advisory: the true value can only be larger.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        head.wrapping_sub(self.tail) & Self::MASK
    }

    /// Whether a `pop` would currently return `None`. Advisory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity of the underlying ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }
}

// =============================================================================
// TESTS
// =============================================================================
