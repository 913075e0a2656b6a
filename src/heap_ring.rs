//! Heap-backed SPSC ring buffer with construction-time capacity.
//!
//! [`HeapRing<T>`] runs the same two-cursor protocol as [`SpscRing<T, N>`]
//! (see the ordering notes there), but the slot array lives in one boxed
//! slice and the capacity arrives at run time, validated into a
//! [`CapacityError`] instead of a compile-time assert. Each operation maps
//! one-for-one onto the protocol steps; this variant carries no cursor
//! caching.
//!
//! Storage can be allocated here ([`HeapRing::with_capacity`]) or supplied by
//! the caller ([`HeapRing::from_storage`]), e.g. from a pool or an arena that
//! outlives the ring.
//!
//! [`SpscRing<T, N>`]: crate::SpscRing

use crate::invariants::{
    debug_assert_chunk_geometry, debug_assert_cursor_range, debug_assert_occupancy,
    debug_assert_readable,
};

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Rejected ring capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// A ring needs at least one slot.
    #[error("ring capacity must be nonzero")]
    Zero,
    /// Mask addressing requires a power-of-two slot count.
    #[error("ring capacity {0} is not a power of two")]
    NotPowerOfTwo(usize),
}

/// A lock-free single-producer single-consumer ring buffer with heap storage
/// and construction-time capacity.
///
/// Usable capacity is `slots - 1`: one slot stays reserved so full and empty
/// are distinguishable by cursor comparison.
pub struct HeapRing<T> {
    /// Next slot to write (written by producer, read by consumer).
    head: CachePadded<AtomicUsize>,
    /// Next slot to read (written by consumer, read by producer).
    tail: CachePadded<AtomicUsize>,
    /// Slot-count minus one; slot count is a power of two.
    mask: usize,
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// Safety: same sharing contract as SpscRing. One writer per cursor; slot
// accesses ordered by the Release/Acquire pair on the owning cursor.
unsafe impl<T: Send> Send for HeapRing<T> {}
unsafe impl<T: Send> Sync for HeapRing<T> {}

impl<T: Copy> HeapRing<T> {
    /// Allocates a ring with `slots` slots (usable capacity `slots - 1`).
    ///
    /// # Errors
    ///
    /// [`CapacityError::Zero`] for `slots == 0`,
    /// [`CapacityError::NotPowerOfTwo`] otherwise when `slots` is not a power
    /// of two.
    pub fn with_capacity(slots: usize) -> Result<Self, CapacityError> {
        Self::validate(slots)?;
        let buffer: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..slots)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Ok(Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            mask: slots - 1,
            buffer,
        })
    }

    /// Builds a ring on caller-supplied backing storage.
    ///
    /// The storage length is the slot count and must satisfy the same rules
    /// as [`with_capacity`](Self::with_capacity). Existing contents are
    /// treated as uninitialized.
    ///
    /// # Errors
    ///
    /// Same as [`with_capacity`](Self::with_capacity).
    pub fn from_storage(storage: Box<[MaybeUninit<T>]>) -> Result<Self, CapacityError> {
        let slots = storage.len();
        Self::validate(slots)?;
        // SAFETY: `UnsafeCell<U>` has the same in-memory representation as
        // `U`, so a boxed slice of `MaybeUninit<T>` can be reinterpreted as a
        // boxed slice of `UnsafeCell<MaybeUninit<T>>` of the same length.
        let buffer = unsafe {
            Box::from_raw(Box::into_raw(storage) as *mut [UnsafeCell<MaybeUninit<T>>])
        };
        Ok(Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            mask: slots - 1,
            buffer,
        })
    }

    fn validate(slots: usize) -> Result<(), CapacityError> {
        if slots == 0 {
            return Err(CapacityError::Zero);
        }
        if !slots.is_power_of_two() {
            return Err(CapacityError::NotPowerOfTwo(slots));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // HANDLES
    // -------------------------------------------------------------------------

    /// Splits the ring into a producer and a consumer handle.
    pub fn split(&mut self) -> (HeapProducer<'_, T>, HeapConsumer<'_, T>) {
        // SAFETY: `&mut self` proves exclusivity; the pair partitions the
        // producer and consumer roles between the two handles.
        unsafe { self.split_unchecked() }
    }

    /// Splits a shared ring into a producer and a consumer handle.
    ///
    /// # Safety
    ///
    /// At most one `HeapProducer` and one `HeapConsumer` obtained from this
    /// ring may be alive at a time, and the call must not race with ring
    /// operations through previously obtained handles.
    pub unsafe fn split_unchecked(&self) -> (HeapProducer<'_, T>, HeapConsumer<'_, T>) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        (
            HeapProducer { ring: self, head },
            HeapConsumer { ring: self, tail },
        )
    }

    // -------------------------------------------------------------------------
    // ADVISORY STATUS
    // -------------------------------------------------------------------------

    /// Usable capacity: one less than the slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask
    }

    /// Number of items currently buffered. Advisory snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail) & self.mask
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

    /// Slot count (power of two).
    #[inline]
    fn slots(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    fn slot(&self, idx: usize) -> *mut T {
        debug_assert_cursor_range!("slot index", idx, self.slots());
        self.buffer[idx].get().cast::<T>()
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Write side of a split [`HeapRing`].
pub struct HeapProducer<'a, T> {
    ring: &'a HeapRing<T>,
    /// Own cursor: next slot to write.
    head: usize,
}

impl<T: Copy> HeapProducer<'_, T> {
    /// Appends one item. Returns `false` without side effects when the ring
    /// is full.
    #[inline]
    pub fn push(&mut self, item: T) -> bool {
        let head = self.head;
        let next = (head + 1) & self.ring.mask;
        let tail = self.ring.tail.load(Ordering::Acquire);
        if next == tail {
            return false;
        }

        // SAFETY: `next != tail` proved slot `head` is outside the occupied
        // window; the consumer cannot read it before the release-store below.
        unsafe {
            self.ring.slot(head).write(item);
        }

        self.ring.head.store(next, Ordering::Release);
        self.head = next;
        true
    }

    /// Appends all of `items` or nothing; `false` on empty input or
    /// insufficient free space, with the ring untouched.
    pub fn push_chunk(&mut self, items: &[T]) -> bool {
        let n = items.len();
        if n == 0 {
            return false;
        }

        let head = self.head;
        let mask = self.ring.mask;
        let tail = self.ring.tail.load(Ordering::Acquire);
        let occupied = head.wrapping_sub(tail) & mask;
        debug_assert_occupancy!(occupied, mask);
        if mask - occupied < n {
            return false;
        }

        let first = n.min(self.ring.slots() - head);
        let second = n - first;
        debug_assert_chunk_geometry!(first, second, n);

        // SAFETY: the free-space check proved the target slots are outside
        // the occupied window; `items` is disjoint from the ring storage.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), self.ring.slot(head), first);
            if second > 0 {
                ptr::copy_nonoverlapping(items.as_ptr().add(first), self.ring.slot(0), second);
            }
        }

        let next = (head + n) & mask;
        self.ring.head.store(next, Ordering::Release);
        self.head = next;
        true
    }

    /// Free slots remaining. Advisory.
    #[inline]
    pub fn free(&self) -> usize {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        self.ring.mask - (self.head.wrapping_sub(tail) & self.ring.mask)
    }

    /// Whether a `push` would currently fail. Advisory.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Usable capacity of the underlying ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// Read side of a split [`HeapRing`].
pub struct HeapConsumer<'a, T> {
    ring: &'a HeapRing<T>,
    /// Own cursor: next slot to read.
    tail: usize,
}

impl<T: Copy> HeapConsumer<'_, T> {
    /// Removes and returns the oldest item, or `None` when the ring is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.tail;
        let head = self.ring.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: `head != tail` puts slot `tail` inside the occupied window;
        // the acquire load synchronizes with the producer's release-store.
        let item = unsafe { self.ring.slot(tail).read() };

        let next = (tail + 1) & self.ring.mask;
        self.ring.tail.store(next, Ordering::Release);
        self.tail = next;
        Some(item)
    }

    /// Copies out up to `dst.len()` items; returns how many were moved.
    /// Best-effort, clamped to what is available.
    pub fn pop_chunk(&mut self, dst: &mut [T]) -> usize {
        if dst.is_empty() {
            return 0;
        }

        let tail = self.tail;
        let mask = self.ring.mask;
        let head = self.ring.head.load(Ordering::Acquire);
        let available = head.wrapping_sub(tail) & mask;
        let n = dst.len().min(available);
        if n == 0 {
            return 0;
        }
        debug_assert_readable!(n, available);

        let first = n.min(self.ring.slots() - tail);
        let second = n - first;
        debug_assert_chunk_geometry!(first, second, n);

        // SAFETY: slots `[tail, tail + n)` (mod slot count) are inside the
        // occupied window published by the acquire load above; `dst` is
        // disjoint from the ring storage.
        unsafe {
            ptr::copy_nonoverlapping(self.ring.slot(tail), dst.as_mut_ptr(), first);
            if second > 0 {
                ptr::copy_nonoverlapping(self.ring.slot(0), dst.as_mut_ptr().add(first), second);
            }
        }

        // Own cursor, advanced past everything read, straight or wrapped.
        let next = (tail + n) & mask;
        self.ring.tail.store(next, Ordering::Release);
        self.tail = next;
        n
    }

    /// Items available to read. Advisory.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        head.wrapping_sub(self.tail) & self.ring.mask
    }

    /// Whether a `pop` would currently return `None`. Advisory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity of the underlying ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity_validates() {
        assert_eq!(
            HeapRing::<u32>::with_capacity(0).err(),
            Some(CapacityError::Zero)
        );
        assert_eq!(
            HeapRing::<u32>::with_capacity(12).err(),
            Some(CapacityError::NotPowerOfTwo(12))
        );
        let ring = HeapRing::<u32>::with_capacity(16).unwrap();
        assert_eq!(ring.capacity(), 15);
    }

    #[test]
    fn test_capacity_error_messages() {
        assert_eq!(
            CapacityError::Zero.to_string(),
            "ring capacity must be nonzero"
        );
        assert_eq!(
            CapacityError::NotPowerOfTwo(12).to_string(),
            "ring capacity 12 is not a power of two"
        );
    }

    #[test]
    fn test_from_storage() {
        let storage: Box<[MaybeUninit<u64>]> = Box::new([MaybeUninit::uninit(); 8]);
        let mut ring = HeapRing::from_storage(storage).unwrap();
        assert_eq!(ring.capacity(), 7);

        let (mut tx, mut rx) = ring.split();
        for v in 0..7u64 {
            assert!(tx.push(v));
        }
        assert!(!tx.push(7));
        for v in 0..7u64 {
            assert_eq!(rx.pop(), Some(v));
        }
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_from_storage_validates_length() {
        let storage: Box<[MaybeUninit<u64>]> = Box::new([MaybeUninit::uninit(); 6]);
        assert_eq!(
            HeapRing::from_storage(storage).err(),
            Some(CapacityError::NotPowerOfTwo(6))
        );

        let empty: Box<[MaybeUninit<u64>]> = Box::new([]);
        assert_eq!(HeapRing::from_storage(empty).err(), Some(CapacityError::Zero));
    }

    #[test]
    fn test_roundtrip_in_order() {
        let mut ring = HeapRing::<u32>::with_capacity(8).unwrap();
        let (mut tx, mut rx) = ring.split();

        for v in 10..15u32 {
            assert!(tx.push(v));
        }
        for v in 10..15u32 {
            assert_eq!(rx.pop(), Some(v));
        }
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_chunk_wraparound() {
        let mut ring = HeapRing::<u32>::with_capacity(8).unwrap();
        let (mut tx, mut rx) = ring.split();

        // Park the cursors at slot 5, then split both copies across the end.
        for v in 0..5u32 {
            assert!(tx.push(v));
        }
        let mut sink = [0u32; 5];
        assert_eq!(rx.pop_chunk(&mut sink), 5);

        assert!(tx.push_chunk(&[20, 21, 22, 23, 24, 25]));
        let mut out = [0u32; 6];
        assert_eq!(rx.pop_chunk(&mut out), 6);
        assert_eq!(out, [20, 21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_chunk_all_or_nothing_and_clamp() {
        let mut ring = HeapRing::<u32>::with_capacity(8).unwrap();
        let (mut tx, mut rx) = ring.split();

        assert!(!tx.push_chunk(&[]));
        assert!(tx.push_chunk(&[1, 2, 3, 4, 5, 6]));
        assert!(!tx.push_chunk(&[7, 8])); // one slot free, two requested
        assert!(tx.push_chunk(&[7]));

        let mut out = [0u32; 4];
        assert_eq!(rx.pop_chunk(&mut out), 4);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(rx.pop_chunk(&mut out), 3);
        assert_eq!(&out[..3], &[5, 6, 7]);
        assert_eq!(rx.pop_chunk(&mut out), 0);
    }

    #[test]
    fn test_many_laps_preserve_order() {
        let mut ring = HeapRing::<u64>::with_capacity(4).unwrap();
        let (mut tx, mut rx) = ring.split();

        for v in 0..500u64 {
            assert!(tx.push(v));
            assert_eq!(rx.pop(), Some(v));
        }
    }

    #[test]
    fn test_split_resumes_from_current_state() {
        let mut ring = HeapRing::<u32>::with_capacity(8).unwrap();
        {
            let (mut tx, _rx) = ring.split();
            assert!(tx.push(1));
        }
        let (_tx, mut rx) = ring.split();
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), None);
    }
}
