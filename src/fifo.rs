//! Sequential ring queue with compile-time capacity.
//!
//! [`Fifo<T, N, P>`] is the single-context counterpart of
//! [`SpscRing`](crate::SpscRing): same power-of-two slot array, same
//! reserved-slot convention (usable capacity `N - 1`), plain `usize` cursors
//! instead of atomics. Unlike the concurrent rings it takes any `T`, tracks
//! slot initialization with `MaybeUninit`, and drops whatever is still
//! buffered when it goes away.
//!
//! Rejected operations report through return values and additionally through
//! the [`FaultPolicy`] parameter, so a build can choose between quiet
//! rejection ([`Silent`]) and loud failure ([`FailFast`](crate::FailFast)).

use crate::invariants::{debug_assert_chunk_geometry, debug_assert_cursor_range};
use crate::policy::{FaultPolicy, Silent};

use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;

/// A fixed-capacity sequential FIFO over a power-of-two ring.
///
/// `N` must be a nonzero power of two (checked at compile time); usable
/// capacity is `N - 1`.
pub struct Fifo<T, const N: usize, P = Silent> {
    /// Next slot to write.
    head: usize,
    /// Next slot to read. Slots in `[tail, head)` (ring order) are
    /// initialized.
    tail: usize,
    buffer: [MaybeUninit<T>; N],
    _policy: PhantomData<P>,
}

impl<T, const N: usize, P> Fifo<T, N, P> {
    const MASK: usize = N - 1;

    /// Creates an empty queue. Fails to compile if `N` is zero or not a
    /// power of two.
    pub const fn new() -> Self {
        const {
            assert!(
                N != 0 && N.is_power_of_two(),
                "Fifo capacity must be a nonzero power of two"
            );
        }

        Self {
            head: 0,
            tail: 0,
            buffer: [const { MaybeUninit::uninit() }; N],
            _policy: PhantomData,
        }
    }

    /// Usable capacity: `N - 1` (one slot stays reserved).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of buffered items.
    #[inline]
    pub const fn len(&self) -> usize {
        self.head.wrapping_sub(self.tail) & Self::MASK
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        (self.head + 1) & Self::MASK == self.tail
    }

    /// Free slots remaining.
    #[inline]
    pub const fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Removes and returns the oldest item, or `None` when empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let tail = self.tail;
        debug_assert_cursor_range!("tail", tail, N);
        // SAFETY: non-empty, so slot `tail` is inside the initialized window
        // `[tail, head)`. Advancing `tail` afterwards removes it from the
        // window, so it is never read twice.
        let item = unsafe { self.buffer[tail].assume_init_read() };
        self.tail = (tail + 1) & Self::MASK;
        Some(item)
    }

    /// The oldest item, or `None` when empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: non-empty, slot `tail` is initialized.
        Some(unsafe { self.buffer[self.tail].assume_init_ref() })
    }

    /// The most recently pushed item, or `None` when empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let last = (self.head + Self::MASK) & Self::MASK;
        // SAFETY: non-empty, slot `head - 1` (ring order) is initialized.
        Some(unsafe { self.buffer[last].assume_init_ref() })
    }

    /// Drops all buffered items and resets the cursors.
    pub fn clear(&mut self) {
        let mut pos = self.tail;
        while pos != self.head {
            // SAFETY: every slot in `[tail, head)` is initialized and about
            // to leave the window for good.
            unsafe {
                self.buffer[pos].assume_init_drop();
            }
            pos = (pos + 1) & Self::MASK;
        }
        self.head = 0;
        self.tail = 0;
    }

    /// Iterates the buffered items oldest-first without consuming them.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            buffer: &self.buffer,
            pos: self.tail,
            remaining: self.len(),
        }
    }
}

impl<T, const N: usize, P: FaultPolicy> Fifo<T, N, P> {
    /// Appends one item.
    ///
    /// On a full queue the policy fault fires and the item comes back as
    /// `Err` untouched.
    pub fn push_back(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            P::fault("push_back on full ring");
            return Err(item);
        }
        let head = self.head;
        debug_assert_cursor_range!("head", head, N);
        self.buffer[head].write(item);
        self.head = (head + 1) & Self::MASK;
        Ok(())
    }

    /// Appends all of `items` or nothing (`T: Copy`).
    ///
    /// Returns `false` when `items` is empty or free space is insufficient;
    /// the policy fault fires only for the latter.
    pub fn extend_from_slice(&mut self, items: &[T]) -> bool
    where
        T: Copy,
    {
        let n = items.len();
        if n == 0 {
            return false;
        }
        if self.free() < n {
            P::fault("extend_from_slice exceeds free space");
            return false;
        }

        let head = self.head;
        let first = n.min(N - head);
        let second = n - first;
        debug_assert_chunk_geometry!(first, second, n);

        let base = self.buffer.as_mut_ptr().cast::<T>();
        // SAFETY: the free-space check proved slots `[head, head + n)`
        // (ring order) lie outside the initialized window; `items` is a
        // borrowed slice disjoint from the buffer.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), base.add(head), first);
            if second > 0 {
                ptr::copy_nonoverlapping(items.as_ptr().add(first), base, second);
            }
        }

        self.head = (head + n) & Self::MASK;
        true
    }
}

impl<T, const N: usize, P> Default for Fifo<T, N, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, P> Drop for Fifo<T, N, P> {
    fn drop(&mut self) {
        let mut pos = self.tail;
        while pos != self.head {
            // SAFETY: slots in `[tail, head)` are initialized and owned here.
            unsafe {
                self.buffer[pos].assume_init_drop();
            }
            pos = (pos + 1) & Self::MASK;
        }
    }
}

/// Oldest-first borrowed iterator over a [`Fifo`].
pub struct Iter<'a, T, const N: usize> {
    buffer: &'a [MaybeUninit<T>; N],
    pos: usize,
    remaining: usize,
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: `remaining` counts down the initialized window captured at
        // construction; `pos` walks it in ring order.
        let item = unsafe { self.buffer[self.pos].assume_init_ref() };
        self.pos = (self.pos + 1) & (N - 1);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FailFast;

    #[test]
    fn test_push_pop_in_order() {
        let mut q: Fifo<u32, 8> = Fifo::new();
        assert_eq!(q.capacity(), 7);

        for v in 1..=5u32 {
            assert!(q.push_back(v).is_ok());
        }
        assert_eq!(q.len(), 5);
        assert_eq!(q.front(), Some(&1));
        assert_eq!(q.back(), Some(&5));

        for v in 1..=5u32 {
            assert_eq!(q.pop_front(), Some(v));
        }
        assert_eq!(q.pop_front(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_reserved_slot_full_boundary() {
        let mut q: Fifo<u32, 8> = Fifo::new();

        for v in 0..7u32 {
            assert!(q.push_back(v).is_ok());
        }
        assert!(q.is_full());
        assert_eq!(q.free(), 0);
        assert_eq!(q.push_back(99), Err(99));
        assert_eq!(q.len(), 7);
    }

    #[test]
    #[should_panic(expected = "push_back on full ring")]
    fn test_fail_fast_push_on_full() {
        let mut q: Fifo<u32, 2, FailFast> = Fifo::new();
        assert!(q.push_back(1).is_ok());
        let _ = q.push_back(2);
    }

    #[test]
    fn test_extend_from_slice_all_or_nothing() {
        let mut q: Fifo<u32, 8> = Fifo::new();

        assert!(!q.extend_from_slice(&[]));
        assert!(q.extend_from_slice(&[1, 2, 3, 4, 5]));
        assert!(!q.extend_from_slice(&[6, 7, 8]));
        assert_eq!(q.len(), 5);
        assert!(q.extend_from_slice(&[6, 7]));
        assert!(q.is_full());

        for v in 1..=7u32 {
            assert_eq!(q.pop_front(), Some(v));
        }
    }

    #[test]
    fn test_extend_wraps_across_physical_end() {
        let mut q: Fifo<u32, 8> = Fifo::new();

        for v in 0..5u32 {
            assert!(q.push_back(v).is_ok());
        }
        for v in 0..5u32 {
            assert_eq!(q.pop_front(), Some(v));
        }

        // head == tail == 5; six items split 3 + 3 around the end.
        assert!(q.extend_from_slice(&[10, 11, 12, 13, 14, 15]));
        let drained: Vec<u32> = std::iter::from_fn(|| q.pop_front()).collect();
        assert_eq!(drained, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    #[should_panic(expected = "extend_from_slice exceeds free space")]
    fn test_fail_fast_extend_past_free_space() {
        let mut q: Fifo<u32, 4, FailFast> = Fifo::new();
        let _ = q.extend_from_slice(&[1, 2, 3, 4]);
    }

    #[test]
    fn test_fail_fast_extend_empty_input_is_quiet() {
        // Empty input is a plain rejection, not a fault.
        let mut q: Fifo<u32, 4, FailFast> = Fifo::new();
        assert!(!q.extend_from_slice(&[]));
    }

    #[test]
    fn test_iter_in_ring_order() {
        let mut q: Fifo<u32, 8> = Fifo::new();
        for v in 0..6u32 {
            assert!(q.push_back(v).is_ok());
        }
        for _ in 0..4 {
            q.pop_front();
        }
        for v in 10..14u32 {
            assert!(q.push_back(v).is_ok());
        }

        let seen: Vec<u32> = q.iter().copied().collect();
        assert_eq!(seen, vec![4, 5, 10, 11, 12, 13]);
        assert_eq!(q.iter().len(), 6);
        // Iteration does not consume.
        assert_eq!(q.len(), 6);
    }

    #[test]
    fn test_non_copy_payload() {
        let mut q: Fifo<String, 4> = Fifo::new();
        assert!(q.push_back("a".to_owned()).is_ok());
        assert!(q.push_back("b".to_owned()).is_ok());
        assert_eq!(q.pop_front().as_deref(), Some("a"));
        assert_eq!(q.pop_front().as_deref(), Some("b"));
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn test_clear_and_drop_release_items() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROPS.store(0, Ordering::SeqCst);
        {
            let mut q: Fifo<Tracked, 8> = Fifo::new();
            for _ in 0..5 {
                assert!(q.push_back(Tracked).is_ok());
            }
            q.clear();
            assert_eq!(DROPS.load(Ordering::SeqCst), 5);
            assert!(q.is_empty());

            for _ in 0..3 {
                assert!(q.push_back(Tracked).is_ok());
            }
            // Queue drops with 3 items still buffered.
        }
        assert_eq!(DROPS.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_many_laps() {
        let mut q: Fifo<u64, 4> = Fifo::new();
        for v in 0..1000u64 {
            assert!(q.push_back(v).is_ok());
            assert_eq!(q.pop_front(), Some(v));
        }
    }
}
