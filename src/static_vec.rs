//! Fixed-capacity vector with inline storage.
//!
//! [`StaticVec<T, N, P>`] grows like `Vec` up to `N` elements and never
//! allocates. It is contiguous rather than ring-addressed, so all `N` slots
//! are usable and `N` needs no power-of-two shape. Overflow reports through
//! the return value and the [`FaultPolicy`] parameter, like
//! [`Fifo`](crate::Fifo).

use crate::policy::{FaultPolicy, Silent};

use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::ptr;

/// A contiguous growable array with capacity fixed at `N`.
///
/// Elements `[0, len)` are initialized; the rest of the buffer is spare
/// room.
pub struct StaticVec<T, const N: usize, P = Silent> {
    len: usize,
    buffer: [MaybeUninit<T>; N],
    _policy: PhantomData<P>,
}

impl<T, const N: usize, P> StaticVec<T, N, P> {
    /// Creates an empty vector.
    pub const fn new() -> Self {
        Self {
            len: 0,
            buffer: [const { MaybeUninit::uninit() }; N],
            _policy: PhantomData,
        }
    }

    /// Total capacity: all `N` slots are usable.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Removes and returns the last element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: index `len` was inside the initialized prefix before the
        // decrement; shrinking first means a panic elsewhere cannot observe
        // it as initialized again.
        Some(unsafe { self.buffer[self.len].assume_init_read() })
    }

    /// Removes and returns the element at `idx`, shifting everything after
    /// it left.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`, matching the slice index contract.
    pub fn remove(&mut self, idx: usize) -> T {
        let len = self.len;
        assert!(idx < len, "remove index {idx} out of range (len {len})");
        // SAFETY: `idx < len`, so the slot is initialized. The shift below
        // moves `[idx + 1, len)` down one, after which the duplicate at the
        // old position is treated as uninitialized via the shrunk `len`.
        unsafe {
            let item = self.buffer[idx].assume_init_read();
            let base = self.buffer.as_mut_ptr();
            ptr::copy(base.add(idx + 1), base.add(idx), len - idx - 1);
            self.len = len - 1;
            item
        }
    }

    /// Removes and returns the element at `idx`, replacing it with the last
    /// element. O(1), does not preserve order.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`.
    pub fn swap_remove(&mut self, idx: usize) -> T {
        let len = self.len;
        assert!(idx < len, "swap_remove index {idx} out of range (len {len})");
        // SAFETY: both `idx` and `len - 1` are initialized; after the move
        // the vacated last slot leaves the prefix via the decrement.
        unsafe {
            let item = self.buffer[idx].assume_init_read();
            let base = self.buffer.as_mut_ptr();
            ptr::copy(base.add(len - 1), base.add(idx), 1);
            self.len = len - 1;
            item
        }
    }

    /// Shortens the vector to `new_len`, dropping the removed tail. No-op
    /// when `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        while self.len > new_len {
            self.len -= 1;
            // SAFETY: the slot leaving the prefix is initialized.
            unsafe {
                self.buffer[self.len].assume_init_drop();
            }
        }
    }

    /// Drops all elements.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: elements `[0, len)` are initialized and live as long as
        // the borrow of `self`.
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr().cast::<T>(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; the exclusive borrow covers mutation.
        unsafe { std::slice::from_raw_parts_mut(self.buffer.as_mut_ptr().cast::<T>(), self.len) }
    }
}

impl<T, const N: usize, P: FaultPolicy> StaticVec<T, N, P> {
    /// Appends one element.
    ///
    /// On a full vector the policy fault fires and the element comes back as
    /// `Err` untouched.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.len == N {
            P::fault("push on full vector");
            return Err(item);
        }
        self.buffer[self.len].write(item);
        self.len += 1;
        Ok(())
    }

    /// Appends all of `items` or nothing (`T: Copy`).
    ///
    /// Returns `false` when `items` is empty or spare room is insufficient;
    /// the policy fault fires only for the latter.
    pub fn extend_from_slice(&mut self, items: &[T]) -> bool
    where
        T: Copy,
    {
        let n = items.len();
        if n == 0 {
            return false;
        }
        if N - self.len < n {
            P::fault("extend_from_slice exceeds spare room");
            return false;
        }
        // SAFETY: `[len, len + n)` is inside the buffer and uninitialized;
        // `items` is disjoint from it.
        unsafe {
            let base = self.buffer.as_mut_ptr().cast::<T>();
            ptr::copy_nonoverlapping(items.as_ptr(), base.add(self.len), n);
        }
        self.len += n;
        true
    }
}

impl<T, const N: usize, P> Deref for StaticVec<T, N, P> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, P> DerefMut for StaticVec<T, N, P> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, P> Default for StaticVec<T, N, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, P> Drop for StaticVec<T, N, P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, const N: usize, P> fmt::Debug for StaticVec<T, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, const N: usize, P: FaultPolicy> FromIterator<T> for StaticVec<T, N, P> {
    /// Collects at most `N` elements; the rest of the iterator is left
    /// unpulled. Reaching capacity here is the documented contract, not a
    /// fault, so the policy stays quiet.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        for item in iter {
            if v.is_full() {
                break;
            }
            let _ = v.push(item);
        }
        v
    }
}

// =============================================================================
// TESTS
// =============================================================================
