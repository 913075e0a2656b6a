//! Loom-based concurrency tests for the SPSC cursor protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores all possible thread interleavings to find
//! concurrency bugs that only occur under specific scheduling.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;
use std::cell::UnsafeCell;

const SLOTS: usize = 4;
const MASK: usize = SLOTS - 1;

/// Simplified ring for loom testing.
///
/// Mirrors the cursor protocol of `SpscRing`: indices stay in `[0, SLOTS)`,
/// one slot is always left unoccupied, and each side publishes only its own
/// cursor with a release store. Capacity is kept tiny so loom's exhaustive
/// search stays tractable.
struct LoomRing {
    /// Next write position (producer-owned).
    head: AtomicUsize,
    /// Next read position (consumer-owned).
    tail: AtomicUsize,
    buffer: UnsafeCell<[u64; SLOTS]>,
}

unsafe impl Send for LoomRing {}
unsafe impl Sync for LoomRing {}

impl LoomRing {
    fn new() -> Self {
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            buffer: UnsafeCell::new([0; SLOTS]),
        }
    }

    /// Producer: try to push a value.
    fn push(&self, value: u64) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & MASK;

        // Acquire: pairs with the consumer's release store of `tail`.
        let tail = self.tail.load(Ordering::Acquire);
        if next == tail {
            return false;
        }

        // SAFETY: the slot at `head` is outside [tail, head) so the
        // consumer will not read it until `head` is published below.
        unsafe {
            (*self.buffer.get())[head] = value;
        }

        // Release: publishes the slot write to the consumer.
        self.head.store(next, Ordering::Release);
        true
    }

    /// Consumer: try to pop a value.
    fn pop(&self) -> Option<u64> {
        let tail = self.tail.load(Ordering::Relaxed);

        // Acquire: pairs with the producer's release store of `head`.
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }

        // SAFETY: tail != head, so the slot at `tail` holds a published value.
        let value = unsafe { (*self.buffer.get())[tail] };

        // Release: hands the slot back to the producer.
        self.tail.store((tail + 1) & MASK, Ordering::Release);
        Some(value)
    }

    /// Producer: all-or-nothing bulk push with a single cursor publish.
    fn push_chunk(&self, values: &[u64]) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        let occupied = head.wrapping_sub(tail) & MASK;
        if values.is_empty() || values.len() > MASK - occupied {
            return false;
        }

        let first = values.len().min(SLOTS - head);
        // SAFETY: all written slots lie in the free region checked above.
        unsafe {
            let buf = &mut *self.buffer.get();
            buf[head..head + first].copy_from_slice(&values[..first]);
            buf[..values.len() - first].copy_from_slice(&values[first..]);
        }

        self.head.store((head + values.len()) & MASK, Ordering::Release);
        true
    }

    /// Consumer: best-effort bulk pop with a single cursor publish.
    fn pop_chunk(&self, out: &mut [u64]) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        let available = head.wrapping_sub(tail) & MASK;
        let count = out.len().min(available);
        if count == 0 {
            return 0;
        }

        let first = count.min(SLOTS - tail);
        // SAFETY: all read slots lie in the occupied region checked above.
        unsafe {
            let buf = &*self.buffer.get();
            out[..first].copy_from_slice(&buf[tail..tail + first]);
            out[first..count].copy_from_slice(&buf[..count - first]);
        }

        self.tail.store((tail + count) & MASK, Ordering::Release);
        count
    }
}

/// Basic push/pop visibility under exhaustive interleaving.
#[test]
fn loom_spsc_publish_visibility() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        let producer = thread::spawn(move || {
            ring2.push(42);
            ring2.push(43);
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            // Bounded retries since the producer may not have run yet.
            for _ in 0..10 {
                if let Some(v) = ring.pop() {
                    received.push(v);
                }
                if received.len() == 2 {
                    break;
                }
                loom::thread::yield_now();
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        // Whatever arrived must be in FIFO order.
        if !received.is_empty() {
            assert_eq!(received[0], 42);
        }
        if received.len() == 2 {
            assert_eq!(received[1], 43);
        }
    });
}

/// The reserved slot keeps one position unoccupied: SLOTS - 1 usable.
#[test]
fn loom_spsc_reserved_slot_boundary() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        // Fill the usable capacity (SLOTS - 1 = 3).
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));

        // Reserved slot: the fourth push must fail.
        assert!(!ring.push(4));

        let consumer = thread::spawn(move || ring2.pop());

        let value = consumer.join().unwrap();
        assert_eq!(value, Some(1));

        // The freed slot is visible to the producer.
        assert!(ring.push(4));
    });
}

/// Concurrent producer and consumer never lose or duplicate items.
#[test]
fn loom_spsc_concurrent() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring_producer = Arc::clone(&ring);
        let ring_consumer = Arc::clone(&ring);

        let producer = thread::spawn(move || {
            let mut sent = 0usize;
            if ring_producer.push(100) {
                sent += 1;
            }
            if ring_producer.push(200) {
                sent += 1;
            }
            sent
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            for _ in 0..4 {
                if let Some(v) = ring_consumer.pop() {
                    received.push(v);
                }
                loom::thread::yield_now();
            }
            received
        });

        let sent = producer.join().unwrap();
        let received = consumer.join().unwrap();

        assert!(
            received.len() <= sent,
            "received {} but only sent {}",
            received.len(),
            sent
        );
        // Order must match the producer's sequence.
        for (got, want) in received.iter().zip([100, 200]) {
            assert_eq!(*got, want);
        }
    });
}

/// A chunk spanning the wrap boundary is published atomically: the consumer
/// sees either none of it or a prefix in order, never a gap.
#[test]
fn loom_spsc_chunk_wrap() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        // Advance both cursors to 2 so a 3-item chunk wraps past SLOTS.
        assert!(ring.push(0));
        assert!(ring.push(0));
        assert_eq!(ring.pop(), Some(0));
        assert_eq!(ring.pop(), Some(0));

        let producer = thread::spawn(move || ring2.push_chunk(&[10, 11, 12]));

        let consumer = thread::spawn(move || {
            let mut out = [0u64; 3];
            let mut received = Vec::new();
            for _ in 0..6 {
                let n = ring.pop_chunk(&mut out);
                received.extend_from_slice(&out[..n]);
                if received.len() == 3 {
                    break;
                }
                loom::thread::yield_now();
            }
            received
        });

        let pushed = producer.join().unwrap();
        let received = consumer.join().unwrap();

        assert!(pushed, "3 items fit in an empty ring of 3 usable slots");
        // All-or-nothing publish: any observed prefix is contiguous.
        for (got, want) in received.iter().zip([10, 11, 12]) {
            assert_eq!(*got, want);
        }
    });
}

/// The cached-cursor fast path: a stale cache may only under-report free
/// space, and one acquire refresh is enough to observe the opposite side's
/// latest published cursor.
#[test]
fn loom_cached_cursor_refresh() {
    loom::model(|| {
        let head = Arc::new(AtomicUsize::new(0));
        let tail = Arc::new(AtomicUsize::new(0));

        let head_p = Arc::clone(&head);
        let tail_p = Arc::clone(&tail);
        let head_c = Arc::clone(&head);
        let tail_c = Arc::clone(&tail);

        // Producer: cache says full, refresh once, then decide.
        let producer = thread::spawn(move || {
            let h = head_p.load(Ordering::Relaxed);
            let next = (h + 1) & MASK;

            // Stale cache claiming the ring is full.
            let mut cached_tail = next;

            if next == cached_tail {
                // Slow path: single acquire refresh.
                cached_tail = tail_p.load(Ordering::Acquire);
            }
            if next == cached_tail {
                return false;
            }
            head_p.store(next, Ordering::Release);
            true
        });

        // Consumer: advances tail by one if an item is visible.
        let consumer = thread::spawn(move || {
            let t = tail_c.load(Ordering::Relaxed);
            let h = head_c.load(Ordering::Acquire);
            if t == h {
                return false;
            }
            tail_c.store((t + 1) & MASK, Ordering::Release);
            true
        });

        let pushed = producer.join().unwrap();
        let popped = consumer.join().unwrap();

        let occupied = head.load(Ordering::SeqCst).wrapping_sub(tail.load(Ordering::SeqCst)) & MASK;
        assert!(occupied <= MASK, "occupancy exceeds usable capacity");

        // The ring started empty, so the consumer can only have popped an
        // item the producer published first.
        if popped {
            assert!(pushed, "popped an item that was never pushed");
        }
    });
}
