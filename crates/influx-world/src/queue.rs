//! Acquire/release primitives shared between threads.
//!
//! [`PhaseLock`] is a binary lock with explicit `acquire`/`release` and
//! wait/notify semantics, used to pause a running simulation between
//! cycles. [`GeneratorQueue`] is a generator's packet buffer, shared
//! between the generator's own production and the kernel's reads of it.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use influx_core::Color;

fn relock<T>(r: std::sync::LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    r.unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── PhaseLock ──────────────────────────────────────────────────────

/// A binary lock that can be acquired on one call and released on another.
///
/// Unlike a `Mutex` guard, holding a `PhaseLock` is not tied to a scope:
/// a controller thread may `acquire` to pause a worker and `release`
/// later. Workers call [`wait_released`](Self::wait_released) at safe points.
#[derive(Debug, Default)]
pub struct PhaseLock {
    held: Mutex<bool>,
    changed: Condvar,
}

impl PhaseLock {
    /// A released lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free, then take it.
    pub fn acquire(&self) {
        let mut held = relock(self.held.lock());
        while *held {
            held = relock(self.changed.wait(held));
        }
        *held = true;
    }

    /// Take the lock if it is free. Returns whether it was taken.
    pub fn try_acquire(&self) -> bool {
        let mut held = relock(self.held.lock());
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    /// Free the lock and wake every waiter.
    pub fn release(&self) {
        let mut held = relock(self.held.lock());
        *held = false;
        self.changed.notify_all();
    }

    /// Whether someone holds the lock.
    pub fn is_held(&self) -> bool {
        *relock(self.held.lock())
    }

    /// Block while the lock is held, or until `timeout` elapses.
    ///
    /// Returns `true` if the lock is free on return.
    pub fn wait_released(&self, timeout: Duration) -> bool {
        let held = relock(self.held.lock());
        let (held, _) = self
            .changed
            .wait_timeout_while(held, timeout, |h| *h)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !*held
    }
}

// ── GeneratorQueue ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct QueueInner {
    buffer: Mutex<VecDeque<Color>>,
    available: Condvar,
}

/// FIFO of packets a generator has produced but not yet released.
///
/// Clones share the same buffer.
///
/// # Examples
///
/// ```
/// use influx_core::Color;
/// use influx_world::GeneratorQueue;
///
/// let q = GeneratorQueue::new();
/// let reader = q.clone();
/// q.push(Color::Red);
/// assert_eq!(reader.len(), 1);
/// assert_eq!(reader.pop(), Some(Color::Red));
/// assert!(q.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct GeneratorQueue {
    inner: Arc<QueueInner>,
}

impl GeneratorQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a packet and wake one waiter.
    pub fn push(&self, color: Color) {
        let mut buf = relock(self.inner.buffer.lock());
        buf.push_back(color);
        self.inner.available.notify_one();
    }

    /// Remove the oldest packet.
    pub fn pop(&self) -> Option<Color> {
        relock(self.inner.buffer.lock()).pop_front()
    }

    /// The oldest packet, without removing it.
    pub fn peek(&self) -> Option<Color> {
        relock(self.inner.buffer.lock()).front().copied()
    }

    /// Number of buffered packets.
    pub fn len(&self) -> usize {
        relock(self.inner.buffer.lock()).len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until a packet is available or `timeout` elapses, then pop it.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Color> {
        let buf = relock(self.inner.buffer.lock());
        let (mut buf, _) = self
            .inner
            .available
            .wait_timeout_while(buf, timeout, |b| b.is_empty())
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.pop_front()
    }
}
