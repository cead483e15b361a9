//! Edge-triggered, idempotent signal/wait barrier.
//!
//! Modeled on a `threading.Event`: `signal` sets a flag and wakes every
//! waiter, `clear` resets it, `wait` blocks (optionally with a timeout)
//! until the flag is set. Unlike a bare condition variable, `signal` is
//! idempotent — signaling an already-signaled barrier is a no-op, so
//! producer and subscriber don't need to coordinate on whether a wake was
//! already delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

pub struct Barrier {
    signaled: AtomicBool,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl Default for Barrier {
    fn default() -> Self {
        Barrier { signaled: AtomicBool::new(false), mutex: Mutex::new(()), condvar: Condvar::new() }
    }
}

impl Barrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every waiter. A no-op if already signaled.
    pub fn signal(&self) {
        if self.signaled.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }

    /// Resets the flag so a subsequent `wait` blocks again.
    pub fn clear(&self) {
        self.signaled.store(false, Ordering::Release);
    }

    /// Blocks until signaled or `timeout` elapses. Returns `true` if woken
    /// by a signal, `false` on timeout.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.signaled.load(Ordering::Acquire) {
            return true;
        }
        let mut guard = self.mutex.lock();
        if self.signaled.load(Ordering::Acquire) {
            return true;
        }
        let result = self.condvar.wait_for(&mut guard, timeout);
        !result.timed_out() || self.signaled.load(Ordering::Acquire)
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }
}
