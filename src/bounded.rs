//! Sequenced buffers with a single shared read cursor (spec §4.4).

use std::time::Duration;

use parking_lot::Mutex;

use crate::barrier::Barrier;
use crate::config::RingConfig;
use crate::error::{CoreError, Result};
use crate::ring::Ring;
use crate::slot::{BoxSlotHolder, SlotHolder};

/// Single-threaded sequenced buffer: `put` refuses once the unread backlog
/// reaches `ring_size`, `next` refuses once the reader has caught up to the
/// cursor. No blocking — both refusals are immediate.
pub struct BoundedSequenced<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    ring: Ring<T, H>,
    read_cursor: u64,
}

impl<T, H: SlotHolder<Input = T>> BoundedSequenced<T, H> {
    pub fn new(config: RingConfig) -> Self {
        BoundedSequenced { ring: Ring::new(config), read_cursor: 0 }
    }

    pub fn put(&mut self, value: T) -> Result<u64> {
        let cursor = self.ring.cursor_position();
        if cursor - self.read_cursor == self.ring.ring_size() as u64 {
            return Err(CoreError::ReadCursorBlocked);
        }
        Ok(self.ring.put(value))
    }

    pub fn next(&mut self) -> Result<(u64, &H::Output)> {
        if self.read_cursor == self.ring.cursor_position() {
            return Err(CoreError::sequence_not_found(self.read_cursor));
        }
        let result = self.ring.get(self.read_cursor)?;
        self.read_cursor += 1;
        Ok(result)
    }

    pub fn flush(&mut self) {
        self.ring.flush();
        self.read_cursor = 0;
    }
}

/// [`BoundedSequenced`] bracketed by a single mutex (spec §4.4).
pub struct BoundedSequencedGuarded<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    inner: Mutex<BoundedSequenced<T, H>>,
}

impl<T, H: SlotHolder<Input = T>> BoundedSequencedGuarded<T, H> {
    pub fn new(config: RingConfig) -> Self {
        BoundedSequencedGuarded { inner: Mutex::new(BoundedSequenced::new(config)) }
    }

    pub fn put(&self, value: T) -> Result<u64> {
        self.inner.lock().put(value)
    }

    pub fn next(&self) -> Result<(u64, H::Output)>
    where
        H::Output: Clone,
    {
        self.inner.lock().next().map(|(s, v)| (s, v.clone()))
    }

    pub fn flush(&self) {
        self.inner.lock().flush();
    }
}

/// Like [`BoundedSequenced`] but blocking: both `put` and `next` wait on a
/// condition barrier with a timeout instead of failing immediately.
///
/// The barriers are owned per-instance. The Python implementation this is
/// modeled on declares them at class scope, sharing one pair of barriers
/// across every instance — this type fixes that by giving each buffer its
/// own `data_available`/`space_available` pair.
pub struct WaitingBounded<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    inner: Mutex<BoundedSequencedState<T, H>>,
    data_available: Barrier,
    space_available: Barrier,
}

struct BoundedSequencedState<T, H: SlotHolder<Input = T>> {
    ring: Ring<T, H>,
    read_cursor: u64,
}

impl<T, H: SlotHolder<Input = T>> WaitingBounded<T, H> {
    pub fn new(config: RingConfig) -> Self {
        WaitingBounded {
            inner: Mutex::new(BoundedSequencedState { ring: Ring::new(config), read_cursor: 0 }),
            data_available: Barrier::new(),
            space_available: Barrier::new(),
        }
    }

    pub fn put(&self, value: T, timeout: Duration) -> Result<u64> {
        loop {
            {
                let mut state = self.inner.lock();
                let cursor = state.ring.cursor_position();
                if cursor - state.read_cursor < state.ring.ring_size() as u64 {
                    let sequence = state.ring.put(value);
                    drop(state);
                    self.data_available.signal();
                    return Ok(sequence);
                }
                self.space_available.clear();
            }
            if !self.space_available.wait(timeout) {
                return Err(CoreError::ReadCursorBlocked);
            }
        }
    }

    pub fn next(&self, timeout: Duration) -> Result<(u64, H::Output)>
    where
        H::Output: Clone,
    {
        loop {
            {
                let mut state = self.inner.lock();
                if state.read_cursor < state.ring.cursor_position() {
                    let (s, v) = state.ring.get(state.read_cursor).map(|(s, v)| (s, v.clone()))?;
                    state.read_cursor += 1;
                    drop(state);
                    self.space_available.signal();
                    return Ok((s, v));
                }
                self.data_available.clear();
            }
            if !self.data_available.wait(timeout) {
                return Err(CoreError::sequence_not_found(self.inner.lock().read_cursor));
            }
        }
    }

    pub fn flush(&self) {
        let mut state = self.inner.lock();
        state.ring.flush();
        state.read_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn put_refuses_once_backlog_fills_then_succeeds_after_a_read() {
        let mut buf: BoundedSequenced<i32> = BoundedSequenced::new(RingConfig::new(4).unwrap());
        for i in 0..4 {
            buf.put(i).unwrap();
        }
        assert_eq!(buf.put(4).unwrap_err(), CoreError::ReadCursorBlocked);
        let (s, v) = buf.next().unwrap();
        assert_eq!((s, *v), (0, 0));
        assert!(buf.put(4).is_ok());
    }

    #[test]
    fn next_fails_when_caught_up() {
        let mut buf: BoundedSequenced<i32> = BoundedSequenced::new(RingConfig::new(4).unwrap());
        buf.put(1).unwrap();
        buf.next().unwrap();
        assert_eq!(buf.next().unwrap_err(), CoreError::sequence_not_found(1));
    }

    #[test]
    fn guarded_variant_round_trips() {
        let buf: BoundedSequencedGuarded<i32> =
            BoundedSequencedGuarded::new(RingConfig::new(4).unwrap());
        buf.put(9).unwrap();
        let (s, v) = buf.next().unwrap();
        assert_eq!((s, v), (0, 9));
    }

    #[test]
    fn waiting_bounded_unblocks_as_a_slow_consumer_catches_up() {
        let buf: Arc<WaitingBounded<i32>> = Arc::new(WaitingBounded::new(RingConfig::new(2).unwrap()));

        let producer = {
            let buf = buf.clone();
            thread::spawn(move || {
                for i in 0..4 {
                    buf.put(i, Duration::from_secs(1)).unwrap();
                }
            })
        };

        let mut final_value = None;
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(20));
            let (_, v) = buf.next(Duration::from_secs(1)).unwrap();
            final_value = Some(v);
        }
        producer.join().unwrap();
        assert_eq!(final_value, Some(3));
    }

    #[test]
    fn waiting_bounded_put_times_out_without_reader() {
        let buf: WaitingBounded<i32> = WaitingBounded::new(RingConfig::new(2).unwrap());
        buf.put(0, Duration::from_millis(10)).unwrap();
        buf.put(1, Duration::from_millis(10)).unwrap();
        assert_eq!(buf.put(2, Duration::from_millis(20)).unwrap_err(), CoreError::ReadCursorBlocked);
    }

    #[test]
    fn each_instance_has_its_own_barriers() {
        // Regression test for the shared-barrier bug in the source this is
        // modeled on: two instances must not observe each other's signals.
        let a: WaitingBounded<i32> = WaitingBounded::new(RingConfig::new(2).unwrap());
        let b: WaitingBounded<i32> = WaitingBounded::new(RingConfig::new(2).unwrap());
        a.put(1, Duration::from_millis(10)).unwrap();
        assert_eq!(b.next(Duration::from_millis(20)).unwrap_err(), CoreError::sequence_not_found(0));
    }
}
