//! Fixed-capacity slot array with sequence-based random access.

use parking_lot::ReentrantMutex;
use std::cell::UnsafeCell;

use crate::config::RingConfig;
use crate::counter::{AtomicCounter, SharedCounter};
use crate::error::{CoreError, Result};
use crate::slot::{BoxSlotHolder, SlotHolder};

/// The unguarded ring core (spec §4.2). Single-threaded by contract — callers
/// needing concurrent access reach for [`GuardedRing`] instead.
///
/// The cursor is generic over [`SharedCounter`] so the producer position can
/// be backed by something other than process-local memory — e.g. a
/// cross-process shared-memory integer — without touching the ring's logic.
/// [`Ring::new`] uses the in-process [`AtomicCounter`] default; callers with a
/// custom counter reach for [`Ring::with_counter`].
pub struct Ring<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>, C: SharedCounter = AtomicCounter> {
    slots: Vec<H>,
    mask: usize,
    ring_size: usize,
    cursor: C,
    _marker: std::marker::PhantomData<T>,
}

impl<T, H: SlotHolder<Input = T>> Ring<T, H, AtomicCounter> {
    pub fn new(config: RingConfig) -> Self {
        Self::with_counter(config, AtomicCounter::new(0))
    }
}

impl<T, H: SlotHolder<Input = T>, C: SharedCounter> Ring<T, H, C> {
    /// Builds a ring whose cursor is backed by a caller-supplied
    /// [`SharedCounter`] rather than the default in-process atomic — e.g. a
    /// shared-memory-backed counter for cross-process producers.
    pub fn with_counter(config: RingConfig, counter: C) -> Self {
        let ring_size = config.size();
        let mut slots = Vec::with_capacity(ring_size);
        slots.resize_with(ring_size, H::default);
        Ring { slots, mask: ring_size - 1, ring_size, cursor: counter, _marker: std::marker::PhantomData }
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    /// The sequence of the next write — the total count of puts since the
    /// last flush.
    pub fn cursor_position(&self) -> u64 {
        self.cursor.load()
    }

    /// Writes `value` at the next sequence, overwriting the oldest live
    /// sequence if the ring is full. Never fails.
    pub fn put(&mut self, value: T) -> u64 {
        let sequence = self.cursor.fetch_add_one();
        let index = (sequence as usize) & self.mask;
        self.slots[index].set(value);
        sequence
    }

    /// Looks up a sequence. Fails `SequenceNotFound` if not yet written,
    /// `SequenceOverwritten` if it has fallen out of the live window.
    pub fn get(&self, sequence: u64) -> Result<(u64, &H::Output)> {
        let cursor = self.cursor_position();
        if sequence >= cursor {
            return Err(CoreError::sequence_not_found(sequence));
        }
        let floor = cursor.saturating_sub(self.ring_size as u64);
        if sequence < floor {
            return Err(CoreError::sequence_overwritten(sequence));
        }
        let index = (sequence as usize) & self.mask;
        Ok((sequence, self.slots[index].get()))
    }

    /// The most recently written value. Fails `Empty` if nothing has been
    /// written yet.
    pub fn get_latest(&self) -> Result<(u64, &H::Output)> {
        let cursor = self.cursor_position();
        if cursor == 0 {
            return Err(CoreError::Empty);
        }
        self.get(cursor - 1)
    }

    /// Rebuilds every slot via `H::default()` and resets the cursor to zero.
    pub fn flush(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = H::default();
        }
        self.cursor.store(0);
    }
}

/// A wrapper around [`Ring`] that serializes every public operation behind a
/// reentrant mutex (spec §4.3, resolving the guarded-ring Open Question:
/// `get_latest` calls `get` internally, so the lock must tolerate re-entry
/// from the same thread).
pub struct GuardedRing<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    inner: ReentrantMutex<UnsafeCell<Ring<T, H>>>,
}

// SAFETY: all access to the `UnsafeCell` goes through the `ReentrantMutex`,
// which admits only one thread (possibly re-entering) at a time.
unsafe impl<T: Send, H: SlotHolder<Input = T> + Send> Send for GuardedRing<T, H> {}
unsafe impl<T: Send, H: SlotHolder<Input = T> + Send> Sync for GuardedRing<T, H> {}

impl<T, H: SlotHolder<Input = T>> GuardedRing<T, H> {
    pub fn new(config: RingConfig) -> Self {
        GuardedRing { inner: ReentrantMutex::new(UnsafeCell::new(Ring::new(config))) }
    }

    pub fn ring_size(&self) -> usize {
        let guard = self.inner.lock();
        // SAFETY: `guard` is held for the duration of this access.
        unsafe { (*guard.get()).ring_size() }
    }

    pub fn cursor_position(&self) -> u64 {
        let guard = self.inner.lock();
        unsafe { (*guard.get()).cursor_position() }
    }

    pub fn put(&self, value: T) -> u64 {
        let guard = self.inner.lock();
        unsafe { (*guard.get()).put(value) }
    }

    pub fn get(&self, sequence: u64) -> Result<(u64, H::Output)>
    where
        H::Output: Clone,
    {
        let guard = self.inner.lock();
        unsafe { (*guard.get()).get(sequence).map(|(s, v)| (s, v.clone())) }
    }

    pub fn get_latest(&self) -> Result<(u64, H::Output)>
    where
        H::Output: Clone,
    {
        let guard = self.inner.lock();
        unsafe { (*guard.get()).get_latest().map(|(s, v)| (s, v.clone())) }
    }

    pub fn flush(&self) {
        let guard = self.inner.lock();
        unsafe { (*guard.get()).flush() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(size: usize) -> Ring<i32> {
        Ring::new(RingConfig::new(size).unwrap())
    }

    #[test]
    fn put_returns_sequential_sequences() {
        let mut r = ring(4);
        for i in 0..5u64 {
            assert_eq!(r.put(i as i32), i);
        }
    }

    #[test]
    fn get_latest_is_empty_before_any_put() {
        let r = ring(4);
        assert_eq!(r.get_latest().unwrap_err(), CoreError::Empty);
    }

    #[test]
    fn liveness_window_tracks_ring_size_behind_cursor() {
        // Ring size 4, puts i^2 for i in 0..10.
        let mut r = ring(4);
        for i in 0..10u64 {
            let seq = r.put((i * i) as i32);
            assert_eq!(seq, i);
        }
        for i in 6..10u64 {
            let (s, v) = r.get(i).unwrap();
            assert_eq!(s, i);
            assert_eq!(*v, (i * i) as i32);
        }
        assert_eq!(r.get(5).unwrap_err(), CoreError::sequence_overwritten(5));
        assert_eq!(r.get(10).unwrap_err(), CoreError::sequence_not_found(10));
        let (s, v) = r.get_latest().unwrap();
        assert_eq!(s, 9);
        assert_eq!(*v, 81);
    }

    #[test]
    fn flush_resets_cursor_and_slots() {
        let mut r = ring(4);
        r.put(1);
        r.put(2);
        r.flush();
        assert_eq!(r.cursor_position(), 0);
        assert_eq!(r.get_latest().unwrap_err(), CoreError::Empty);
    }

    #[test]
    fn guarded_get_latest_reenters_lock() {
        let g: GuardedRing<i32> = GuardedRing::new(RingConfig::new(4).unwrap());
        g.put(7);
        let (s, v) = g.get_latest().unwrap();
        assert_eq!(s, 0);
        assert_eq!(v, 7);
    }

    #[test]
    fn custom_holder_returns_a_computed_value_distinct_from_its_input() {
        struct SumHolder {
            sum: i32,
        }
        impl Default for SumHolder {
            fn default() -> Self {
                SumHolder { sum: 0 }
            }
        }
        impl SlotHolder for SumHolder {
            type Input = Vec<i32>;
            type Output = i32;

            fn set(&mut self, value: Vec<i32>) {
                self.sum = value.iter().sum();
            }

            fn get(&self) -> &i32 {
                &self.sum
            }
        }
        let mut r: Ring<Vec<i32>, SumHolder> = Ring::new(RingConfig::new(4).unwrap());
        r.put(vec![3, 3, 3]);
        let (seq, sum) = r.get(0).unwrap();
        assert_eq!(seq, 0);
        assert_eq!(*sum, 9);
    }
}
