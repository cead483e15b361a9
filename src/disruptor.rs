//! Single-producer, multi-subscriber dispatch core (spec §4.5).
//!
//! Unlike [`crate::bounded::WaitingBounded`], each subscriber progresses at
//! its own rate: the producer must not advance past the *slowest*
//! registered subscriber by more than `ring_size`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::barrier::Barrier;
use crate::config::RingConfig;
use crate::error::{CoreError, Result};
use crate::ring::Ring;
use crate::slot::{BoxSlotHolder, SlotHolder};

struct SubscriberState {
    id: u64,
    read_cursor: u64,
    data_available: Arc<Barrier>,
    space_available: Arc<Barrier>,
}

struct DisruptorState<T, H: SlotHolder<Input = T>> {
    ring: Ring<T, H>,
    subscribers: Vec<SubscriberState>,
}

/// One producer, N independent subscribers, coordinated by the ring's
/// cursor and per-subscriber barriers.
///
/// Direct random access (`get`/`get_latest`) is not part of this type's
/// contract and always fails with [`CoreError::OperationNotAllowed`] —
/// dispatch happens exclusively through [`Disruptor::subscribe`] and
/// [`Subscriber::next`].
pub struct Disruptor<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    state: Mutex<DisruptorState<T, H>>,
    next_id: AtomicU64,
}

impl<T, H: SlotHolder<Input = T>> Disruptor<T, H> {
    pub fn new(config: RingConfig) -> Arc<Self> {
        Arc::new(Disruptor {
            state: Mutex::new(DisruptorState { ring: Ring::new(config), subscribers: Vec::new() }),
            next_id: AtomicU64::new(0),
        })
    }

    /// Registers a new subscriber. If `start_at_latest`, it begins reading
    /// from the current cursor position; otherwise from sequence 0 — which,
    /// on a ring that has already wrapped, means its first `next()` observes
    /// whatever has fallen out of the live window as `SequenceOverwritten`.
    /// This is intended: callers who care must pass `start_at_latest = true`.
    pub fn subscribe(self: &Arc<Self>, start_at_latest: bool) -> Subscriber<T, H> {
        let mut state = self.state.lock();
        let read_cursor = if start_at_latest { state.ring.cursor_position() } else { 0 };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let data_available = Arc::new(Barrier::new());
        let space_available = Arc::new(Barrier::new());
        state.subscribers.push(SubscriberState {
            id,
            read_cursor,
            data_available: data_available.clone(),
            space_available: space_available.clone(),
        });
        tracing::debug!(subscriber_id = id, read_cursor, "subscriber registered");
        Subscriber { id, disruptor: self.clone(), data_available, space_available }
    }

    /// Writes `value`, blocking up to `timeout` while any registered
    /// subscriber trails by a full `ring_size`.
    pub fn put(&self, value: T, timeout: Duration) -> Result<u64> {
        loop {
            let mut state = self.state.lock();
            let cursor = state.ring.cursor_position();
            let ring_size = state.ring.ring_size() as u64;
            let blocker = state
                .subscribers
                .iter()
                .find(|s| cursor - s.read_cursor == ring_size)
                .map(|s| s.space_available.clone());

            if let Some(barrier) = blocker {
                barrier.clear();
                drop(state);
                tracing::debug!("producer blocked on lagging subscriber");
                if !barrier.wait(timeout) {
                    return Err(CoreError::ReadCursorBlocked);
                }
                // Re-evaluate from scratch: the blocking subscriber may have
                // unregistered, or another may now be the slowest.
                continue;
            }

            let sequence = state.ring.put(value);
            for sub in state.subscribers.iter() {
                if sub.read_cursor == sequence {
                    sub.data_available.signal();
                }
            }
            return Ok(sequence);
        }
    }

    /// Always fails: direct random access is not part of the disruptor's contract.
    pub fn get(&self, _sequence: u64) -> Result<(u64, H::Output)> {
        Err(CoreError::operation_not_allowed("get"))
    }

    /// Always fails: direct random access is not part of the disruptor's contract.
    pub fn get_latest(&self) -> Result<(u64, H::Output)> {
        Err(CoreError::operation_not_allowed("get_latest"))
    }

    fn unregister(&self, id: u64) {
        let mut state = self.state.lock();
        state.subscribers.retain(|s| s.id != id);
        tracing::debug!(subscriber_id = id, "subscriber unregistered");
    }
}

/// A registered reader. Holds a shared handle to its disruptor rather than a
/// back-reference the disruptor must track, so there is no reference cycle
/// to break: the disruptor's registry stores only plain cursor/barrier
/// state, keyed by id.
pub struct Subscriber<T, H: SlotHolder<Input = T> = BoxSlotHolder<T>> {
    id: u64,
    disruptor: Arc<Disruptor<T, H>>,
    data_available: Arc<Barrier>,
    space_available: Arc<Barrier>,
}

impl<T, H: SlotHolder<Input = T>> Subscriber<T, H> {
    /// Reads the next sequence for this subscriber, blocking up to `timeout`
    /// if the producer hasn't written it yet.
    pub fn next(&self, timeout: Duration) -> Result<(u64, H::Output)>
    where
        H::Output: Clone,
    {
        loop {
            let mut state = self.disruptor.state.lock();
            let read_cursor = match state.subscribers.iter().find(|s| s.id == self.id) {
                Some(sub) => sub.read_cursor,
                None => return Err(CoreError::operation_not_allowed("next on unregistered subscriber")),
            };

            let get_result = state.ring.get(read_cursor).map(|(s, v)| (s, v.clone()));
            match get_result {
                Ok((sequence, value)) => {
                    if let Some(sub) = state.subscribers.iter_mut().find(|s| s.id == self.id) {
                        sub.read_cursor += 1;
                    }
                    drop(state);
                    self.space_available.signal();
                    return Ok((sequence, value));
                }
                Err(CoreError::SequenceNotFound { .. }) => {
                    self.data_available.clear();
                    drop(state);
                    if !self.data_available.wait(timeout) {
                        return Err(CoreError::sequence_not_found(read_cursor));
                    }
                    // Re-attempt the read now that we've been woken.
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Removes this subscriber from its disruptor's registry and wakes any
    /// producer parked waiting on it.
    pub fn unregister(&self) {
        self.disruptor.unregister(self.id);
        self.space_available.signal();
    }
}
