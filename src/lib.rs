//! Bounded, sequence-numbered ring buffers and a single-producer/
//! multi-consumer disruptor dispatch core, modeled on the LMAX Disruptor
//! pattern.
//!
//! The family, from simplest to most capable:
//!
//! - [`ring::Ring`] — unguarded random-access core: `put`/`get`/
//!   `get_latest`/`flush` over a fixed power-of-two slot array.
//! - [`ring::GuardedRing`] — the same core behind a reentrant mutex, safe
//!   for concurrent callers.
//! - [`bounded::BoundedSequenced`] / [`bounded::BoundedSequencedGuarded`] —
//!   sequenced access with a single shared read cursor; refuses instead of
//!   blocking when the producer would overrun the reader.
//! - [`bounded::WaitingBounded`] — the same, but blocks with a timeout
//!   instead of refusing immediately.
//! - [`disruptor::Disruptor`] — one producer, any number of independent
//!   subscribers, each progressing at its own rate.

pub mod barrier;
pub mod bounded;
pub mod config;
pub mod constants;
pub mod counter;
pub mod disruptor;
pub mod error;
pub mod ring;
pub mod slot;

pub use bounded::{BoundedSequenced, BoundedSequencedGuarded, WaitingBounded};
pub use config::RingConfig;
pub use counter::{AtomicCounter, SharedCounter};
pub use disruptor::{Disruptor, Subscriber};
pub use error::{CoreError, Result};
pub use ring::{GuardedRing, Ring};
pub use slot::{BoxSlotHolder, SlotHolder};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn end_to_end_disruptor_smoke_test() {
        let disruptor: std::sync::Arc<Disruptor<i32>> = Disruptor::new(RingConfig::new(4).unwrap());
        let subscriber = disruptor.subscribe(false);
        disruptor.put(7, Duration::from_millis(50)).unwrap();
        let (sequence, value) = subscriber.next(Duration::from_millis(50)).unwrap();
        assert_eq!(sequence, 0);
        assert_eq!(value, 7);
    }
}
