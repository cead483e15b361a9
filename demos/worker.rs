//! Illustrative worker process: one producer, two subscribers, printing
//! what each subscriber observes. Not part of the crate's public contract —
//! packaging and CLI concerns are out of scope for the library itself.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ringcore::{Disruptor, RingConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let disruptor: Arc<Disruptor<i32>> = Disruptor::new(RingConfig::new(8).unwrap());
    let workers: Vec<_> = (0..2)
        .map(|id| {
            let subscriber = disruptor.subscribe(false);
            thread::spawn(move || {
                for _ in 0..5 {
                    match subscriber.next(Duration::from_secs(1)) {
                        Ok((sequence, value)) => println!("subscriber {id} read {sequence} -> {value}"),
                        Err(err) => println!("subscriber {id} gave up: {err}"),
                    }
                }
            })
        })
        .collect();

    for i in 0..5 {
        disruptor.put(i * i, Duration::from_secs(1)).expect("producer should not be blocked");
    }

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }
}
