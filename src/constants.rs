//! Crate-wide defaults.

/// Default ring size used by `RingConfig::default()`.
pub const DEFAULT_RING_SIZE: usize = 1024;

/// Smallest ring size `RingConfig::new` accepts. A positive power of two is
/// all that's required, and `2^0 = 1` is one — a single-slot ring is
/// degenerate (every `put` immediately overwrites the previous one) but not
/// invalid, so this is 1, not 2.
pub const MIN_RING_SIZE: usize = 1;

/// Default timeout applied to blocking waits when a caller doesn't specify one.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 1000;
