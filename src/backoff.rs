//! # Search Retry Backoff
//!
//! The site throttles rapid repeated searches, so the search-box path backs
//! off between attempts. The schedule is an infinite, cyclically repeating
//! sequence of delays; it is exposed as a pure function of the attempt index
//! rather than a stateful iterator, so it can be consulted any number of
//! times and restarted freely.
//!
//! Sleeping itself sits behind the small [`Sleep`] trait so the retry loop
//! can be exercised in tests without real delays.

use std::thread;
use std::time::Duration;

/// Backoff delays in seconds, strictly increasing within one cycle.
pub const DELAYS_SECS: [u64; 8] = [2, 4, 8, 12, 20, 32, 48, 64];

/// Delay to apply after the given zero-based timeout attempt, in seconds.
/// Wraps cyclically once the table is exhausted.
pub fn delay_secs(attempt: usize) -> u64 {
    DELAYS_SECS[attempt % DELAYS_SECS.len()]
}

/// Blocking sleep, injectable for tests.
pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// Production sleeper backed by `std::thread::sleep`.
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_follow_the_table() {
        for (i, &expected) in DELAYS_SECS.iter().enumerate() {
            assert_eq!(delay_secs(i), expected);
        }
    }

    #[test]
    fn delays_wrap_cyclically() {
        assert_eq!(delay_secs(8), 2);
        assert_eq!(delay_secs(9), 4);
        assert_eq!(delay_secs(17), 4);
        assert_eq!(delay_secs(80), 2);
    }

    #[test]
    fn delays_increase_within_one_cycle() {
        for pair in DELAYS_SECS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
