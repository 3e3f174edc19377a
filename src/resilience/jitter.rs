//! Decorrelated jitter backoff.
//!
//! `next = min(max, max(seed, previous * 3 * uniform(0, 1)))`, starting from
//! `previous = seed`. Values stay within `[seed, max]` and are deliberately not
//! monotonic, so concurrent callers do not retry in lockstep.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of retry delay sequences.
pub trait Jitter: Send + Sync {
    /// A finite sequence of `max_attempts` delays.
    ///
    /// Every call draws fresh random values.
    fn sequence(
        &self,
        max_attempts: u32,
        seed_delay: Duration,
        max_delay: Duration,
    ) -> Box<dyn Iterator<Item = Duration> + Send>;
}

/// One decorrelated-jitter step. `sample` is a uniform draw from `[0, 1)`.
pub fn decorrelated_step(previous: Duration, seed: Duration, max: Duration, sample: f64) -> Duration {
    let grown = previous.as_secs_f64() * 3.0 * sample;
    let lower = seed.as_secs_f64().max(grown);
    let bounded = max.as_secs_f64().min(lower);
    // Guard the float round trip so the bounds hold exactly.
    Duration::from_secs_f64(bounded).clamp(seed.min(max), max)
}

/// Lazily produced delays for one call.
pub struct JitterSequence {
    rng: StdRng,
    remaining: u32,
    seed: Duration,
    max: Duration,
    current: Duration,
}

impl JitterSequence {
    pub fn new(max_attempts: u32, seed: Duration, max: Duration) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            remaining: max_attempts,
            seed,
            max,
            current: seed,
        }
    }
}

impl Iterator for JitterSequence {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let sample: f64 = self.rng.gen();
        self.current = decorrelated_step(self.current, self.seed, self.max, sample);
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

/// The default jitter source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecorrelatedJitter;

impl Jitter for DecorrelatedJitter {
    fn sequence(
        &self,
        max_attempts: u32,
        seed_delay: Duration,
        max_delay: Duration,
    ) -> Box<dyn Iterator<Item = Duration> + Send> {
        Box::new(JitterSequence::new(max_attempts, seed_delay, max_delay))
    }
}
