//! Bounded retrying for individual downloads.
use backoff::backoff::Backoff as BackoffTrait;
use backoff::ExponentialBackoff;
use std::time::Duration;

/// How a single download is retried after a transient failure.  The default performs no
/// retries at all: each URL gets exactly one attempt.
#[derive(Debug, Clone)]
pub struct Retry {
    /// Number of retries (not counting the first try) for transient errors. (default 0)
    pub retries: u32,

    /// Maximum interval between retries (default 30s)
    pub max_delay: Duration,

    /// Delay before the first retry; each later retry doubles it. (default 500ms)
    pub delay_factor: Duration,

    /// Jitter applied to each delay, as a fraction of that delay. (default 0.25)
    pub randomization_factor: f64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            retries: 0,
            max_delay: Duration::from_secs(30),
            delay_factor: Duration::from_millis(500),
            randomization_factor: 0.25,
        }
    }
}

impl Retry {
    /// A retry configuration with the given number of retries and default delays.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }
}

/// Backoff tracker for one download.  Wraps [backoff::ExponentialBackoff] but counts
/// attempts instead of elapsed time.  A fresh tracker is made for each URL, so retries used
/// by one file never reduce those of the next; with the default [Retry] the first call to
/// [Backoff::next_backoff] already returns None.
#[derive(Debug)]
pub struct Backoff<'a> {
    retry: &'a Retry,
    tries: u32,
    backoff: ExponentialBackoff,
}

impl<'a> Backoff<'a> {
    pub fn new(retry: &'a Retry) -> Backoff<'a> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: None,
            max_interval: retry.max_delay,
            initial_interval: retry.delay_factor,
            multiplier: 2.0,
            #[cfg(not(test))]
            randomization_factor: retry.randomization_factor,
            #[cfg(test)]
            randomization_factor: 0.0,
            ..Default::default()
        };
        backoff.reset();
        Backoff {
            retry,
            tries: 0,
            backoff,
        }
    }

    /// Return how long to wait before the next attempt, or None once the retries are used up.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        self.tries += 1;
        if self.tries > self.retry.retries {
            None
        } else {
            self.backoff.next_backoff()
        }
    }
}
