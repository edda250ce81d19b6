use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::warn;

use crate::constants::{POST_ATTEMPTS, RETRY_DELAY_UNIT};

/// Function used to wait between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Fixed-budget retry with a linear backoff.
///
/// After failed attempt `n` the policy sleeps `n * delay_unit`. The error of
/// the final attempt is returned unchanged.
#[derive(Clone)]
pub struct RetryPolicy {
    attempts: usize,
    delay_unit: Duration,
    sleeper: Sleeper,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(POST_ATTEMPTS, RETRY_DELAY_UNIT)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("attempts", &self.attempts)
            .field("delay_unit", &self.delay_unit)
            .finish()
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay_unit: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            delay_unit,
            sleeper: Arc::new(thread::sleep),
        }
    }

    /// Replace the sleep function, e.g. to record delays instead of waiting.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => {
                    let delay = self.delay_unit * attempt as u32;
                    warn!("Error on attempt {}, retrying in {:?}: {:#}", attempt, delay, e);
                    (self.sleeper)(delay);
                    attempt += 1;
                }
            }
        }
    }
}
