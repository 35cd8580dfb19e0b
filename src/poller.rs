use futures::Future;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::error::JourneyResult;

/// Parameters used to determine the polling / timeout behaviour.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ElementPoller {
    /// No polling, single attempt.
    NoWait,
    /// Poll up to the specified timeout, with the specified interval being the
    /// minimum time elapsed between the start of each poll attempt.
    /// If the previous poll attempt took longer than the interval, the next will
    /// start immediately. Once the timeout is reached, polling stops regardless
    /// of the actual number of polling attempts completed.
    TimeoutWithInterval(Duration, Duration),
    /// Poll once every interval, up to the maximum number of polling attempts.
    /// If the previous poll attempt took longer than the interval, the next will
    /// start immediately. However, in the case that nothing matches, you will be
    /// guaranteed the specified number of polling attempts, regardless of how
    /// long it takes.
    NumTriesWithInterval(u32, Duration),
    /// Poll once every interval, up to the specified timeout, or the specified
    /// minimum number of polling attempts, whichever comes last.
    TimeoutWithIntervalAndMinTries(Duration, Duration, u32),
}

impl Default for ElementPoller {
    fn default() -> Self {
        ElementPoller::TimeoutWithInterval(Duration::from_secs(10), Duration::from_millis(500))
    }
}

impl ElementPoller {
    fn options(&self) -> (Option<Duration>, Option<Duration>, u32) {
        match *self {
            ElementPoller::NoWait => (None, None, 0),
            ElementPoller::TimeoutWithInterval(timeout, interval) => {
                (Some(timeout), Some(interval), 0)
            }
            ElementPoller::NumTriesWithInterval(max_tries, interval) => {
                (None, Some(interval), max_tries)
            }
            ElementPoller::TimeoutWithIntervalAndMinTries(timeout, interval, min_tries) => {
                (Some(timeout), Some(interval), min_tries)
            }
        }
    }

    /// Run `attempt` until it yields a value or this poller gives up.
    ///
    /// Returns `Ok(None)` once the poller is exhausted. Any error from `attempt`
    /// is returned immediately; callers that want to tolerate errors should turn
    /// them into `Ok(None)` themselves.
    pub async fn poll<T, F, Fut>(&self, mut attempt: F) -> JourneyResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = JourneyResult<Option<T>>>,
    {
        let (timeout, interval, min_tries) = self.options();
        let mut tries = 0;

        let start = Instant::now();
        loop {
            tries += 1;

            if let Some(value) = attempt().await? {
                return Ok(Some(value));
            }

            match timeout {
                Some(t) if start.elapsed() >= t && tries >= min_tries => return Ok(None),
                None if tries >= min_tries => return Ok(None),
                _ => {}
            }

            if let Some(i) = interval {
                // Next poll is due no earlier than this long after the first poll started.
                let minimum_elapsed = i * tries;

                // But this much time has elapsed since the first poll started.
                let actual_elapsed = start.elapsed();

                if actual_elapsed < minimum_elapsed {
                    // So we need to wait this much longer.
                    sleep(minimum_elapsed - actual_elapsed).await;
                }
            }
        }
    }
}
