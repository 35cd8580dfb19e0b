//! Fallback chains: an action with an ordered list of named strategies.
//!
//! Each strategy is an async attempt that yields `Ok(Some(value))` when it did
//! the job, `Ok(None)` when it did not apply, or an error. Errors from a single
//! strategy are logged and treated like `Ok(None)` so that the next strategy
//! still gets its turn.

use futures::future::{BoxFuture, FutureExt};
use futures::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{JourneyError, JourneyResult};
use crate::poller::ElementPoller;

type Attempt<'a, T> = Box<dyn Fn() -> BoxFuture<'a, JourneyResult<Option<T>>> + Send + Sync + 'a>;

/// The strategy that succeeded and what it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub strategy: String,
    pub value: T,
}

pub struct FallbackChain<'a, T> {
    action: String,
    poller: ElementPoller,
    settle: Option<Duration>,
    strategies: Vec<(String, Attempt<'a, T>)>,
}

impl<'a, T> FallbackChain<'a, T>
where
    T: Send + 'a,
{
    /// `action` reads as the object of "could not ...", e.g. "open the calendar".
    pub fn new<S>(action: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            action: action.into(),
            poller: ElementPoller::NoWait,
            settle: None,
            strategies: Vec::new(),
        }
    }

    /// Retry the whole chain with this poller. Defaults to a single pass.
    pub fn with_poller(mut self, poller: ElementPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Pause for `delay` after a strategy succeeds, letting widget animations finish.
    pub fn settle(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }

    /// Append a strategy.
    pub fn or<S, F, Fut>(mut self, name: S, attempt: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> Fut + Send + Sync + 'a,
        Fut: Future<Output = JourneyResult<Option<T>>> + Send + 'a,
    {
        let boxed: Attempt<'a, T> = Box::new(move || attempt().boxed());
        self.strategies.push((name.into(), boxed));
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Strategy names, in the order they are tried.
    pub fn strategies(&self) -> Vec<String> {
        self.strategies.iter().map(|(name, _)| name.clone()).collect()
    }

    fn exhausted(&self) -> JourneyError {
        JourneyError::Exhausted {
            action: self.action.clone(),
            strategies: self.strategies(),
        }
    }

    /// One pass over every strategy.
    async fn attempt(&self) -> JourneyResult<Option<Resolved<T>>> {
        for (name, attempt) in &self.strategies {
            log::debug!("{}: trying {}", self.action, name);
            match attempt().await {
                Ok(Some(value)) => {
                    return Ok(Some(Resolved {
                        strategy: name.clone(),
                        value,
                    }));
                }
                Ok(None) => log::debug!("{}: {} did not apply", self.action, name),
                Err(e) => log::warn!("{}: {} failed: {}", self.action, name, e),
            }
        }
        Ok(None)
    }

    /// Try every strategy in order until one succeeds.
    pub async fn run(&self) -> JourneyResult<Resolved<T>> {
        if self.strategies.is_empty() {
            return Err(self.exhausted());
        }

        match self.poller.poll(|| self.attempt()).await? {
            Some(resolved) => {
                log::info!("{} using {}", self.action, resolved.strategy);
                if let Some(delay) = self.settle {
                    sleep(delay).await;
                }
                Ok(resolved)
            }
            None => {
                let err = self.exhausted();
                log::warn!("{}", err);
                Err(err)
            }
        }
    }
}
