use futures::future::{BoxFuture, FutureExt};
use std::time::Duration;
use thirtyfour::error::WebDriverResult;
use thirtyfour::WebElement;

use crate::error::{JourneyError, JourneyResult};
use crate::poller::ElementPoller;

/// Function signature for element wait conditions.
pub type ElementPredicate =
    Box<dyn for<'e> Fn(&'e WebElement) -> BoxFuture<'e, WebDriverResult<bool>> + Send + Sync>;

/// Box a closure as an [`ElementPredicate`].
pub fn predicate<F>(f: F) -> ElementPredicate
where
    F: for<'e> Fn(&'e WebElement) -> BoxFuture<'e, WebDriverResult<bool>> + Send + Sync + 'static,
{
    Box::new(f)
}

pub struct ElementWaiter<'a> {
    element: &'a WebElement,
    poller: ElementPoller,
    inverted: bool,
    message: String,
}

impl<'a> ElementWaiter<'a> {
    fn new<S>(element: &'a WebElement, poller: ElementPoller, message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            element,
            poller,
            inverted: false,
            message: message.into(),
        }
    }

    /// Use the specified ElementPoller for this ElementWaiter.
    pub fn with_poller(mut self, poller: ElementPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Force this ElementWaiter to wait for the specified timeout, polling once
    /// after each interval.
    pub fn wait(self, timeout: Duration, interval: Duration) -> Self {
        self.with_poller(ElementPoller::TimeoutWithInterval(timeout, interval))
    }

    pub fn until(self) -> ElementWaitCondition<'a> {
        ElementWaitCondition {
            waiter: self,
        }
    }

    pub fn until_not(mut self) -> ElementWaitCondition<'a> {
        self.inverted = true;
        ElementWaitCondition {
            waiter: self,
        }
    }

    fn check(&self, value: bool) -> bool {
        if self.inverted {
            !value
        } else {
            value
        }
    }

    async fn run_poller(&self, f: ElementPredicate) -> JourneyResult<bool> {
        let element = self.element;
        let f = &f;
        let matched = self
            .poller
            .poll(|| async move {
                let value = f(element).await?;
                Ok(if self.check(value) { Some(()) } else { None })
            })
            .await?;
        Ok(matched.is_some())
    }
}

pub struct ElementWaitCondition<'a> {
    waiter: ElementWaiter<'a>,
}

impl<'a> ElementWaitCondition<'a> {
    fn timeout(self) -> JourneyResult<()> {
        Err(JourneyError::Timeout(self.waiter.message))
    }

    async fn run(self, f: ElementPredicate) -> JourneyResult<()> {
        match self.waiter.run_poller(f).await? {
            true => Ok(()),
            false => self.timeout(),
        }
    }

    pub async fn stale(self) -> JourneyResult<()> {
        self.run(predicate(|elem| async move { elem.is_present().await.map(|x| !x) }.boxed()))
            .await
    }

    pub async fn displayed(self) -> JourneyResult<()> {
        self.run(predicate(|elem| async move { elem.is_displayed().await }.boxed())).await
    }

    /// Hidden or gone from the page. Unlike `until_not().displayed()`, a stale
    /// element counts as hidden instead of failing the wait.
    pub async fn hidden(self) -> JourneyResult<()> {
        self.run(predicate(|elem| {
            async move {
                match elem.is_displayed().await {
                    Ok(displayed) => Ok(!displayed),
                    Err(_) => Ok(true),
                }
            }
            .boxed()
        }))
        .await
    }

    pub async fn enabled(self) -> JourneyResult<()> {
        self.run(predicate(|elem| async move { elem.is_enabled().await }.boxed())).await
    }

    pub async fn clickable(self) -> JourneyResult<()> {
        self.run(predicate(|elem| async move { elem.is_clickable().await }.boxed())).await
    }

    pub async fn condition(self, f: ElementPredicate) -> JourneyResult<()> {
        self.run(f).await
    }
}

/// Trait for enabling the ElementWaiter interface.
pub trait ElementWaitable {
    fn waiter<S>(&self, message: S) -> ElementWaiter<'_>
    where
        S: Into<String>;
}

impl ElementWaitable for WebElement {
    /// Return an ElementWaiter for this element using the default poller.
    fn waiter<S>(&self, message: S) -> ElementWaiter<'_>
    where
        S: Into<String>,
    {
        ElementWaiter::new(self, ElementPoller::default(), message)
    }
}

#[cfg(test)]
/// This function checks if the public async methods implement Send. It is not intended to be executed.
async fn _test_is_send() -> JourneyResult<()> {
    use thirtyfour::prelude::*;

    // Helper methods
    fn is_send_val<T: Send>(_val: &T) {}

    // Pre values
    let caps = DesiredCapabilities::chrome();
    let driver = WebDriver::new("http://localhost:4444", caps).await?;
    let elem = driver.find(By::Tag("body")).await?;

    // ElementWaitCondition
    is_send_val(&elem.waiter("Some error").until().stale());
    is_send_val(&elem.waiter("Some error").until().displayed());
    is_send_val(&elem.waiter("Some error").until_not().hidden());
    is_send_val(&elem.waiter("Some error").until().enabled());
    is_send_val(&elem.waiter("Some error").until().clickable());

    Ok(())
}
