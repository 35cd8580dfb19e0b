use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::mem;
use std::time::Duration;
use stringmatch::Needle;
use thirtyfour::error::WebDriverError;
use thirtyfour::fantoccini::error::CmdError;
use thirtyfour::{By, WebDriver, WebElement};

use crate::error::{JourneyError, JourneyResult};
use crate::poller::ElementPoller;
use crate::script::query_args;

/// Get String containing comma-separated list of strategies used.
fn get_selector_summary(selectors: &[ElementSelector]) -> String {
    let criteria: Vec<String> = selectors.iter().map(|s| s.strategy.describe()).collect();
    format!("[{}]", criteria.join(","))
}

/// Helper function to return the NoSuchElement error.
fn no_such_element(selectors: &[ElementSelector]) -> JourneyError {
    JourneyError::NoSuchElement(get_selector_summary(selectors))
}

/// True when a script threw inside the page. Stale scopes, dead sessions and
/// transport failures are not included.
fn raised_in_page(err: &WebDriverError) -> bool {
    matches!(err, WebDriverError::CmdError(CmdError::Standard(e)) if e.error() == "javascript error")
}

/// Function signature for element filters.
pub type ElementFilter =
    Box<dyn for<'e> Fn(&'e WebElement) -> BoxFuture<'e, bool> + Send + Sync>;

/// Box a closure as an [`ElementFilter`].
pub fn filter<F>(f: F) -> ElementFilter
where
    F: for<'e> Fn(&'e WebElement) -> BoxFuture<'e, bool> + Send + Sync + 'static,
{
    Box::new(f)
}

/// One way of finding an element.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Plain WebDriver locator.
    Locator(By),
    /// DOM query through injected JavaScript. The script gets the query scope
    /// (or `null`) as `arguments[0]`, followed by `args`, and returns an
    /// element, an array of elements, or `null`.
    Script {
        name: String,
        script: String,
        args: Vec<Value>,
    },
    /// Positional heuristic: the `n`-th element matched by a locator.
    Nth(By, usize),
}

impl Strategy {
    pub fn describe(&self) -> String {
        match self {
            Strategy::Locator(by) => by.to_string(),
            Strategy::Script { name, .. } => format!("script({})", name),
            Strategy::Nth(by, n) => format!("nth({}, {})", n, by),
        }
    }
}

/// An ElementSelector contains a strategy as well as zero or more filters.
/// The filters will be applied to any elements matched by the strategy.
/// Strategies and filters all run in full on every poll iteration.
pub struct ElementSelector {
    pub strategy: Strategy,
    pub filters: Vec<ElementFilter>,
}

impl ElementSelector {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            filters: Vec::new(),
        }
    }

    /// Add the specified filter to the list of filters for this selector.
    pub fn add_filter(&mut self, f: ElementFilter) {
        self.filters.push(f);
    }

    /// Run all filters for this selector on the specified WebElement vec.
    pub async fn run_filters(&self, mut elements: Vec<WebElement>) -> Vec<WebElement> {
        for func in &self.filters {
            let tmp_elements = mem::take(&mut elements);
            for element in tmp_elements {
                if func(&element).await {
                    elements.push(element);
                }
            }

            if elements.is_empty() {
                break;
            }
        }

        elements
    }
}

/// High-level interface for locating an element through several alternative
/// strategies, using a builder pattern.
///
/// # Example:
/// ```no_run
/// # use journey_query::prelude::*;
/// # use thirtyfour::{By, WebDriver};
/// # async fn run(driver: &WebDriver) -> JourneyResult<()> {
/// let field = driver
///     .locate(By::Css("input.datepicker"))
///     .and_displayed()
///     .or_script("calendar icon", journey_query::script::CALENDAR_ICON_INPUT, vec![])
///     .or_nth(By::Tag("input"), 2)
///     .first()
///     .await?;
/// field.click().await?;
/// # Ok(())
/// # }
/// ```
pub struct ElementQuery<'a> {
    driver: &'a WebDriver,
    scope: Option<&'a WebElement>,
    poller: ElementPoller,
    selectors: Vec<ElementSelector>,
}

impl<'a> ElementQuery<'a> {
    pub fn new(driver: &'a WebDriver, poller: ElementPoller, strategy: Strategy) -> Self {
        Self {
            driver,
            scope: None,
            poller,
            selectors: vec![ElementSelector::new(strategy)],
        }
    }

    /// Search below `scope` instead of the whole document. Script strategies
    /// receive the scope as `arguments[0]`.
    pub fn within(mut self, scope: &'a WebElement) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Use the specified ElementPoller for this ElementQuery.
    pub fn with_poller(mut self, poller: ElementPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Force this ElementQuery to wait for the specified timeout, polling once
    /// after each interval.
    pub fn wait(self, timeout: Duration, interval: Duration) -> Self {
        self.with_poller(ElementPoller::TimeoutWithInterval(timeout, interval))
    }

    /// Force this ElementQuery to make a single attempt.
    pub fn nowait(self) -> Self {
        self.with_poller(ElementPoller::NoWait)
    }

    fn add_selector(mut self, strategy: Strategy) -> Self {
        self.selectors.push(ElementSelector::new(strategy));
        self
    }

    /// Add a fallback locator. All filters specified after this call (up until
    /// the next `or*()` call) apply to this locator only.
    pub fn or(self, by: By) -> Self {
        self.add_selector(Strategy::Locator(by))
    }

    /// Add a fallback DOM query script.
    pub fn or_script<S>(self, name: S, script: &str, args: Vec<Value>) -> Self
    where
        S: Into<String>,
    {
        self.add_selector(Strategy::Script {
            name: name.into(),
            script: script.to_string(),
            args,
        })
    }

    /// Add a positional fallback: the `index`-th element matching `by`.
    pub fn or_nth(self, by: By, index: usize) -> Self {
        self.add_selector(Strategy::Nth(by, index))
    }

    /// Names of the strategies in this query, in the order they are tried.
    pub fn strategies(&self) -> Vec<String> {
        self.selectors.iter().map(|s| s.strategy.describe()).collect()
    }

    /// Return true if an element matches any strategy, otherwise false.
    /// This method will not wait.
    pub async fn exists(&self) -> JourneyResult<bool> {
        let elements = ElementPoller::NoWait.poll(|| self.attempt()).await?;
        Ok(elements.is_some())
    }

    /// Return only the first WebElement that matches any strategy (including
    /// all of the filters for that strategy).
    pub async fn first(&self) -> JourneyResult<WebElement> {
        match self.run_poller().await? {
            Some(mut elements) if !elements.is_empty() => Ok(elements.remove(0)),
            _ => Err(no_such_element(&self.selectors)),
        }
    }

    /// Like `first()`, but `Ok(None)` when nothing matched.
    pub async fn first_opt(&self) -> JourneyResult<Option<WebElement>> {
        match self.first().await {
            Ok(elem) => Ok(Some(elem)),
            Err(JourneyError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Scroll the first match into view and click it. `Ok(None)` when nothing matched.
    pub async fn click_first(&self) -> JourneyResult<Option<WebElement>> {
        match self.first_opt().await? {
            Some(elem) => {
                if let Err(e) = elem.scroll_into_view().await {
                    log::debug!("could not scroll to element: {}", e);
                }
                elem.click().await?;
                Ok(Some(elem))
            }
            None => Ok(None),
        }
    }

    /// Return all WebElements matched by the first strategy that matches.
    ///
    /// Returns an empty Vec if no elements match.
    pub async fn all(&self) -> JourneyResult<Vec<WebElement>> {
        Ok(self.run_poller().await?.unwrap_or_default())
    }

    /// Return all WebElements matched by the first strategy that matches.
    ///
    /// Returns Err(JourneyError::NoSuchElement) if no elements match.
    pub async fn all_required(&self) -> JourneyResult<Vec<WebElement>> {
        match self.run_poller().await? {
            Some(elements) if !elements.is_empty() => Ok(elements),
            _ => Err(no_such_element(&self.selectors)),
        }
    }

    async fn run_poller(&self) -> JourneyResult<Option<Vec<WebElement>>> {
        if self.selectors.is_empty() {
            return Err(no_such_element(&self.selectors));
        }
        self.poller.poll(|| self.attempt()).await
    }

    /// One poll iteration: every strategy once, in order.
    async fn attempt(&self) -> JourneyResult<Option<Vec<WebElement>>> {
        for selector in &self.selectors {
            let elements = self.fetch_elements_from_source(&selector.strategy).await?;
            if !elements.is_empty() {
                let elements = selector.run_filters(elements).await;
                if !elements.is_empty() {
                    log::debug!("matched {} using {}", elements.len(), selector.strategy.describe());
                    return Ok(Some(elements));
                }
            }
        }
        Ok(None)
    }

    async fn find_all(&self, by: By) -> JourneyResult<Vec<WebElement>> {
        let elements = match self.scope {
            Some(scope) => scope.find_all(by).await?,
            None => self.driver.find_all(by).await?,
        };
        Ok(elements)
    }

    /// Execute the specified strategy and return any matched WebElements.
    async fn fetch_elements_from_source(&self, strategy: &Strategy) -> JourneyResult<Vec<WebElement>> {
        match strategy {
            Strategy::Locator(by) => self.find_all(by.clone()).await,
            Strategy::Nth(by, index) => {
                let mut elements = self.find_all(by.clone()).await?;
                if *index < elements.len() {
                    Ok(vec![elements.swap_remove(*index)])
                } else {
                    Ok(Vec::new())
                }
            }
            Strategy::Script {
                name,
                script,
                args,
            } => {
                let scope = match self.scope {
                    Some(scope) => Some(scope.to_json()?),
                    None => None,
                };
                let ret = match self.driver.execute(script.as_str(), query_args(scope, args)).await {
                    Ok(ret) => ret,
                    Err(e) if raised_in_page(&e) => {
                        log::debug!("script({}) raised in page: {}", name, e);
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(e.into()),
                };
                let value = ret.json();
                if value.is_null() {
                    Ok(Vec::new())
                } else if value.is_array() {
                    Ok(ret.elements()?)
                } else {
                    Ok(vec![ret.element()?])
                }
            }
        }
    }

    /// Add the specified ElementFilter to the last strategy.
    pub fn with_filter(mut self, f: ElementFilter) -> Self {
        if let Some(selector) = self.selectors.last_mut() {
            selector.add_filter(f);
        }
        self
    }

    /// Only match elements that are displayed.
    pub fn and_displayed(self) -> Self {
        self.with_filter(filter(|elem| {
            async move { elem.is_displayed().await.unwrap_or(false) }.boxed()
        }))
    }

    /// Only match elements that are enabled.
    pub fn and_enabled(self) -> Self {
        self.with_filter(filter(|elem| {
            async move { elem.is_enabled().await.unwrap_or(false) }.boxed()
        }))
    }

    /// Only match elements that are displayed and enabled.
    pub fn and_clickable(self) -> Self {
        self.with_filter(filter(|elem| {
            async move { elem.is_clickable().await.unwrap_or(false) }.boxed()
        }))
    }

    /// Only match elements that have the specified text.
    /// See the `Needle` documentation for more details on text matching rules.
    pub fn with_text<N>(self, text: N) -> Self
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        self.with_filter(filter(move |elem| {
            let text = text.clone();
            async move {
                match elem.text().await {
                    Ok(x) => text.is_match(x.trim()),
                    _ => false,
                }
            }
            .boxed()
        }))
    }

    /// Only match elements that have the specified class name.
    pub fn with_class<N>(self, class_name: N) -> Self
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        self.with_filter(filter(move |elem| {
            let class_name = class_name.clone();
            async move {
                match elem.class_name().await {
                    Ok(Some(x)) => class_name.is_match(&x),
                    _ => false,
                }
            }
            .boxed()
        }))
    }

    /// Only match elements that have the specified value.
    pub fn with_value<N>(self, value: N) -> Self
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        self.with_filter(filter(move |elem| {
            let value = value.clone();
            async move {
                match elem.value().await {
                    Ok(Some(x)) => value.is_match(&x),
                    _ => false,
                }
            }
            .boxed()
        }))
    }

    /// Only match elements that have the specified attribute with the specified value.
    pub fn with_attribute<N>(self, attribute_name: &str, value: N) -> Self
    where
        N: Needle + Clone + Send + Sync + 'static,
    {
        let attribute_name = attribute_name.to_string();
        self.with_filter(filter(move |elem| {
            let attribute_name = attribute_name.clone();
            let value = value.clone();
            async move {
                match elem.attr(&attribute_name).await {
                    Ok(Some(x)) => value.is_match(&x),
                    _ => false,
                }
            }
            .boxed()
        }))
    }
}

/// Trait for enabling the ElementQuery interface on a driver.
pub trait Locate {
    /// Start a query with a locator strategy.
    fn locate(&self, by: By) -> ElementQuery<'_>;

    /// Start a query with a script strategy.
    fn locate_script<S>(&self, name: S, script: &str, args: Vec<Value>) -> ElementQuery<'_>
    where
        S: Into<String>;
}

impl Locate for WebDriver {
    fn locate(&self, by: By) -> ElementQuery<'_> {
        ElementQuery::new(self, ElementPoller::default(), Strategy::Locator(by))
    }

    fn locate_script<S>(&self, name: S, script: &str, args: Vec<Value>) -> ElementQuery<'_>
    where
        S: Into<String>,
    {
        ElementQuery::new(
            self,
            ElementPoller::default(),
            Strategy::Script {
                name: name.into(),
                script: script.to_string(),
                args,
            },
        )
    }
}
