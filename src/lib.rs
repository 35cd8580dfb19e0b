//! Journey_query drives the journey search form of a bus-ticket booking site
//! through `thirtyfour`, with fallback chains that keep working when a widget
//! is slow, renders differently, or is missing an expected hook.
//!
//! ## Element queries
//!
//! Every lookup can name alternative strategies. Each strategy is tried once per
//! poll iteration, in order, and the first one to match wins:
//!
//! ```no_run
//! # use journey_query::prelude::*;
//! # use thirtyfour::By;
//! # async fn run(driver: &thirtyfour::WebDriver) -> JourneyResult<()> {
//! let field = driver
//!     .locate(By::Css("input.datepicker"))
//!     .and_displayed()
//!     .or_script("date placeholder", journey_query::script::SLASH_PLACEHOLDER_INPUT, vec![])
//!     .or_nth(By::Tag("input"), 2)
//!     .first()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Strategies come in three kinds: plain locators, DOM queries through injected
//! scripts, and positional heuristics. Filters such as `and_displayed()` apply to
//! the strategy added just before them.
//!
//! ## Fallback chains
//!
//! Interactions that need more than a lookup (open the calendar, pick a city)
//! are built as a [`FallbackChain`] of named strategies. The chain logs every
//! miss and reports which strategy finally did the job, or fails with
//! [`JourneyError::Exhausted`] listing everything it tried.
//!
//! ## Journey search
//!
//! ```no_run
//! # use journey_query::prelude::*;
//! # async fn run() -> JourneyResult<()> {
//! let config = SuiteConfig::from_env()?;
//! let driver = config.connect().await?;
//! let home = HomePage::new(&driver, config.base_url(), config.timing());
//! let search = JourneySearch::new("ZONGULDAK", "DÜZCE", "20/03/2025".parse()?);
//! let report = home.search_journey(&search).await?;
//! assert!(report.results_visible);
//! # Ok(())
//! # }
//! ```
//!
//! Set `RUST_LOG=journey_query=debug` to see every strategy attempt.

pub mod chain;
pub mod config;
pub mod datepicker;
pub mod dropdown;
pub mod error;
pub mod login;
pub mod page;
pub mod poller;
pub mod query;
pub mod script;
pub mod waiter;

pub use chain::{FallbackChain, Resolved};
pub use error::{JourneyError, JourneyResult};

pub mod prelude {
    pub use crate::chain::{FallbackChain, Resolved};
    pub use crate::config::{SuiteConfig, Timing};
    pub use crate::datepicker::{CalendarHeader, DatePicker, DateSelection, TravelDate};
    pub use crate::dropdown::{CityField, CityPicker, CitySelection};
    pub use crate::error::{JourneyError, JourneyResult};
    pub use crate::login::LoginPage;
    pub use crate::page::{HomePage, JourneySearch, PageObject, SearchReport};
    pub use crate::poller::ElementPoller;
    pub use crate::query::{ElementQuery, Locate, Strategy};
    pub use crate::waiter::{ElementWaitable, ElementWaiter};
}
