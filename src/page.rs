//! Page objects for the booking site.

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::{By, WebDriver};

use crate::chain::FallbackChain;
use crate::config::Timing;
use crate::datepicker::{DatePicker, DateSelection, TravelDate};
use crate::dropdown::{CityField, CityPicker, CitySelection};
use crate::error::{JourneyError, JourneyResult};
use crate::login::LoginPage;
use crate::query::Locate;
use crate::script;

const COOKIE_ACCEPT_LABEL: &str = "Kabul Et";
const SEARCH_LABEL: &str = "Sorgula";
const LOGIN_LINK_TEXT: &str = "Giriş";

/// URL fragments that mean the results page is showing.
const RESULT_URL_HINTS: [&str; 3] = ["search", "sefer", "arama"];

/// Common behaviour of the page objects.
#[async_trait]
pub trait PageObject: Send + Sync {
    fn driver(&self) -> &WebDriver;

    /// Absolute URL of this page.
    fn url(&self) -> String;

    /// Navigate to this page and get it ready for interaction.
    async fn open(&self) -> JourneyResult<()>;

    async fn title(&self) -> JourneyResult<String> {
        Ok(self.driver().title().await?)
    }

    async fn current_url(&self) -> JourneyResult<String> {
        Ok(self.driver().current_url().await?.to_string())
    }
}

/// One journey search.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneySearch {
    pub departure: String,
    pub arrival: String,
    pub date: TravelDate,
}

impl JourneySearch {
    pub fn new<S>(departure: S, arrival: S, date: TravelDate) -> Self
    where
        S: Into<String>,
    {
        Self {
            departure: departure.into(),
            arrival: arrival.into(),
            date,
        }
    }
}

/// What each step of a journey search did.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub cookie_dismissed: bool,
    pub departure: CitySelection,
    pub arrival: CitySelection,
    pub date: DateSelection,
    pub search_strategy: String,
    pub results_visible: bool,
}

/// The homepage with the journey search form.
pub struct HomePage<'a> {
    driver: &'a WebDriver,
    base_url: String,
    timing: Timing,
}

impl<'a> HomePage<'a> {
    pub fn new<S>(driver: &'a WebDriver, base_url: S, timing: Timing) -> Self
    where
        S: Into<String>,
    {
        Self {
            driver,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timing,
        }
    }

    /// Click the cookie-consent button if it shows up. Returns whether it did.
    pub async fn dismiss_cookie_consent(&self) -> JourneyResult<bool> {
        let clicked = self
            .driver
            .locate(By::XPath(&format!(
                "//button[contains(normalize-space(.), '{}')]",
                COOKIE_ACCEPT_LABEL
            )))
            .and_clickable()
            .or_script("cookie button", script::BUTTON_WITH_LABEL, vec![json!(COOKIE_ACCEPT_LABEL)])
            .and_displayed()
            .with_poller(self.timing.optional.clone())
            .click_first()
            .await;

        match clicked {
            Ok(Some(_)) => {
                log::info!("closed cookie consent popup");
                Ok(true)
            }
            Ok(None) => {
                log::info!("no cookie consent popup");
                Ok(false)
            }
            Err(e) if e.is_miss() => Ok(false),
            Err(e) => {
                log::warn!("cookie consent popup could not be closed: {}", e);
                Ok(false)
            }
        }
    }

    pub async fn select_departure(&self, city: &str) -> JourneyResult<CitySelection> {
        CityPicker::new(self.driver, self.timing.clone())
            .select_city(CityField::Departure, city)
            .await
    }

    pub async fn select_arrival(&self, city: &str) -> JourneyResult<CitySelection> {
        CityPicker::new(self.driver, self.timing.clone())
            .select_city(CityField::Arrival, city)
            .await
    }

    pub async fn select_date(&self, date: &TravelDate) -> JourneyResult<DateSelection> {
        DatePicker::new(self.driver, self.timing.clone()).select(date).await
    }

    /// Submit the search form. Returns the strategy that clicked the button.
    pub async fn search(&self) -> JourneyResult<String> {
        let driver = self.driver;
        let label_xpath = format!("//button[contains(normalize-space(.), '{}')]", SEARCH_LABEL);
        let label_xpath = label_xpath.as_str();

        let resolved = FallbackChain::new("click the search button")
            .with_poller(self.timing.poller.clone())
            .or("search button", move || async move {
                let clicked = driver
                    .locate(By::XPath(label_xpath))
                    .and_clickable()
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .or("search button script", move || async move {
                let clicked = driver
                    .locate_script("search label", script::BUTTON_WITH_LABEL, vec![json!(SEARCH_LABEL)])
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .or("submit button", move || async move {
                let clicked = driver
                    .locate_script("submit-like button", script::SUBMIT_LIKE_BUTTON, vec![])
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .run()
            .await?;
        Ok(resolved.strategy)
    }

    /// Follow the "Giriş" link to the member login page.
    pub async fn open_login(&self) -> JourneyResult<LoginPage<'a>> {
        let clicked = self
            .driver
            .locate(By::LinkText(LOGIN_LINK_TEXT))
            .and_displayed()
            .or(By::XPath(&format!("//a[contains(normalize-space(.), '{}')]", LOGIN_LINK_TEXT)))
            .and_displayed()
            .with_poller(self.timing.poller.clone())
            .click_first()
            .await?;
        if clicked.is_none() {
            return Err(JourneyError::NoSuchElement(format!("link '{}'", LOGIN_LINK_TEXT)));
        }
        log::info!("followed the login link");
        Ok(LoginPage::new(self.driver, self.base_url.clone(), self.timing.clone()))
    }

    /// Greeting shown to a signed-in member, if any.
    pub async fn welcome_message(&self) -> JourneyResult<Option<String>> {
        let banner = self
            .driver
            .locate(By::ClassName("welcome-message"))
            .and_displayed()
            .with_poller(self.timing.optional.clone())
            .first_opt()
            .await?;
        match banner {
            Some(banner) => Ok(Some(banner.text().await?.trim().to_string())),
            None => Ok(None),
        }
    }

    /// Loose check that a results page appeared.
    pub async fn results_visible(&self) -> JourneyResult<bool> {
        let driver = self.driver;
        let found = self
            .timing
            .poller
            .poll(|| async move {
                let container = driver
                    .locate(By::Css(
                        "div[class*='search-results'], div[class*='sefer-list'], div.results",
                    ))
                    .or(By::XPath("//h1[contains(., 'Sefer')]"))
                    .exists()
                    .await?;
                if container {
                    return Ok(Some(()));
                }
                let url = driver.current_url().await?.to_string().to_lowercase();
                Ok(if RESULT_URL_HINTS.iter().any(|hint| url.contains(hint)) {
                    Some(())
                } else {
                    None
                })
            })
            .await?;

        if found.is_some() {
            log::info!("search results page is displayed");
        } else {
            log::warn!("could not verify that search results are displayed");
        }
        Ok(found.is_some())
    }

    /// Load the homepage and clear the cookie popup. Returns whether a popup was closed.
    async fn load(&self) -> JourneyResult<bool> {
        let url = self.url();
        self.driver.goto(&url).await?;
        log::info!("navigated to {}", url);
        self.dismiss_cookie_consent().await
    }

    /// The whole flow: homepage, cities, date, search, results check.
    pub async fn search_journey(&self, search: &JourneySearch) -> JourneyResult<SearchReport> {
        let cookie_dismissed = self.load().await?;
        let departure = self.select_departure(&search.departure).await?;
        let arrival = self.select_arrival(&search.arrival).await?;
        let date = self.select_date(&search.date).await?;
        let search_strategy = self.search().await?;
        let results_visible = self.results_visible().await?;

        Ok(SearchReport {
            cookie_dismissed,
            departure,
            arrival,
            date,
            search_strategy,
            results_visible,
        })
    }
}

#[async_trait]
impl PageObject for HomePage<'_> {
    fn driver(&self) -> &WebDriver {
        self.driver
    }

    fn url(&self) -> String {
        format!("{}/", self.base_url)
    }

    async fn open(&self) -> JourneyResult<()> {
        self.load().await?;
        Ok(())
    }
}
