use async_trait::async_trait;
use thirtyfour::{By, WebDriver};

use crate::config::Timing;
use crate::error::JourneyResult;
use crate::page::PageObject;
use crate::query::Locate;

/// The member login page at `{base}/login`.
pub struct LoginPage<'a> {
    driver: &'a WebDriver,
    base_url: String,
    timing: Timing,
}

impl<'a> LoginPage<'a> {
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

    async fn enter_text(&self, by: By, text: &str) -> JourneyResult<()> {
        let elem = self.driver.locate(by).and_displayed().with_poller(self.timing.poller.clone()).first().await?;
        elem.clear().await?;
        elem.send_keys(text).await?;
        Ok(())
    }

    pub async fn enter_username(&self, username: &str) -> JourneyResult<()> {
        self.enter_text(By::Id("username"), username).await
    }

    pub async fn enter_password(&self, password: &str) -> JourneyResult<()> {
        self.enter_text(By::Id("password"), password).await
    }

    pub async fn click_login(&self) -> JourneyResult<()> {
        let button = self
            .driver
            .locate(By::Id("loginButton"))
            .and_clickable()
            .or(By::Css("button[type='submit']"))
            .and_clickable()
            .with_poller(self.timing.poller.clone())
            .first()
            .await?;
        button.click().await?;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> JourneyResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    /// Text of the error banner, if one is displayed.
    pub async fn error_message(&self) -> JourneyResult<Option<String>> {
        let banner = self
            .driver
            .locate(By::ClassName("error-message"))
            .and_displayed()
            .with_poller(self.timing.optional.clone())
            .first_opt()
            .await?;
        match banner {
            Some(banner) => Ok(Some(banner.text().await?.trim().to_string())),
            None => Ok(None),
        }
    }

    pub async fn is_error_displayed(&self) -> JourneyResult<bool> {
        Ok(self.error_message().await?.is_some())
    }
}

#[async_trait]
impl PageObject for LoginPage<'_> {
    fn driver(&self) -> &WebDriver {
        self.driver
    }

    fn url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    async fn open(&self) -> JourneyResult<()> {
        self.driver.goto(&self.url()).await?;
        log::info!("navigated to {}", self.url());
        Ok(())
    }
}
