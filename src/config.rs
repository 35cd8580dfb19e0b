//! Suite configuration.
//!
//! Defaults suit a chromedriver on `localhost:4444` and the live site. A JSON
//! file named by `JOURNEY_CONFIG` may override any field, and the
//! `WEBDRIVER_URL`, `JOURNEY_BASE_URL` and `JOURNEY_HEADLESS` environment
//! variables override the file.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thirtyfour::{DesiredCapabilities, WebDriver};

use crate::error::{JourneyError, JourneyResult};
use crate::poller::ElementPoller;

pub const CONFIG_ENV: &str = "JOURNEY_CONFIG";
pub const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";
pub const BASE_URL_ENV: &str = "JOURNEY_BASE_URL";
pub const HEADLESS_ENV: &str = "JOURNEY_HEADLESS";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuiteConfig {
    pub webdriver_url: String,
    pub base_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Overall wait for elements that must appear.
    pub timeout_ms: u64,
    pub interval_ms: u64,
    /// Wait for things that may never appear, like the cookie popup.
    pub optional_timeout_ms: u64,
    /// Pause after a widget interaction so its animation can finish.
    pub settle_ms: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            base_url: "https://www.duzceguven.com.tr".to_string(),
            headless: true,
            window_size: (1366, 900),
            timeout_ms: 10_000,
            interval_ms: 500,
            optional_timeout_ms: 3_000,
            settle_ms: 1_000,
        }
    }
}

/// Polling and pacing shared by the interaction helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub poller: ElementPoller,
    pub optional: ElementPoller,
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        SuiteConfig::default().timing()
    }
}

impl Timing {
    /// No waiting at all. Handy against static fixture pages.
    pub fn immediate() -> Self {
        Self {
            poller: ElementPoller::NoWait,
            optional: ElementPoller::NoWait,
            settle: Duration::from_millis(0),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl SuiteConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> JourneyResult<Self> {
        serde_json::from_str(json).map_err(|e| JourneyError::Config(e.to_string()))
    }

    /// Load from `JOURNEY_CONFIG` (if set), then apply environment overrides.
    pub fn from_env() -> JourneyResult<Self> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| JourneyError::Config(format!("{}: {}", path, e)))?;
                Self::from_json(&json)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> JourneyResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(WEBDRIVER_URL_ENV) {
            self.webdriver_url = url;
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(value) = lookup(HEADLESS_ENV) {
            self.headless = parse_bool(&value).ok_or_else(|| {
                JourneyError::Config(format!("{} must be a boolean, got {:?}", HEADLESS_ENV, value))
            })?;
        }
        Ok(())
    }

    /// The base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timing(&self) -> Timing {
        let interval = Duration::from_millis(self.interval_ms);
        Timing {
            poller: ElementPoller::TimeoutWithInterval(Duration::from_millis(self.timeout_ms), interval),
            optional: ElementPoller::TimeoutWithInterval(
                Duration::from_millis(self.optional_timeout_ms),
                interval,
            ),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    /// Start a Chrome session on the configured WebDriver server.
    ///
    /// The implicit wait is disabled so that all waiting goes through pollers.
    pub async fn connect(&self) -> JourneyResult<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        if self.headless {
            caps.set_headless()?;
        }
        caps.add_chrome_arg(&format!("--window-size={},{}", self.window_size.0, self.window_size.1))?;
        caps.add_chrome_arg("--lang=tr-TR")?;

        let driver = WebDriver::new(&self.webdriver_url, caps).await?;
        driver.set_implicit_wait_timeout(Duration::new(0, 0)).await?;
        driver.delete_all_cookies().await?;
        log::info!("connected to {}", self.webdriver_url);
        Ok(driver)
    }
}
