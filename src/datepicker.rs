//! Travel-date selection on a bootstrap-style datepicker with Turkish labels.

use chrono::{Datelike, Local, NaiveDate};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thirtyfour::{By, WebDriver};
use tokio::time::sleep;

use crate::chain::{FallbackChain, Resolved};
use crate::config::Timing;
use crate::error::{JourneyError, JourneyResult};
use crate::poller::ElementPoller;
use crate::query::{ElementQuery, Locate, Strategy};
use crate::script;
use crate::waiter::ElementWaitable;

/// Format used by the date input and the direct-value fallback.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Upper bound on prev/next clicks while looking for the target month.
pub const MAX_NAVIGATION_CLICKS: u32 = 36;

const NAVIGATION_SETTLE: Duration = Duration::from_millis(200);

pub const TURKISH_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Lowercase and strip Turkish diacritics, so "ŞUBAT", "Şubat" and "Subat" compare equal.
pub(crate) fn fold(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .filter(|c| *c != '\u{307}')
        .map(|c| match c {
            'ş' => 's',
            'ğ' => 'g',
            'ı' => 'i',
            'ö' => 'o',
            'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Turkish name for a month number (1-12).
pub fn month_name(month: u32) -> Option<&'static str> {
    match month {
        1..=12 => Some(TURKISH_MONTHS[(month - 1) as usize]),
        _ => None,
    }
}

/// Month number (1-12) for a Turkish month name.
pub fn month_number(name: &str) -> Option<u32> {
    let wanted = fold(name.trim());
    TURKISH_MONTHS
        .iter()
        .position(|m| fold(m) == wanted)
        .map(|i| i as u32 + 1)
}

/// A travel date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TravelDate(NaiveDate);

impl TravelDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> JourneyResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| JourneyError::InvalidDate(format!("{:02}/{:02}/{}", day, month, year)))
    }

    /// The given day of the current month.
    pub fn this_month(day: u32) -> JourneyResult<Self> {
        let today = Local::now().date_naive();
        Self::from_ymd(today.year(), today.month(), day)
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Month index used for navigation arithmetic.
    fn month_index(&self) -> i32 {
        self.year() * 12 + self.month() as i32 - 1
    }
}

impl FromStr for TravelDate {
    type Err = JourneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| JourneyError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Month and year shown in the calendar header, e.g. "Mart 2025".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarHeader {
    pub month: u32,
    pub year: i32,
}

impl CalendarHeader {
    pub fn parse(text: &str) -> Option<Self> {
        let mut month = None;
        let mut year = None;
        for token in text.split_whitespace() {
            if month.is_none() {
                month = month_number(token);
                if month.is_some() {
                    continue;
                }
            }
            if year.is_none() && token.len() == 4 {
                year = token.parse::<i32>().ok();
            }
        }
        Some(Self {
            month: month?,
            year: year?,
        })
    }

    fn month_index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    /// Months from the shown month to `date`: positive means "next", negative "prev".
    pub fn offset_to(&self, date: &TravelDate) -> i32 {
        date.month_index() - self.month_index()
    }
}

/// What happened while picking a date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSelection {
    pub opened_with: String,
    pub navigation_clicks: u32,
    pub selected_with: String,
    /// The date input's value afterwards, when it could be read.
    pub value: Option<String>,
}

/// Drives the datepicker widget.
pub struct DatePicker<'a> {
    driver: &'a WebDriver,
    timing: Timing,
}

fn day_cell_xpath(day: u32) -> String {
    format!(
        "//div[contains(@class, 'datepicker-days')]//td[contains(concat(' ', normalize-space(@class), ' '), ' day ') \
         and not(contains(@class, 'old')) and not(contains(@class, 'new')) \
         and not(contains(@class, 'disabled')) and normalize-space(.)='{}']",
        day
    )
}

async fn read_date_value(driver: &WebDriver) -> JourneyResult<Option<String>> {
    let ret = driver.execute(script::read_date_value().as_str(), Vec::new()).await?;
    Ok(ret.json().as_str().map(|s| s.to_string()).filter(|s| !s.is_empty()))
}

/// Whether a date input showing `shown` holds `wanted`. Unreadable counts as yes.
fn date_confirmed(shown: Option<&str>, wanted: &str) -> bool {
    match shown {
        Some(shown) => shown.trim() == wanted,
        None => true,
    }
}

async fn confirm_click(driver: &WebDriver, clicked: bool, wanted: &str) -> JourneyResult<Option<()>> {
    if !clicked {
        return Ok(None);
    }
    let shown = read_date_value(driver).await?;
    if date_confirmed(shown.as_deref(), wanted) {
        Ok(Some(()))
    } else {
        log::debug!("date input shows {:?} after the click, wanted {}", shown, wanted);
        Ok(None)
    }
}

impl<'a> DatePicker<'a> {
    pub fn new(driver: &'a WebDriver, timing: Timing) -> Self {
        Self {
            driver,
            timing,
        }
    }

    fn calendar(&self) -> ElementQuery<'a> {
        self.driver
            .locate(By::Css("div.datepicker-dropdown"))
            .and_displayed()
            .or(By::Css("div.datepicker"))
            .and_displayed()
    }

    /// Open the calendar pop-up.
    pub async fn open(&self) -> JourneyResult<Resolved<()>> {
        let driver = self.driver;
        let resolved = FallbackChain::new("open the calendar")
            .with_poller(self.timing.poller.clone())
            .or("datepicker input", move || async move {
                let clicked = driver
                    .locate(By::Css(
                        "input.datepicker, input[data-provide='datepicker'], input[type='date']",
                    ))
                    .and_displayed()
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .or("calendar icon", move || async move {
                let clicked = driver
                    .locate_script("calendar icon", script::CALENDAR_ICON_INPUT, vec![])
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .or("date placeholder", move || async move {
                let clicked = driver
                    .locate_script("date placeholder", script::SLASH_PLACEHOLDER_INPUT, vec![])
                    .nowait()
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .or("third input", move || async move {
                let clicked = ElementQuery::new(driver, ElementPoller::NoWait, Strategy::Nth(By::Tag("input"), 2))
                    .click_first()
                    .await?;
                Ok(clicked.map(|_| ()))
            })
            .run()
            .await?;

        let calendar = self.calendar().with_poller(self.timing.optional.clone()).first_opt().await?;
        if calendar.is_none() {
            log::warn!("calendar did not become visible after using {}", resolved.strategy);
        }
        Ok(resolved)
    }

    /// Click prev/next until the header shows the month of `date`.
    ///
    /// Stops early, without error, when the header cannot be read or parsed or
    /// stops changing. Returns the number of clicks made.
    pub async fn navigate_to(&self, date: &TravelDate) -> JourneyResult<u32> {
        let mut clicks = 0;
        let mut previous: Option<String> = None;

        while clicks < MAX_NAVIGATION_CLICKS {
            let header = self
                .driver
                .locate(By::Css(".datepicker-days th.datepicker-switch"))
                .and_displayed()
                .or(By::Css("th.datepicker-switch"))
                .and_displayed()
                .nowait()
                .first_opt()
                .await?;
            let header = match header {
                Some(h) => h,
                None => {
                    log::debug!("no calendar header, skipping navigation");
                    return Ok(clicks);
                }
            };

            let text = header.text().await?;
            if previous.as_deref() == Some(text.as_str()) {
                log::warn!("calendar header stuck at {:?}", text);
                return Ok(clicks);
            }
            let shown = match CalendarHeader::parse(&text) {
                Some(shown) => shown,
                None => {
                    log::warn!("unrecognised calendar header {:?}", text);
                    return Ok(clicks);
                }
            };

            let offset = shown.offset_to(date);
            if offset == 0 {
                return Ok(clicks);
            }
            let arrow = if offset > 0 { "next" } else { "prev" };
            let clicked = self
                .driver
                .locate(By::Css(&format!(".datepicker-days th.{}", arrow)))
                .and_displayed()
                .or(By::Css(&format!("th.{}", arrow)))
                .and_displayed()
                .nowait()
                .click_first()
                .await?;
            if clicked.is_none() {
                log::warn!("no {} arrow in the calendar", arrow);
                return Ok(clicks);
            }

            clicks += 1;
            previous = Some(text);
            sleep(NAVIGATION_SETTLE).await;
        }

        log::warn!("gave up after {} calendar clicks", clicks);
        Ok(clicks)
    }

    /// Pick the day of `date` in the shown month, or write the date into the input.
    ///
    /// A click only counts when the input then shows `date` (or cannot be read),
    /// so a calendar left on the wrong month ends in the direct write.
    pub async fn select_day(&self, date: &TravelDate) -> JourneyResult<Resolved<()>> {
        let driver = self.driver;
        let day = date.day();
        let xpath = day_cell_xpath(day);
        let xpath = xpath.as_str();
        let formatted = date.to_string();
        let formatted = formatted.as_str();
        let set_script = script::set_date_value();
        let set_script = set_script.as_str();

        let resolved = FallbackChain::new(format!("select day {}", day))
            .with_poller(self.timing.poller.clone())
            .settle(self.timing.settle)
            .or("day cell", move || async move {
                let clicked = driver.locate(By::XPath(xpath)).and_displayed().nowait().click_first().await?;
                confirm_click(driver, clicked.is_some(), formatted).await
            })
            .or("day cell script", move || async move {
                let clicked = driver
                    .locate_script("day cell", script::CURRENT_MONTH_DAY_CELL, script::day_args(day))
                    .nowait()
                    .click_first()
                    .await?;
                confirm_click(driver, clicked.is_some(), formatted).await
            })
            .or("table scan", move || async move {
                let clicked = driver
                    .locate(By::Tag("td"))
                    .with_text(day.to_string())
                    .and_displayed()
                    .nowait()
                    .click_first()
                    .await?;
                confirm_click(driver, clicked.is_some(), formatted).await
            })
            .or("direct value", move || async move {
                let ret = driver.execute(set_script, vec![json!(formatted)]).await?;
                Ok(if ret.json().as_bool() == Some(true) { Some(()) } else { None })
            })
            .run()
            .await;
        resolved
    }

    /// The travel-date input's current value.
    pub async fn current_value(&self) -> JourneyResult<Option<String>> {
        read_date_value(self.driver).await
    }

    /// Open the calendar, move to the right month and pick the day.
    pub async fn select(&self, date: &TravelDate) -> JourneyResult<DateSelection> {
        let opened = self.open().await?;
        let navigation_clicks = self.navigate_to(date).await?;
        let selected = self.select_day(date).await?;

        if let Some(calendar) = self.calendar().nowait().first_opt().await? {
            let closed = calendar
                .waiter("calendar to close")
                .with_poller(self.timing.optional.clone())
                .until()
                .hidden()
                .await;
            if let Err(e) = closed {
                log::debug!("{}", e);
            }
        }

        let value = self.current_value().await?;
        match &value {
            Some(v) if *v == date.to_string() => log::info!("travel date set to {}", v),
            Some(v) => log::warn!("travel date input shows {} instead of {}", v, date),
            None => log::debug!("travel date input could not be read back"),
        }

        Ok(DateSelection {
            opened_with: opened.strategy,
            navigation_clicks,
            selected_with: selected.strategy,
            value,
        })
    }
}
