//! City selection on the Select2-enhanced departure/arrival fields.

use futures::future::FutureExt;
use serde_json::json;
use thirtyfour::{By, WebDriver};

use crate::chain::FallbackChain;
use crate::config::Timing;
use crate::datepicker::fold;
use crate::error::JourneyResult;
use crate::query::{filter, ElementFilter, Locate};
use crate::script;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityField {
    Departure,
    Arrival,
}

impl CityField {
    /// Id (and name) of the underlying `<select>`.
    pub fn key(&self) -> &'static str {
        match self {
            CityField::Departure => "departure",
            CityField::Arrival => "arrival",
        }
    }

    /// Text found in the plain input's placeholder ("Kalkış Noktası: Seçiniz").
    pub fn placeholder_hint(&self) -> &'static str {
        match self {
            CityField::Departure => "Kalkış",
            CityField::Arrival => "Varış",
        }
    }
}

/// True when `shown` names `wanted`, ignoring case and Turkish diacritics.
pub fn city_matches(shown: &str, wanted: &str) -> bool {
    let wanted = fold(wanted.trim());
    !wanted.is_empty() && fold(shown).contains(&wanted)
}

/// Only match elements whose text contains `wanted` (see [`city_matches`]).
fn text_contains(wanted: &str) -> ElementFilter {
    let wanted = wanted.to_string();
    filter(move |elem| {
        let wanted = wanted.clone();
        async move {
            match elem.text().await {
                Ok(text) => city_matches(&text, &wanted),
                _ => false,
            }
        }
        .boxed()
    })
}

/// Outcome of a city selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySelection {
    pub strategy: String,
    /// What the widget shows afterwards, when it could be read.
    pub shown: Option<String>,
}

pub struct CityPicker<'a> {
    driver: &'a WebDriver,
    timing: Timing,
}

impl<'a> CityPicker<'a> {
    pub fn new(driver: &'a WebDriver, timing: Timing) -> Self {
        Self {
            driver,
            timing,
        }
    }

    /// The city currently shown for `field`, if the page exposes one.
    pub async fn selected_city(&self, field: CityField) -> JourneyResult<Option<String>> {
        let ret = self.driver.execute(script::SELECTED_CITY_TEXT, vec![json!(field.key())]).await?;
        Ok(ret.json().as_str().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
    }

    /// `Some(())` when the widget shows `city`, or when nothing can be read back.
    async fn confirm(&self, field: CityField, city: &str) -> JourneyResult<Option<()>> {
        match self.selected_city(field).await? {
            Some(shown) if city_matches(&shown, city) => Ok(Some(())),
            Some(shown) => {
                log::debug!("{} shows {:?}, wanted {:?}", field.key(), shown, city);
                Ok(None)
            }
            None => {
                log::debug!("{} selection cannot be read back", field.key());
                Ok(Some(()))
            }
        }
    }

    async fn via_select2(&self, field: CityField, city: &str) -> JourneyResult<Option<()>> {
        let opened = self
            .driver
            .locate(By::Css(&format!(
                "span.select2-selection[aria-labelledby*='{}']",
                field.key()
            )))
            .and_displayed()
            .or(By::Css(&format!("#select2-{}-container", field.key())))
            .and_displayed()
            .nowait()
            .click_first()
            .await?;
        if opened.is_none() {
            return Ok(None);
        }

        let search = self
            .driver
            .locate(By::Css(".select2-container--open .select2-search__field"))
            .and_displayed()
            .with_poller(self.timing.optional.clone())
            .first_opt()
            .await?;
        if let Some(search) = search {
            search.send_keys(city).await?;
        }

        let option = self
            .driver
            .locate(By::Css(".select2-container--open li.select2-results__option"))
            .with_filter(text_contains(city))
            .and_displayed()
            .with_poller(self.timing.poller.clone())
            .click_first()
            .await?;
        if option.is_none() {
            return Ok(None);
        }
        self.confirm(field, city).await
    }

    async fn via_autocomplete(&self, field: CityField, city: &str) -> JourneyResult<Option<()>> {
        let input = self
            .driver
            .locate(By::XPath(&format!(
                "//input[contains(@placeholder, '{}')]",
                field.placeholder_hint()
            )))
            .and_displayed()
            .nowait()
            .first_opt()
            .await?;
        let input = match input {
            Some(input) => input,
            None => return Ok(None),
        };
        input.click().await?;
        input.clear().await?;
        input.send_keys(city).await?;

        let option = self
            .driver
            .locate(By::Css("ul.ui-autocomplete li, .autocomplete li, .dropdown-menu li, li[role='option']"))
            .with_filter(text_contains(city))
            .and_displayed()
            .or(By::Tag("li"))
            .with_filter(text_contains(city))
            .and_displayed()
            .with_poller(self.timing.optional.clone())
            .click_first()
            .await?;
        if option.is_none() {
            log::debug!("no suggestion for {:?}, keeping the typed value", city);
        }
        self.confirm(field, city).await
    }

    async fn via_option_script(&self, field: CityField, city: &str) -> JourneyResult<Option<()>> {
        let clicked = self
            .driver
            .locate_script("select2 option", &script::select2_option(), vec![json!(city)])
            .nowait()
            .click_first()
            .await?;
        if clicked.is_none() {
            return Ok(None);
        }
        self.confirm(field, city).await
    }

    async fn via_native_select(&self, field: CityField, city: &str) -> JourneyResult<Option<()>> {
        let ret = self
            .driver
            .execute(&script::select_native_option(), vec![json!(field.key()), json!(city)])
            .await?;
        if ret.json().as_bool() != Some(true) {
            return Ok(None);
        }
        self.confirm(field, city).await
    }

    /// Choose `city` for `field`, trying the Select2 widget first and the
    /// underlying `<select>` last.
    pub async fn select_city(&self, field: CityField, city: &str) -> JourneyResult<CitySelection> {
        let resolved = FallbackChain::new(format!("select {} city {}", field.key(), city))
            .with_poller(self.timing.poller.clone())
            .settle(self.timing.settle)
            .or("select2 widget", move || self.via_select2(field, city))
            .or("autocomplete input", move || self.via_autocomplete(field, city))
            .or("select2 option script", move || self.via_option_script(field, city))
            .or("native select", move || self.via_native_select(field, city))
            .run()
            .await?;

        Ok(CitySelection {
            strategy: resolved.strategy,
            shown: self.selected_city(field).await?,
        })
    }
}
