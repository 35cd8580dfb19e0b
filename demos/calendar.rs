//! Requires chromedriver running on port 4444:
//!
//!     chromedriver --port=4444
//!
//! Run as follows:
//!
//!     cargo run --example calendar -- 14/02/2026

use regex::Regex;
use thirtyfour::By;

use journey_query::datepicker::month_name;
use journey_query::prelude::*;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let date: TravelDate = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => TravelDate::this_month(1)?,
    };

    let config = SuiteConfig::from_env()?;
    let driver = config.connect().await?;
    let result = run(&driver, &config, &date).await;
    driver.quit().await?;
    result
}

async fn run(driver: &thirtyfour::WebDriver, config: &SuiteConfig, date: &TravelDate) -> color_eyre::Result<()> {
    let home = HomePage::new(driver, config.base_url(), config.timing());
    home.open().await?;

    let picker = DatePicker::new(driver, config.timing());
    let opened = picker.open().await?;
    println!("calendar opened via {}", opened.strategy);

    // The header reads like "Şubat 2026".
    let header = driver
        .locate(By::Css("th.datepicker-switch"))
        .with_text(Regex::new(r"^\S+ \d{4}$")?)
        .and_displayed()
        .first()
        .await?;
    let shown = header.text().await?;
    println!("calendar shows {:?} ({:?})", shown, CalendarHeader::parse(&shown));

    let clicks = picker.navigate_to(date).await?;
    println!("{} clicks to reach {}", clicks, date);

    let wanted = format!("{} {}", month_name(date.month()).unwrap_or_default(), date.year());
    let reached = driver
        .locate(By::Css("th.datepicker-switch"))
        .with_text(wanted.clone())
        .nowait()
        .exists()
        .await?;
    println!("header matches {:?}: {}", wanted, reached);

    let picked = picker.select_day(date).await?;
    println!("day picked via {}: {:?}", picked.strategy, picker.current_value().await?);
    Ok(())
}
