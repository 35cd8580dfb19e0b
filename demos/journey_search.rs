//! Requires chromedriver running on port 4444:
//!
//!     chromedriver --port=4444
//!
//! Run as follows:
//!
//!     RUST_LOG=journey_query=debug cargo run --example journey_search
//!
//! Set JOURNEY_HEADLESS=false to watch the browser.

use color_eyre::eyre::eyre;
use journey_query::prelude::*;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let config = SuiteConfig::from_env()?;
    let driver = config.connect().await?;

    // Twentieth of the current month, like the nightly smoke test.
    let search = JourneySearch::new("ZONGULDAK", "DÜZCE", TravelDate::this_month(20)?);
    let home = HomePage::new(&driver, config.base_url(), config.timing());
    let report = home.search_journey(&search).await;
    driver.quit().await?;

    let report = report?;
    println!("cookie popup closed: {}", report.cookie_dismissed);
    println!("departure via {}: {:?}", report.departure.strategy, report.departure.shown);
    println!("arrival via {}: {:?}", report.arrival.strategy, report.arrival.shown);
    println!(
        "date opened via {}, {} calendar clicks, picked via {}: {:?}",
        report.date.opened_with, report.date.navigation_clicks, report.date.selected_with, report.date.value
    );
    println!("search via {}", report.search_strategy);

    if !report.results_visible {
        return Err(eyre!("no search results for {} -> {}", search.departure, search.arrival));
    }
    Ok(())
}
