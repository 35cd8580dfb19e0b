use thiserror::Error;
use thirtyfour::error::WebDriverError;

#[derive(Error, Debug)]
pub enum JourneyError {
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] WebDriverError),

    #[error("Element(s) not found using strategies: {0}")]
    NoSuchElement(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Could not {action} using any strategy: [{}]", strategies.join(","))]
    Exhausted {
        action: String,
        strategies: Vec<String>,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type JourneyResult<T> = std::result::Result<T, JourneyError>;

impl JourneyError {
    /// True for errors that only mean "nothing matched", as opposed to a broken session.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            JourneyError::NoSuchElement(_)
                | JourneyError::Timeout(_)
                | JourneyError::Exhausted { .. }
        )
    }
}
