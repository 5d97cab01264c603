use std::fmt;

use thiserror::Error;

/// Which weather request a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Current,
    Hourly,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Current => f.write_str("current weather data"),
            Feed::Hourly => f.write_str("weather forecast"),
        }
    }
}

/// Every way a search can fail. The `Display` text is what the user is shown.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Please select a country and enter a city name")]
    Validation,

    #[error("Unable to find location. Please check your internet connection and try again.")]
    Connectivity(#[source] reqwest::Error),

    #[error("City \"{city}\" not found in {country}. Please check the spelling and try again.")]
    NotFound { city: String, country: String },

    #[error("Unable to get {feed}. Please try again later.")]
    Fetch {
        feed: Feed,
        #[source]
        source: reqwest::Error,
    },

    #[error("Received invalid {feed}. Please try again later.")]
    InvalidData { feed: Feed, detail: String },
}
