use std::time::Duration;

use tracing::info;

use crate::error::WeatherError;
use crate::openmeteo::{forecast::Forecaster, geocoding::Geocoder, http_client};
use crate::weather::Report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub city: String,
    pub country_code: &'static str,
}

/// The outbound clients one search needs. Cheap to clone; both share one connection pool.
#[derive(Debug, Clone)]
pub struct Services {
    geocoder: Geocoder,
    forecaster: Forecaster,
}

impl Services {
    pub fn new(
        timeout: Duration,
        geocoding_url: &str,
        forecast_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = http_client(timeout)?;
        Ok(Self {
            geocoder: Geocoder::new(http.clone(), geocoding_url),
            forecaster: Forecaster::new(http, forecast_url),
        })
    }

    /// Geocodes the city, then fetches current conditions and the hourly forecast
    /// concurrently. Either fetch failing fails the whole search.
    pub async fn search(&self, request: &SearchRequest) -> Result<Report, WeatherError> {
        let location = self
            .geocoder
            .locate(&request.city, request.country_code)
            .await?;

        let (current, hourly) = tokio::try_join!(
            self.forecaster.current(location.latitude, location.longitude),
            self.forecaster.hourly(location.latitude, location.longitude),
        )?;
        info!(location = %location.name, hours = hourly.len(), "weather data fetched");

        Ok(Report {
            location,
            current,
            hourly,
        })
    }
}
