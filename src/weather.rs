use chrono::NaiveDateTime;
use serde::Deserialize;

/// A geocoded place, produced once per search.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
    pub country_code: String,
}

/// Instantaneous readings. Open-Meteo sends `null` for a value it does not have.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<f64>,

    pub apparent_temperature: Option<f64>,

    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: Option<f64>,

    #[serde(rename = "pressure_msl")]
    pub pressure: Option<f64>,

    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<f64>,

    pub weather_code: Option<i32>,
}

/// Hourly series for the next day. All vectors have the same length, at most [`HourlyForecast::HOURS`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyForecast {
    pub time: Vec<NaiveDateTime>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
}

impl HourlyForecast {
    pub const HOURS: usize = 24;

    /// Builds the forecast from raw parallel series, cutting every series to the
    /// shortest one and to the first 24 hours.
    pub fn new(
        time: Vec<NaiveDateTime>,
        temperature: Vec<Option<f64>>,
        humidity: Vec<Option<f64>>,
        wind_speed: Vec<Option<f64>>,
        precipitation: Vec<Option<f64>>,
    ) -> Self {
        let len = [
            time.len(),
            temperature.len(),
            humidity.len(),
            wind_speed.len(),
            precipitation.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
        .min(Self::HOURS);

        fn cut<T>(mut series: Vec<T>, len: usize) -> Vec<T> {
            series.truncate(len);
            series
        }

        Self {
            time: cut(time, len),
            temperature: cut(temperature, len),
            humidity: cut(humidity, len),
            wind_speed: cut(wind_speed, len),
            precipitation: cut(precipitation, len),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeInfo {
    pub description: &'static str,
    pub icon: &'static str,
}

/// Everything one successful search produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub location: Location,
    pub current: CurrentConditions,
    pub hourly: HourlyForecast,
}
