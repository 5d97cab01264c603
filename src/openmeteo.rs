use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Feed, WeatherError};
use crate::reference;
use crate::weather::{CurrentConditions, HourlyForecast, Location};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const USER_AGENT: &str = "citywx";

pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub mod geocoding {
    use super::*;

    const RESULT_LIMIT: &str = "5";

    #[derive(Deserialize, Debug, Default)]
    struct SearchResponse {
        #[serde(default)]
        results: Option<Vec<Place>>,
    }

    #[derive(Deserialize, Debug, Clone)]
    pub struct Place {
        pub latitude: f64,
        pub longitude: f64,
        pub name: String,

        #[serde(default)]
        pub country: Option<String>,

        #[serde(default)]
        pub country_code: Option<String>,
    }

    impl Place {
        fn into_location(self) -> Location {
            let country_code = self.country_code.unwrap_or_default();
            let country = self
                .country
                .unwrap_or_else(|| reference::country_name(&country_code).to_string());
            Location {
                latitude: self.latitude,
                longitude: self.longitude,
                name: self.name,
                country,
                country_code,
            }
        }
    }

    /// Prefers the place in the requested country, otherwise the first (best ranked) one.
    pub fn pick_place(places: Vec<Place>, country_code: &str) -> Option<Place> {
        let index = places
            .iter()
            .position(|place| place.country_code.as_deref() == Some(country_code));
        if index.is_none() && !places.is_empty() {
            warn!("no result in {country_code}, falling back to the first match");
        }
        places.into_iter().nth(index.unwrap_or(0))
    }

    #[derive(Debug, Clone)]
    pub struct Geocoder {
        http: Client,
        url: String,
    }

    impl Geocoder {
        pub fn new(http: Client, url: impl Into<String>) -> Self {
            Self {
                http,
                url: url.into(),
            }
        }

        pub async fn locate(&self, city: &str, country_code: &str) -> Result<Location, WeatherError> {
            info!(city, country_code, "geocoding request");
            let response: SearchResponse = self
                .http
                .get(&self.url)
                .query(&[
                    ("name", city),
                    ("count", RESULT_LIMIT),
                    ("language", "en"),
                    ("format", "json"),
                ])
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(WeatherError::Connectivity)?
                .json()
                .await
                .map_err(WeatherError::Connectivity)?;

            let places = response.results.unwrap_or_default();
            debug!(count = places.len(), "geocoding results");

            let place = pick_place(places, country_code).ok_or_else(|| WeatherError::NotFound {
                city: city.to_string(),
                country: reference::country_name(country_code).to_string(),
            })?;
            let location = place.into_location();
            info!(
                name = %location.name,
                country = %location.country,
                latitude = location.latitude,
                longitude = location.longitude,
                "location found"
            );
            Ok(location)
        }
    }
}

pub mod forecast {
    use super::*;
    use crate::units::time;

    const CURRENT_FIELDS: &str =
        "temperature_2m,relative_humidity_2m,apparent_temperature,pressure_msl,wind_speed_10m,weather_code";
    const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation";

    #[derive(Deserialize, Debug)]
    struct CurrentResponse {
        current: Option<CurrentConditions>,
    }

    #[derive(Deserialize, Debug)]
    struct HourlyResponse {
        hourly: Option<HourlySeries>,
    }

    /// Open-Meteo fills hours it has no reading for with `null`.
    #[derive(Deserialize, Debug)]
    struct HourlySeries {
        time: Vec<String>,

        temperature_2m: Vec<Option<f64>>,

        relative_humidity_2m: Vec<Option<f64>>,

        wind_speed_10m: Vec<Option<f64>>,

        precipitation: Vec<Option<f64>>,
    }

    impl HourlySeries {
        fn into_forecast(self) -> Result<HourlyForecast, WeatherError> {
            let time = self
                .time
                .iter()
                .take(HourlyForecast::HOURS)
                .map(|stamp| time::parse_local(stamp))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| WeatherError::InvalidData {
                    feed: Feed::Hourly,
                    detail: format!("bad timestamp: {err}"),
                })?;

            Ok(HourlyForecast::new(
                time,
                self.temperature_2m,
                self.relative_humidity_2m,
                self.wind_speed_10m,
                self.precipitation,
            ))
        }
    }

    #[derive(Debug, Clone)]
    pub struct Forecaster {
        http: Client,
        url: String,
    }

    impl Forecaster {
        pub fn new(http: Client, url: impl Into<String>) -> Self {
            Self {
                http,
                url: url.into(),
            }
        }

        pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError> {
            debug!(lat, lon, "fetching current conditions");
            let body = self
                .get_body(
                    Feed::Current,
                    &[
                        ("latitude", lat.to_string()),
                        ("longitude", lon.to_string()),
                        ("current", CURRENT_FIELDS.to_string()),
                    ],
                )
                .await?;
            let parsed: CurrentResponse = decode(Feed::Current, &body)?;
            parsed.current.ok_or_else(|| WeatherError::InvalidData {
                feed: Feed::Current,
                detail: "response has no `current` object".to_string(),
            })
        }

        pub async fn hourly(&self, lat: f64, lon: f64) -> Result<HourlyForecast, WeatherError> {
            debug!(lat, lon, "fetching hourly forecast");
            let body = self
                .get_body(
                    Feed::Hourly,
                    &[
                        ("latitude", lat.to_string()),
                        ("longitude", lon.to_string()),
                        ("hourly", HOURLY_FIELDS.to_string()),
                        ("forecast_days", "1".to_string()),
                    ],
                )
                .await?;
            let parsed: HourlyResponse = decode(Feed::Hourly, &body)?;
            parsed
                .hourly
                .ok_or_else(|| WeatherError::InvalidData {
                    feed: Feed::Hourly,
                    detail: "response has no `hourly` object".to_string(),
                })?
                .into_forecast()
        }

        async fn get_body(&self, feed: Feed, params: &[(&str, String)]) -> Result<String, WeatherError> {
            let fetch_error = |source| WeatherError::Fetch { feed, source };
            self.http
                .get(&self.url)
                .query(params)
                .query(&[("timezone", "auto")])
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(fetch_error)?
                .text()
                .await
                .map_err(fetch_error)
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(feed: Feed, body: &str) -> Result<T, WeatherError> {
        serde_json::from_str(body).map_err(|err| WeatherError::InvalidData {
            feed,
            detail: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::forecast::Forecaster;
    use super::geocoding::{pick_place, Geocoder, Place};
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place(name: &str, code: &str) -> Place {
        Place {
            latitude: 1.0,
            longitude: 2.0,
            name: name.to_string(),
            country: Some(reference::country_name(code).to_string()),
            country_code: Some(code.to_string()),
        }
    }

    fn client() -> Client {
        http_client(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_pick_place_prefers_requested_country() {
        let places = vec![place("Paris", "US"), place("Paris", "FR")];
        let picked = pick_place(places, "FR").unwrap();
        assert_eq!(picked.country_code.as_deref(), Some("FR"));
    }

    #[test]
    fn test_pick_place_falls_back_to_first() {
        let places = vec![place("London", "CA"), place("London", "US")];
        let picked = pick_place(places, "GB").unwrap();
        assert_eq!(picked.country_code.as_deref(), Some("CA"));

        assert!(pick_place(Vec::new(), "GB").is_none());
    }

    #[tokio::test]
    async fn test_locate_sends_search_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Miami"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"latitude": 36.4, "longitude": -94.8, "name": "Miami", "country": "Canada", "country_code": "CA"},
                    {"latitude": 25.77, "longitude": -80.19, "name": "Miami", "country": "United States", "country_code": "US"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(client(), format!("{}/v1/search", server.uri()));
        let location = geocoder.locate("Miami", "US").await.unwrap();
        assert_eq!(location.country_code, "US");
        assert_eq!(location.country, "United States");
        assert_eq!(location.latitude, 25.77);
    }

    #[tokio::test]
    async fn test_locate_empty_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.4})))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(client(), format!("{}/v1/search", server.uri()));
        let err = geocoder.locate("Zzqx", "GB").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound { .. }));
        let message = err.to_string();
        assert!(message.contains("Zzqx"));
        assert!(message.contains("United Kingdom"));
    }

    #[tokio::test]
    async fn test_locate_server_error_is_connectivity() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(client(), format!("{}/v1/search", server.uri()));
        let err = geocoder.locate("Berlin", "DE").await.unwrap_err();
        assert!(matches!(err, WeatherError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_locate_unreachable_host_is_connectivity() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let geocoder = Geocoder::new(client(), format!("http://127.0.0.1:{port}/v1/search"));
        let err = geocoder.locate("Berlin", "DE").await.unwrap_err();
        assert!(matches!(err, WeatherError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_locate_malformed_body_is_connectivity() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(client(), format!("{}/v1/search", server.uri()));
        let err = geocoder.locate("Berlin", "DE").await.unwrap_err();
        assert!(matches!(err, WeatherError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .and(query_param("latitude", "25.77"))
            .and(query_param("timezone", "auto"))
            .and(query_param(
                "current",
                "temperature_2m,relative_humidity_2m,apparent_temperature,pressure_msl,wind_speed_10m,weather_code",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "time": "2024-07-01T15:00",
                    "temperature_2m": 31.4,
                    "relative_humidity_2m": 66,
                    "apparent_temperature": 36.2,
                    "pressure_msl": 1014.6,
                    "wind_speed_10m": 14.8,
                    "weather_code": 2
                }
            })))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let current = forecaster.current(25.77, -80.19).await.unwrap();
        assert_eq!(current.temperature, Some(31.4));
        assert_eq!(current.relative_humidity, Some(66.0));
        assert_eq!(current.weather_code, Some(2));
    }

    #[tokio::test]
    async fn test_current_null_reading_is_kept_as_missing() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "temperature_2m": 12.0,
                    "relative_humidity_2m": 80,
                    "apparent_temperature": null,
                    "pressure_msl": null,
                    "wind_speed_10m": 6.1,
                    "weather_code": null
                }
            })))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let current = forecaster.current(51.5, -0.12).await.unwrap();
        assert_eq!(current.temperature, Some(12.0));
        assert_eq!(current.apparent_temperature, None);
        assert_eq!(current.pressure, None);
        assert_eq!(current.weather_code, None);
    }

    #[tokio::test]
    async fn test_current_non_json_body_is_invalid_data() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let err = forecaster.current(25.77, -80.19).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::InvalidData {
                feed: Feed::Current,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Received invalid current weather data. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_current_missing_object_is_invalid_data() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"latitude": 25.77})))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let err = forecaster.current(25.77, -80.19).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::InvalidData {
                feed: Feed::Current,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_hourly_http_failure_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let err = forecaster.hourly(25.77, -80.19).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::Fetch {
                feed: Feed::Hourly,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Unable to get weather forecast. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_hourly_keeps_first_day() {
        let times: Vec<String> = (0..48)
            .map(|h| format!("2024-07-{:02}T{:02}:00", 1 + h / 24, h % 24))
            .collect();
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .and(query_param("forecast_days", "1"))
            .and(query_param(
                "hourly",
                "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hourly": {
                    "time": times,
                    "temperature_2m": vec![20.5; 48],
                    "relative_humidity_2m": vec![70; 48],
                    "wind_speed_10m": vec![9.3; 48],
                    "precipitation": vec![0.2; 48]
                }
            })))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let hourly = forecaster.hourly(25.77, -80.19).await.unwrap();
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly.wind_speed.len(), 24);
        assert_eq!(crate::units::time::hour_label(&hourly.time[15]), "3 PM");
    }

    #[tokio::test]
    async fn test_hourly_null_entry_is_a_gap() {
        let times: Vec<String> = (0..24).map(|h| format!("2024-07-01T{h:02}:00")).collect();
        let mut precipitation = vec![json!(0.1); 24];
        precipitation[23] = json!(null);
        let server = MockServer::start().await;
        Mock::given(path("/v1/forecast"))
            .and(query_param("forecast_days", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hourly": {
                    "time": times,
                    "temperature_2m": vec![18.0; 24],
                    "relative_humidity_2m": vec![60; 24],
                    "wind_speed_10m": vec![11.0; 24],
                    "precipitation": precipitation
                }
            })))
            .mount(&server)
            .await;

        let forecaster = Forecaster::new(client(), format!("{}/v1/forecast", server.uri()));
        let hourly = forecaster.hourly(25.77, -80.19).await.unwrap();
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly.precipitation[22], Some(0.1));
        assert_eq!(hourly.precipitation[23], None);
    }
}
