//! Turns a [`Report`] into display-ready text fields and one chart per metric.
//!
//! The [`Renderer`] owns exactly one chart slot per [`Metric`]; presenting a new
//! report replaces the previous series in each slot.

use tracing::{debug, warn};

use crate::reference;
use crate::units::{rounding, time};
use crate::weather::{CurrentConditions, HourlyForecast, Location, Report};

/// Shown in place of a value the provider did not report.
pub const MISSING: &str = "--";

fn reading(value: Option<f64>, show: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| MISSING.to_string(), show)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherText {
    pub location_name: String,
    pub country_name: String,
    pub icon: &'static str,
    pub description: &'static str,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
}

impl WeatherText {
    pub fn new(location: &Location, current: &CurrentConditions) -> Self {
        let info = current
            .weather_code
            .map_or(reference::UNKNOWN_CONDITION, reference::weather_code_info);
        Self {
            location_name: location.name.clone(),
            country_name: location.country.clone(),
            icon: info.icon,
            description: info.description,
            temperature: reading(current.temperature, |t| rounding::nearest(t).to_string()),
            feels_like: reading(current.apparent_temperature, |t| {
                format!("{}°C", rounding::nearest(t))
            }),
            humidity: reading(current.relative_humidity, |h| format!("{h}%")),
            wind: reading(current.wind_speed, |w| format!("{} km/h", rounding::nearest(w))),
            pressure: reading(current.pressure, |p| format!("{p} hPa")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Wind,
    Precipitation,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Wind,
        Metric::Precipitation,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::Humidity => "Humidity (%)",
            Metric::Wind => "Wind Speed (km/h)",
            Metric::Precipitation => "Precipitation (mm)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Wind => " km/h",
            Metric::Precipitation => " mm",
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Metric::Precipitation => ChartKind::Bar,
            _ => ChartKind::Line,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }

    fn values<'a>(&self, hourly: &'a HourlyForecast) -> &'a [Option<f64>] {
        match self {
            Metric::Temperature => &hourly.temperature,
            Metric::Humidity => &hourly.humidity,
            Metric::Wind => &hourly.wind_speed,
            Metric::Precipitation => &hourly.precipitation,
        }
    }
}

/// One metric's hourly series with its shared hour labels. `None` marks an hour
/// without a reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub metric: Metric,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn new(metric: Metric, labels: Vec<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            metric,
            labels,
            values,
        }
    }

    /// (hour index, value) pairs for plotting; hours without a reading are left out.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, self.values.len().saturating_sub(1).max(1) as f64]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let max = self.values.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.values.iter().flatten().copied().fold(f64::INFINITY, f64::min);
        if !max.is_finite() {
            return [0.0, 1.0];
        }
        match self.metric {
            Metric::Humidity => [0.0, 100.0],
            Metric::Wind | Metric::Precipitation => [0.0, max.max(1.0)],
            Metric::Temperature => {
                let pad = ((max - min) * 0.1).max(1.0);
                [(min - pad).floor(), (max + pad).ceil()]
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    text: Option<WeatherText>,
    charts: [Option<ChartSeries>; 4],
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, report: &Report) {
        debug!(location = %report.location.name, "rendering report");
        self.text = Some(WeatherText::new(&report.location, &report.current));
        if report.hourly.is_empty() {
            warn!("hourly forecast has no entries, charts will be empty");
        }

        let labels: Vec<String> = report.hourly.time.iter().map(time::hour_label).collect();
        for metric in Metric::ALL {
            let values = metric.values(&report.hourly).to_vec();
            self.install(ChartSeries::new(metric, labels.clone(), values));
        }
    }

    fn install(&mut self, series: ChartSeries) {
        let slot = &mut self.charts[series.metric.slot()];
        if let Some(old) = slot.take() {
            debug!(metric = ?old.metric, "replacing chart");
        }
        *slot = Some(series);
    }

    pub fn text(&self) -> Option<&WeatherText> {
        self.text.as_ref()
    }

    pub fn chart(&self, metric: Metric) -> Option<&ChartSeries> {
        self.charts[metric.slot()].as_ref()
    }
}
