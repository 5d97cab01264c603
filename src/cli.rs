use std::path::PathBuf;
use std::time::Duration;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::openmeteo::{FORECAST_URL, GEOCODING_URL};

const ABOUT: &str = "City weather TUI";

const LONG_ABOUT: &str = "
TUI for looking up the weather of a city, sourced from Open-Meteo.

Pick a country, type a city name and press Enter. The dashboard shows the current conditions and
charts of the next 24 hours of temperature, humidity, wind speed and precipitation.

No API key is needed. Logs are written to a file because the terminal is occupied by the dashboard;
set RUST_LOG to change the level.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to fill in at startup (needs --country)")]
    pub city: Option<String>,

    #[arg(short, long, help = "Two-letter country code to preselect (e.g. US, GB, IN)")]
    pub country: Option<String>,

    #[arg(long, default_value_t = 10, help = "Timeout for each HTTP request, in seconds")]
    pub timeout: u64,

    #[arg(long, help = "Log file [default: citywx.log in the temp directory]")]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = GEOCODING_URL, hide = true)]
    pub geocoding_url: String,

    #[arg(long, default_value = FORECAST_URL, hide = true)]
    pub forecast_url: String,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("citywx.log"))
    }
}
