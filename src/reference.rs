//! Static lookup tables: selectable countries, city hints and the WMO weather code table.

use crate::weather::WeatherCodeInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
}

pub const COUNTRIES: [Country; 20] = [
    Country { code: "US", name: "United States" },
    Country { code: "GB", name: "United Kingdom" },
    Country { code: "IN", name: "India" },
    Country { code: "CA", name: "Canada" },
    Country { code: "AU", name: "Australia" },
    Country { code: "DE", name: "Germany" },
    Country { code: "FR", name: "France" },
    Country { code: "JP", name: "Japan" },
    Country { code: "IT", name: "Italy" },
    Country { code: "ES", name: "Spain" },
    Country { code: "BR", name: "Brazil" },
    Country { code: "CN", name: "China" },
    Country { code: "RU", name: "Russia" },
    Country { code: "MX", name: "Mexico" },
    Country { code: "AR", name: "Argentina" },
    Country { code: "ZA", name: "South Africa" },
    Country { code: "EG", name: "Egypt" },
    Country { code: "TR", name: "Turkey" },
    Country { code: "TH", name: "Thailand" },
    Country { code: "SG", name: "Singapore" },
];

const SAMPLE_CITIES: [(&str, [&str; 5]); 5] = [
    ("US", ["New York", "Los Angeles", "Chicago", "Houston", "Miami"]),
    ("GB", ["London", "Manchester", "Birmingham", "Liverpool", "Edinburgh"]),
    ("IN", ["Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata"]),
    ("CA", ["Toronto", "Vancouver", "Montreal", "Calgary", "Ottawa"]),
    ("AU", ["Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide"]),
];

/// Hint shown in the city field before any country is chosen.
pub const NO_COUNTRY_HINT: &str = "Select a country first";

pub const UNKNOWN_CONDITION: WeatherCodeInfo = WeatherCodeInfo {
    description: "Unknown condition",
    icon: "🌡️",
};

// See: https://open-meteo.com/en/docs#weathervariables
const WEATHER_CODES: [(i32, WeatherCodeInfo); 28] = [
    (0, info("Clear sky", "☀️")),
    (1, info("Mainly clear", "🌤️")),
    (2, info("Partly cloudy", "⛅")),
    (3, info("Overcast", "☁️")),
    (45, info("Fog", "🌫️")),
    (48, info("Depositing rime fog", "🌫️")),
    (51, info("Light drizzle", "🌦️")),
    (53, info("Moderate drizzle", "🌦️")),
    (55, info("Dense drizzle", "🌧️")),
    (56, info("Light freezing drizzle", "🌧️")),
    (57, info("Dense freezing drizzle", "🌧️")),
    (61, info("Slight rain", "🌧️")),
    (63, info("Moderate rain", "🌧️")),
    (65, info("Heavy rain", "🌧️")),
    (66, info("Light freezing rain", "🌧️")),
    (67, info("Heavy freezing rain", "🌧️")),
    (71, info("Slight snow", "🌨️")),
    (73, info("Moderate snow", "❄️")),
    (75, info("Heavy snow", "❄️")),
    (77, info("Snow grains", "🌨️")),
    (80, info("Slight rain showers", "🌦️")),
    (81, info("Moderate rain showers", "🌧️")),
    (82, info("Violent rain showers", "🌧️")),
    (85, info("Slight snow showers", "🌨️")),
    (86, info("Heavy snow showers", "❄️")),
    (95, info("Thunderstorm", "⛈️")),
    (96, info("Thunderstorm with hail", "⛈️")),
    (99, info("Thunderstorm with heavy hail", "⛈️")),
];

const fn info(description: &'static str, icon: &'static str) -> WeatherCodeInfo {
    WeatherCodeInfo { description, icon }
}

pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRIES
        .iter()
        .find(|country| country.code.eq_ignore_ascii_case(code))
}

/// Display name for a country code, or the code itself when it is not in the table.
pub fn country_name(code: &str) -> &str {
    find_country(code).map_or(code, |country| country.name)
}

pub fn sample_cities(code: &str) -> Option<&'static [&'static str]> {
    SAMPLE_CITIES
        .iter()
        .find(|(country, _)| *country == code)
        .map(|(_, cities)| cities.as_slice())
}

pub fn city_hint(country: &Country) -> String {
    match sample_cities(country.code) {
        Some(cities) => format!("Enter city (e.g., {})...", cities[..3].join(", ")),
        None => format!("Enter city name in {}...", country.name),
    }
}

pub fn weather_code_info(code: i32) -> WeatherCodeInfo {
    WEATHER_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(UNKNOWN_CONDITION, |(_, info)| *info)
}
