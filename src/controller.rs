//! Input validation and screen state for the search dashboard.
//!
//! [`ViewController`] is created once at startup and owns every piece of mutable UI
//! state: the selected country, the city text, the in-flight flag, the visible
//! [`UiState`] and the [`Renderer`] with its chart slots.

use tracing::{debug, info, warn};

use crate::error::WeatherError;
use crate::reference::{self, Country};
use crate::render::Renderer;
use crate::search::SearchRequest;
use crate::weather::Report;

const MIN_CITY_LEN: usize = 2;

/// Where the user is in filling in the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    NoCountry,
    CountrySelected,
    ReadyToSearch,
}

/// The one screen region that is visible below the search form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading,
    Error(String),
    Results,
}

#[derive(Debug)]
pub struct ViewController {
    country: Option<&'static Country>,
    city: String,
    hint: String,
    search_enabled: bool,
    in_flight: bool,
    state: UiState,
    renderer: Renderer,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            country: None,
            city: String::new(),
            hint: reference::NO_COUNTRY_HINT.to_string(),
            search_enabled: false,
            in_flight: false,
            state: UiState::Idle,
            renderer: Renderer::new(),
        }
    }

    /// Country change. `None` (or an unknown code) deselects.
    pub fn select_country(&mut self, code: Option<&str>) {
        let country = code.and_then(reference::find_country);
        if let (Some(code), None) = (code, country) {
            warn!(code, "unknown country code");
        }

        self.country = country;
        self.city.clear();
        self.search_enabled = false;
        match country {
            Some(country) => {
                self.hint = reference::city_hint(country);
                info!(country = country.name, "country selected");
            }
            None => {
                self.hint = reference::NO_COUNTRY_HINT.to_string();
                debug!("country cleared, city input disabled");
            }
        }
        self.transition(UiState::Idle);
    }

    /// Replaces the city text. Ignored while no country is selected.
    pub fn input_city(&mut self, text: &str) {
        if self.country.is_none() {
            return;
        }
        self.city = text.to_string();
        self.refresh_search_enabled();
        if !self.city.trim().is_empty() && matches!(self.state, UiState::Error(_)) {
            self.transition(UiState::Idle);
        }
    }

    pub fn push_city_char(&mut self, c: char) {
        let mut text = self.city.clone();
        text.push(c);
        self.input_city(&text);
    }

    pub fn pop_city_char(&mut self) {
        let mut text = self.city.clone();
        text.pop();
        self.input_city(&text);
    }

    /// Search invocation. Returns the request to run, or `None` when the search is
    /// dropped (already in flight, or search disabled).
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        if self.in_flight {
            debug!("already loading, ignoring search request");
            return None;
        }

        let city = self.city.trim().to_string();
        let country = match self.country {
            Some(country) if !city.is_empty() => country,
            _ => {
                self.transition(UiState::Error(WeatherError::Validation.to_string()));
                return None;
            }
        };
        if !self.search_enabled {
            return None;
        }

        let request = SearchRequest {
            city,
            country_code: country.code,
        };
        info!(city = %request.city, country = country.code, "starting weather search");

        self.in_flight = true;
        self.search_enabled = false;
        self.transition(UiState::Loading);
        Some(request)
    }

    pub fn finish_search(&mut self, outcome: Result<Report, WeatherError>) {
        self.in_flight = false;
        match outcome {
            Ok(report) => {
                self.renderer.present(&report);
                self.transition(UiState::Results);
            }
            Err(err) => {
                warn!(error = ?err, "search failed");
                self.transition(UiState::Error(err.to_string()));
            }
        }
        self.refresh_search_enabled();
    }

    /// Dismisses a shown error; search becomes available again if the inputs are valid.
    pub fn retry(&mut self) {
        if !matches!(self.state, UiState::Error(_)) {
            return;
        }
        self.transition(UiState::Idle);
        self.refresh_search_enabled();
    }

    /// The only place `state` changes, so exactly one region is ever visible.
    fn transition(&mut self, next: UiState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "ui transition");
        }
        self.state = next;
    }

    fn inputs_valid(&self) -> bool {
        self.country.is_some() && self.city.trim().chars().count() >= MIN_CITY_LEN
    }

    fn refresh_search_enabled(&mut self) {
        self.search_enabled = self.inputs_valid() && !self.in_flight;
    }

    pub fn phase(&self) -> InputPhase {
        match self.country {
            None => InputPhase::NoCountry,
            Some(_) if self.search_enabled => InputPhase::ReadyToSearch,
            Some(_) => InputPhase::CountrySelected,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn country(&self) -> Option<&'static Country> {
        self.country
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn city_enabled(&self) -> bool {
        self.country.is_some()
    }

    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}
