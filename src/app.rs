use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType,
        Paragraph, Row, Table, Wrap,
    },
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::controller::{InputPhase, UiState, ViewController};
use crate::error::WeatherError;
use crate::reference::COUNTRIES;
use crate::render::{ChartKind, ChartSeries, Metric, WeatherText, MISSING};
use crate::search::{SearchRequest, Services};
use crate::weather::Report;

const HELP: &str = " Tab: switch field  ↑/↓: country  Enter: search  Ctrl-R: retry  Esc: quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Country,
    City,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Search(SearchRequest),
}

/// Key handling on top of the [`ViewController`]. The country selector is a
/// cursor over "no country" (0) followed by every entry of [`COUNTRIES`].
#[derive(Debug)]
pub struct App {
    controller: ViewController,
    focus: Focus,
    country_cursor: usize,
}

impl App {
    pub fn new(controller: ViewController) -> Self {
        Self {
            controller,
            focus: Focus::Country,
            country_cursor: 0,
        }
    }

    /// Applies command line presets before the first frame.
    pub fn preset(&mut self, country: Option<&str>, city: Option<&str>) {
        if let Some(code) = country {
            let index = COUNTRIES
                .iter()
                .position(|c| c.code.eq_ignore_ascii_case(code))
                .map_or(0, |i| i + 1);
            self.choose_country(index);
            if index == 0 {
                // keeps the warning for the unknown code in the log
                self.controller.select_country(Some(code));
            }
        }
        if let Some(city) = city {
            self.controller.input_city(city);
            if self.controller.city_enabled() {
                self.focus = Focus::City;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('r') if ctrl => {
                self.controller.retry();
                return Action::None;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return Action::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Country => match key.code {
                KeyCode::Up | KeyCode::Left => {
                    let len = COUNTRIES.len() + 1;
                    self.choose_country((self.country_cursor + len - 1) % len);
                }
                KeyCode::Down | KeyCode::Right => {
                    self.choose_country((self.country_cursor + 1) % (COUNTRIES.len() + 1));
                }
                KeyCode::Enter => self.toggle_focus(),
                _ => {}
            },
            Focus::City => match key.code {
                KeyCode::Char(c) if !ctrl => self.controller.push_city_char(c),
                KeyCode::Backspace => self.controller.pop_city_char(),
                KeyCode::Enter => {
                    if let Some(request) = self.controller.begin_search() {
                        return Action::Search(request);
                    }
                }
                _ => {}
            },
        }
        Action::None
    }

    pub fn finish_search(&mut self, outcome: Result<Report, WeatherError>) {
        self.controller.finish_search(outcome);
    }

    fn choose_country(&mut self, index: usize) {
        self.country_cursor = index;
        let code = index.checked_sub(1).map(|i| COUNTRIES[i].code);
        self.controller.select_country(code);
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Country if self.controller.city_enabled() => Focus::City,
            _ => Focus::Country,
        };
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    services: Services,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match app.handle_key(key) {
                        Action::Quit => return Ok(()),
                        Action::Search(request) => {
                            let services = services.clone();
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let outcome = services.search(&request).await;
                                // receiver only goes away on quit
                                let _ = tx.send(outcome);
                            });
                        }
                        Action::None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            },
            Some(outcome) = rx.recv() => {
                debug!(ok = outcome.is_ok(), "search finished");
                app.finish_search(outcome);
            }
        }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn focused(block: Block<'_>, on: bool) -> Block<'_> {
    if on {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

fn display_form(f: &mut Frame, area: Rect, app: &App) {
    let controller = app.controller();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),
            Constraint::Min(20),
            Constraint::Length(14),
        ])
        .split(area);

    let country = match controller.country() {
        Some(country) => Span::styled(country.name, Style::default().fg(Color::Green)),
        None => Span::styled(
            "Choose your country...",
            Style::default().fg(Color::DarkGray),
        ),
    };
    let country_widget =
        Paragraph::new(Line::from(vec![Span::raw(" ◀ "), country, Span::raw(" ▶")]))
            .block(focused(panel("Country"), app.focus() == Focus::Country));
    f.render_widget(country_widget, chunks[0]);

    let city = if controller.city().is_empty() {
        Span::styled(controller.hint(), Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(controller.city(), Style::default().fg(Color::Green))
    };
    let mut city_block = focused(panel("City"), app.focus() == Focus::City);
    if controller.phase() == InputPhase::NoCountry {
        city_block = city_block.border_style(Style::default().fg(Color::DarkGray));
    }
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::raw(" "), city])).block(city_block),
        chunks[1],
    );

    let (label, style) = if controller.is_loading() {
        ("Loading…", Style::default().fg(Color::Yellow))
    } else if controller.search_enabled() {
        (
            "Search",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("Search", Style::default().fg(Color::DarkGray))
    };
    f.render_widget(
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(panel("")),
        chunks[2],
    );
}

fn display_idle(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(" Pick a country, type a city and press Enter to see its weather."),
    ];
    f.render_widget(Paragraph::new(text).block(panel("Weather")), area);
}

fn display_loading(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Fetching weather data...",
            Style::default().fg(Color::Yellow),
        )),
    ];
    f.render_widget(Paragraph::new(text).block(panel("Weather")), area);
}

fn display_error(f: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(" Press Ctrl-R to try again."),
    ];
    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(panel("Something went wrong")),
        area,
    );
}

fn display_current_conditions(text: &WeatherText) -> Table<'_> {
    let value = Style::default().fg(Color::Green);
    let temperature = if text.temperature == MISSING {
        MISSING.to_string()
    } else {
        format!("{}°C", text.temperature)
    };
    let rows = vec![
        Row::new(vec![Cell::from("")]),
        Row::new(vec![
            Cell::from(" Location"),
            Cell::from(format!("{}, {}", text.location_name, text.country_name)).style(value),
        ]),
        Row::new(vec![
            Cell::from(" Conditions"),
            Cell::from(format!("{} {}", text.icon, text.description)).style(value),
        ]),
        Row::new(vec![
            Cell::from(" Temperature"),
            Cell::from(temperature).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Row::new(vec![
            Cell::from(" Feels like"),
            Cell::from(text.feels_like.as_str()).style(value),
        ]),
        Row::new(vec![
            Cell::from(" Humidity"),
            Cell::from(text.humidity.as_str()).style(value),
        ]),
        Row::new(vec![
            Cell::from(" Wind"),
            Cell::from(text.wind.as_str()).style(value),
        ]),
        Row::new(vec![
            Cell::from(" Pressure"),
            Cell::from(text.pressure.as_str()).style(value),
        ]),
    ];

    Table::new(rows, [Constraint::Length(13), Constraint::Min(10)])
        .block(panel("Current Conditions"))
}

fn metric_color(metric: Metric) -> Color {
    match metric {
        Metric::Temperature => Color::Cyan,
        Metric::Humidity => Color::LightYellow,
        Metric::Wind => Color::LightRed,
        Metric::Precipitation => Color::Blue,
    }
}

/// First, middle and last hour labels; the axis spreads them evenly.
fn axis_labels(series: &ChartSeries) -> Vec<Span<'static>> {
    let n = series.labels.len();
    if n == 0 {
        return Vec::new();
    }
    let mut picks = vec![0, n / 2, n - 1];
    picks.dedup();
    picks
        .into_iter()
        .map(|i| Span::raw(series.labels[i].clone()))
        .collect()
}

fn display_line_chart(f: &mut Frame, area: Rect, series: &ChartSeries) {
    let points = series.points();
    let metric = series.metric;
    let [y_min, y_max] = series.y_bounds();
    let dataset = Dataset::default()
        .name(metric.unit().trim())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(metric_color(metric)))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(panel(metric.title()))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(series.x_bounds())
                .labels(axis_labels(series)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.0}{}", metric.unit())),
                    Span::raw(format!("{y_max:.0}{}", metric.unit())),
                ]),
        );
    f.render_widget(chart, area);
}

fn display_bar_chart(f: &mut Frame, area: Rect, series: &ChartSeries) {
    // bars hold tenths of a millimetre; an hour without a reading is an empty bar
    let bars: Vec<Bar> = series
        .values
        .iter()
        .zip(&series.labels)
        .enumerate()
        .map(|(i, (mm, label))| {
            let label = if i % 6 == 0 { label.clone() } else { String::new() };
            Bar::default()
                .value((mm.unwrap_or(0.0).max(0.0) * 10.0).round() as u64)
                .text_value(String::new())
                .label(Line::from(label))
                .style(Style::default().fg(metric_color(series.metric)))
        })
        .collect();
    let [_, y_max] = series.y_bounds();

    let chart = BarChart::default()
        .block(panel(series.metric.title()))
        .bar_width(2)
        .bar_gap(1)
        .max((y_max * 10.0).ceil() as u64)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn display_chart(f: &mut Frame, area: Rect, series: Option<&ChartSeries>) {
    match series {
        Some(series) => match series.metric.kind() {
            ChartKind::Line => display_line_chart(f, area, series),
            ChartKind::Bar => display_bar_chart(f, area, series),
        },
        None => f.render_widget(panel("--"), area),
    }
}

fn display_results(f: &mut Frame, area: Rect, app: &App) {
    let renderer = app.controller().renderer();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(30)])
        .split(area);

    if let Some(text) = renderer.text() {
        f.render_widget(display_current_conditions(text), chunks[0]);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let mut cells = Vec::with_capacity(4);
    for row in rows.iter() {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        cells.extend(halves.iter().copied());
    }
    for (metric, cell) in Metric::ALL.into_iter().zip(cells) {
        display_chart(f, cell, renderer.chart(metric));
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(10),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                " City Weather ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(HELP, Style::default().fg(Color::DarkGray)),
        ])),
        vert_layout[0],
    );
    display_form(f, vert_layout[1], app);

    let body = vert_layout[2];
    match app.controller().state() {
        UiState::Idle => display_idle(f, body),
        UiState::Loading => display_loading(f, body),
        UiState::Error(message) => display_error(f, body, message),
        UiState::Results => display_results(f, body, app),
    }
}
