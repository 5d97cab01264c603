use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, fs::OpenOptions, io, path::Path, sync::Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod controller;
mod error;
mod openmeteo;
mod reference;
mod render;
mod search;
mod units;
mod weather;

use crate::app::{run_app, App};
use crate::cli::Args;
use crate::controller::ViewController;
use crate::search::Services;

fn init_tracing(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args.log_path())?;

    let services = Services::new(args.timeout(), &args.geocoding_url, &args.forecast_url)?;
    let mut app = App::new(ViewController::new());
    app.preset(args.country.as_deref(), args.city.as_deref());
    info!("weather application initialized");

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, services).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err}");
        return Err(err.into());
    }

    Ok(())
}
