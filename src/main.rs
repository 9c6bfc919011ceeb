use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod filter;
mod formatting;
mod inputter;
mod model;
mod theme;
mod ui;

use controller::Controller;
use domain::{RVConfig, RVError};
use model::{Model, Status};
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(
    name = "rowview",
    version,
    about = "A tui based tabular data viewer with live row filtering."
)]
struct Cli {
    /// Data file to view (csv or parquet)
    path: String,

    /// Maximum render width of a single column
    #[arg(long, default_value_t = 80)]
    max_column_width: usize,

    /// Comma separated column names to render as currency
    #[arg(long, value_delimiter = ',')]
    currency: Vec<String>,

    /// Write tracing output to this file (filtered via RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(path: &PathBuf) -> Result<(), RVError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run() -> Result<(), RVError> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }

    let path = shellexpand::full(&cli.path)
        .map_err(|e| RVError::LoadingFailed(e.to_string()))?
        .into_owned();

    let config = RVConfig::default()
        .with_max_column_width(cli.max_column_width)
        .with_currency_columns(cli.currency);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;

    let mut model = Model::init(&config, size.width as usize, size.height as usize)?;
    model.load_data_file(PathBuf::from(path))?;

    let controller = Controller::new(&config);
    let ui = TableUI::new(&config);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}
