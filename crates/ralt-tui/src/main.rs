use anyhow::Result;
use clap::Parser;
use colored::*;
use ralt_core::{ApiClient, Config};

mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use cli::Cli;
use tui::{EventHandler, TICK_RATE};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Ignoring unreadable config:".yellow(), e);
            Config::new()
        }
    };

    let client = match cli.base_url.as_deref() {
        Some(url) => ApiClient::with_timeout(url, config.request_timeout()),
        None => ApiClient::from_config(&config),
    };

    match cli.command {
        Some(command) => {
            logging::init_stderr_logger();
            if let Err(e) = cli::run(command, client).await {
                eprintln!("{} {}", "Error:".bold().red(), e);
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let _guard = logging::init_file_logger();
            run_tui(client).await
        }
    }
}

async fn run_tui(client: ApiClient) -> Result<()> {
    tracing::info!("Starting TUI against {}", client.base_url());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::with_client(client);
    app.start_health_check();

    let mut events = EventHandler::new(TICK_RATE);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::render(&mut app, frame)) {
            break Err(e.into());
        }

        let Some(event) = events.next().await else {
            break Ok(());
        };

        if let Err(e) = handler::handle_event(&mut app, event).await {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    tui::restore()?;
    tracing::info!("TUI closed");
    result
}
