mod app;
mod cli;
mod clipboard;
mod config;
mod core;
mod display;
mod input;
mod providers;
mod render;
mod session;

use crate::app::Application;
use crate::cli::Args;
use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::core::error::GemtermError;
use crate::input::TerminalInput;
use crate::providers::gemini::GeminiProvider;
use crate::render::Renderer;
use is_terminal::IsTerminal;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (args, parse_warning) = Args::parse_lenient(std::env::args_os());
    init_tracing(args.verbose);

    if let Some(reason) = parse_warning {
        warn!(%reason, "Ignoring unrecognized arguments");
    }

    if let Err(e) = run(args).await {
        eprintln!("{}", console::style(format!("Error: {}", e)).bold().red());
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), GemtermError> {
    let config = Config::load(args.config.as_deref())?;
    let provider = GeminiProvider::from_config(&config)?;
    info!(model = %config.model, "Starting gemterm");

    let renderer = Renderer::new(std::io::stdout().is_terminal(), args.raw);
    let input = TerminalInput::new()?;

    let mut app = Application::new(
        Box::new(provider),
        renderer,
        Box::new(input),
        Box::new(SystemClipboard),
        Box::new(std::io::stdout()),
    );
    app.run(args.initial_mode()).await
}
