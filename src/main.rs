use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use reelkit::cli::Cli;
use reelkit::config::EditorConfig;
use reelkit::ui::prelude::{Level, emit};
use reelkit::{commands, ui};

fn load_config(cli: &Cli) -> Result<EditorConfig> {
    match &cli.config {
        Some(path) => EditorConfig::load_from_path(path),
        None => EditorConfig::load(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    emit(
        Level::Debug,
        "config.loaded",
        &format!("Using config: {config:?}"),
        None,
    );
    commands::handle_command(cli.command, &config).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(cli.output, std::io::stdout().is_terminal());

    if let Err(err) = run(cli).await {
        emit(Level::Error, "error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
