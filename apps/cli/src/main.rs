//! routeman CLI — turn a framework route listing into a Postman collection.
//!
//! Runs `php artisan route:list --json` (or reads its saved output), groups
//! the routes into folders, and writes a Postman v2.1 collection file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
