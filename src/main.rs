mod cli;

use std::process;

use anyhow::Result;
use clap::Parser;
use cli::{command, setup_logging, Cli, Commands};
use ghcnd::FilterCriteria;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = cli.config();

    match cli.command {
        Commands::Inventory { filters, output } => {
            command::inventory(&config, &FilterCriteria::from(filters), output).await
        }
        Commands::Stations { ids } => command::stations(&config, &ids).await,
        Commands::Daily { filters, options } => {
            command::daily(&config, &FilterCriteria::from(filters), &options).await
        }
        Commands::Station {
            id,
            element,
            options,
        } => command::station(&config, &id, element.as_deref(), &options).await,
    }
}
