use anyhow::Context;
use clap::Parser;
use nba_value::cli::{Cli, Commands};
use nba_value::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load_optional(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?
    {
        Some(config) => config,
        None => {
            eprintln!("Warning: No config file at {}", cli.config);
            eprintln!("Using default configuration");
            Config::default()
        }
    };

    // Initialize telemetry
    nba_value::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Prepare(args) => {
            tracing::info!("Building features");
            args.execute(&config).await?;
        }
        Commands::Train(args) => {
            tracing::info!("Training win-probability model");
            args.execute(&config).await?;
        }
        Commands::Score(args) => {
            tracing::info!("Scoring odds");
            args.execute(&config).await?;
        }
        Commands::Fetch(args) => {
            tracing::info!("Fetching games from balldontlie");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
