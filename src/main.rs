mod api;
mod cli;
mod config;
mod error;
mod models;
mod services;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::models::MatchRequest;

#[derive(Parser)]
#[command(name = "matchcast")]
#[command(about = "Football match outcome prediction service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Predict a single match and print the result
    Predict {
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        #[arg(long)]
        home_rank: i64,
        #[arg(long)]
        away_rank: i64,
    },
    /// Show how a team name resolves and what history exists for it
    Team {
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting Matchcast API server on port {}", port);
            api::serve(port, config).await?;
        }
        Some(Commands::Predict { home, away, home_rank, away_rank }) => {
            let request = MatchRequest {
                home_team: home,
                away_team: away,
                home_rank,
                away_rank,
            };
            cli::predict_match(&config, request)?;
        }
        Some(Commands::Team { name }) => {
            cli::query_team(&config, &name)?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting Matchcast API server on port 8000");
            api::serve(8000, config).await?;
        }
    }

    Ok(())
}
