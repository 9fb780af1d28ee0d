//! Command-line interface.
//!
//! Besides the server, each scrape operation is exposed as a subcommand that
//! prints pretty JSON, for poking at the pipeline from a terminal.

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::service::ScrapeService;

#[derive(Parser)]
#[command(name = "timataka-api", about = "Icelandic road-race results API and scraper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List recent events
    Events {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List races for an event
    Races {
        /// Event id, e.g. "rvkmarathon-2025"
        event_id: String,
    },
    /// Fetch results for a race
    Results {
        /// Race id, e.g. "race-1"
        race_id: String,
        #[arg(long, default_value = "overall")]
        category: String,
    },
    /// Search contestants by name; the query may embed a birth year
    Search {
        query: String,
    },
}

fn build_service() -> anyhow::Result<ScrapeService> {
    let config = AppConfig::load()?;
    ScrapeService::new(&config.scraper)
}

pub async fn run_events(limit: usize) -> anyhow::Result<()> {
    let service = build_service()?;
    let events = service.events(limit).await;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

pub async fn run_races(event_id: String) -> anyhow::Result<()> {
    let service = build_service()?;
    let races = service.races(&event_id).await;
    println!("{}", serde_json::to_string_pretty(&races)?);
    Ok(())
}

pub async fn run_results(race_id: String, category: String) -> anyhow::Result<()> {
    let service = build_service()?;
    let results = service.results(&race_id, &category).await;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub async fn run_search(query: String) -> anyhow::Result<()> {
    let service = build_service()?;
    let found = service.search(&query).await;
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
