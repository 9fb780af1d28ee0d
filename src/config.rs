//! Configuration for the Timataka API.

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Serve the static mock dataset instead of scraping.
    #[serde(default)]
    pub mock: bool,
    /// Enable the on-disk response cache.
    #[serde(default = "default_cache")]
    pub cache: bool,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// How many recent races the search window spans.
    #[serde(default = "default_recent_races")]
    pub recent_races: usize,
}

fn default_cache() -> bool {
    true
}

fn default_cache_dir() -> String {
    "data/cache".to_string()
}

fn default_recent_races() -> usize {
    5
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            mock: false,
            cache: default_cache(),
            cache_dir: default_cache_dir(),
            recent_races: default_recent_races(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (TIMATAKA_SCRAPER_MOCK, etc.)
            .add_source(
                config::Environment::with_prefix("TIMATAKA")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
