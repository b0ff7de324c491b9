//! Handles settings for the application.
//!
//! Sources, later ones winning: `config/lekka.toml` (or the file given with
//! `--config`), `LEKKA__*` environment variables, then command line flags.
use std::path::PathBuf;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "lekka")]
#[command(about = "Informal debt ledger server")]
pub struct Cli {
    /// Configuration file. Defaults to `config/lekka.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level for the workspace crates.
    #[arg(long)]
    pub level: Option<String>,

    /// Port the HTTP server listens on.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Engine {
    pub currency: String,
    pub token_max_age_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub engine: Engine,
}

impl Settings {
    pub fn new(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name("config/lekka").required(false),
        };

        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("engine.currency", "INR")?
            .add_source(file)
            .add_source(Environment::with_prefix("LEKKA").separator("__"))
            .set_override_option("app.level", cli.level.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .build()?
            .try_deserialize()
    }
}
