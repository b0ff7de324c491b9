use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use engine::{Currency, LogNotifier, MaxAge, NoExpiry, TokenPolicy};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = settings::Cli::parse();
    let settings = settings::Settings::new(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "lekka={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let currency = Currency::try_from(settings.engine.currency.as_str())?;
    let token_policy: Arc<dyn TokenPolicy> = match settings.engine.token_max_age_hours {
        Some(hours) if hours > 0 => Arc::new(MaxAge(chrono::Duration::hours(hours))),
        Some(hours) => {
            return Err(format!("token_max_age_hours must be positive, got {hours}").into());
        }
        None => Arc::new(NoExpiry),
    };

    let engine = engine::Engine::builder()
        .database(db)
        .currency(currency)
        .notifier(Arc::new(LogNotifier))
        .token_policy(token_policy)
        .build()
        .await?;
    tracing::info!("ledger currency: {currency}");

    let addr: SocketAddr =
        format!("{}:{}", settings.server.bind, settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
