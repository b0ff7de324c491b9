use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{CreatePoolCmd, Currency, Engine, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "lekka_admin")]
#[command(about = "Admin utilities for Lekka (bootstrap users, inspect ledgers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./lekka.db?mode=rwc")]
    database_url: String,

    /// Ledger currency code.
    #[arg(long, default_value = "INR", value_parser = parse_currency)]
    currency: Currency,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Pool(Pool),
    Stats(Stats),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, or update the profile of an existing one.
    Add(UserAddArgs),
    List,
}

#[derive(Args, Debug)]
struct UserAddArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct Pool {
    #[command(subcommand)]
    command: PoolCommand,
}

#[derive(Subcommand, Debug)]
enum PoolCommand {
    /// Open a group pool on behalf of a user.
    Create(PoolCreateArgs),
    List(PoolListArgs),
}

#[derive(Args, Debug)]
struct PoolCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    /// Target in major units, e.g. "5000" or "5000.50".
    #[arg(long)]
    target: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct PoolListArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct Stats {
    #[command(subcommand)]
    command: StatsCommand,
}

#[derive(Subcommand, Debug)]
enum StatsCommand {
    Dashboard(StatsArgs),
    Monthly(StatsArgs),
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[arg(long)]
    user: String,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .currency(cli.currency)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Add(args),
        }) => {
            let user = engine
                .register_user(&args.id, &args.name, args.phone.as_deref())
                .await?;
            println!("saved user: {} ({})", user.id, user.display_name);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.users().await? {
                println!(
                    "{}\t{}\t{}",
                    user.id,
                    user.display_name,
                    user.phone.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Pool(Pool {
            command: PoolCommand::Create(args),
        }) => {
            let target = Money::parse(&args.target, cli.currency)?;
            let mut cmd = CreatePoolCmd::new(args.owner, args.name, target);
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let pool = engine.create_pool(cmd).await?;
            println!("created pool: {} ({}, target {})", pool.id, pool.name, pool.target);
        }
        Command::Pool(Pool {
            command: PoolCommand::List(args),
        }) => {
            for (pool, progress) in engine.pools(&args.owner).await? {
                println!(
                    "{}\t{}\t{}\t{} of {}\t{:.0}%{}",
                    pool.id,
                    pool.name,
                    pool.status.as_str(),
                    progress.collected,
                    progress.target,
                    progress.as_fraction() * 100.0,
                    if progress.is_funded() { "\tfunded" } else { "" }
                );
            }
        }
        Command::Stats(Stats {
            command: StatsCommand::Dashboard(args),
        }) => {
            let stats = engine.dashboard_stats(&args.user).await?;
            println!("lekkas:        {}", stats.total_lekkas);
            println!("pending:       {}", stats.pending_lekkas);
            println!("net balance:   {}", stats.net_balance);
            println!("total tracked: {}", stats.total_tracked);
        }
        Command::Stats(Stats {
            command: StatsCommand::Monthly(args),
        }) => {
            for month in engine.monthly_stats(&args.user).await? {
                println!(
                    "{:04}-{:02}\t{} lekkas\tlent {}\tborrowed {}",
                    month.year, month.month, month.count, month.lent, month.borrowed
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_target_is_read_in_major_units() {
        let cli = Cli::try_parse_from([
            "lekka_admin",
            "--currency",
            "eur",
            "pool",
            "create",
            "--owner",
            "alice",
            "--name",
            "Goa trip",
            "--target",
            "5000,50",
        ])
        .unwrap();
        let Command::Pool(Pool {
            command: PoolCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected pool create");
        };
        let target = Money::parse(&args.target, cli.currency).unwrap();
        assert_eq!(target, Money::new(500_050, Currency::Eur));
        assert!(Money::parse("50.505", cli.currency).is_err());
    }
}
