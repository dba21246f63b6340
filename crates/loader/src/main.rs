use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yamdb_core::clock::SystemClock;
use yamdb_db::DbPool;

#[derive(Parser)]
#[command(name = "yamdb-loader")]
#[command(about = "Manage YaMDb database contents from the command line")]
#[command(version)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the database contents with CSV fixtures
    Load {
        /// Directory holding genre.csv, category.csv, titles.csv, ...
        #[arg(long, env = "YAMDB_DATA_DIR", default_value = "static/data")]
        data_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Create an admin account with superuser rights
    CreateSuperuser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamdb_loader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .context("DATABASE_URL must be set or passed with --database-url")?;

    match cli.command {
        Commands::Load { data_dir, yes } => {
            if !yes && !yamdb_loader::prompt::confirm(io::stdin().lock(), io::stdout())? {
                tracing::info!("Import cancelled");
                return Ok(());
            }

            let pool = connect(&database_url).await?;
            let result = yamdb_loader::load(&pool, &data_dir, &SystemClock).await;
            pool.close().await;
            result.with_context(|| format!("Import from {} failed", data_dir.display()))?;
        }
        Commands::CreateSuperuser { username, email } => {
            let pool = connect(&database_url).await?;
            let result = yamdb_loader::create_superuser(&pool, &username, &email).await;
            pool.close().await;
            result.with_context(|| format!("Could not create superuser '{username}'"))?;
        }
    }
    Ok(())
}

async fn connect(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = yamdb_db::create_pool(database_url)
        .await
        .context("Failed to connect to database")?;
    yamdb_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}
