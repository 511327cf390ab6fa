use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use motionserver::core::config::AppConfig;
use motionserver::core::shared::state::AppState;
use motionserver::core::shared::utils::{create_conn, run_migrations};
use motionserver::main_module::run_server;
use motionserver::security::password::{validate_password, PasswordHasher};
use motionserver::store::{PgRecordStore, RecordStore};

const USAGE: &str = "Usage: motionserver [serve | migrate | create-company <biz_no> <name> <password>]";

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("migrate") => migrate(&config),
        Some("create-company") => match &args[1..] {
            [biz_no, name, password] => create_company(config, biz_no, name, password).await,
            _ => Err(anyhow!(USAGE)),
        },
        Some("--help") | Some("-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => Err(anyhow!("Unknown command '{other}'. {USAGE}")),
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    let applied = run_migrations(&pool).context("Failed to run migrations")?;
    info!("Database ready ({applied} migrations applied)");

    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));
    let state = Arc::new(AppState::new(config, store)?);

    run_server(state).await.context("HTTP server failed")
}

fn migrate(config: &AppConfig) -> Result<()> {
    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    let applied = run_migrations(&pool).context("Failed to run migrations")?;
    info!("Applied {applied} pending migrations");
    Ok(())
}

async fn create_company(config: AppConfig, biz_no: &str, name: &str, password: &str) -> Result<()> {
    validate_password(password)?;

    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    run_migrations(&pool).context("Failed to run migrations")?;
    let store = PgRecordStore::new(pool);

    if store.find_company_by_biz_no(biz_no).await?.is_some() {
        warn!("Company {biz_no} already exists");
        return Err(anyhow!("Company with biz_no '{biz_no}' already exists"));
    }

    let hasher = PasswordHasher::with_defaults()?;
    let password_hash = hasher.hash(password)?;
    let company = store.create_company(biz_no, name, &password_hash).await?;

    info!("Created company {} ({})", company.biz_no, company.id);
    println!("{}", company.id);
    Ok(())
}
