use std::sync::Arc;

use clap::Parser;
use memoria_core::{InMemoryFactStore, MemoriaConfig, PgFactStore, StoreHandle};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "memoria.toml")]
    config: String,

    /// Check database connectivity and exit
    #[arg(long, conflicts_with = "in_memory")]
    health: bool,

    /// Serve from a process-local store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match MemoriaConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.service.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let store: StoreHandle = if args.in_memory {
        tracing::warn!("Using in-memory fact store; data is lost on shutdown");
        Arc::new(InMemoryFactStore::new())
    } else {
        // Connect to DB
        let pool = match memoria_core::db::create_pool(&config.database).await {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        };

        if args.health {
            match memoria_core::db::health_check(&pool).await {
                Ok(v) => println!("✅ PostgreSQL connected: {}", v),
                Err(e) => {
                    println!("❌ PostgreSQL connection failed: {}", e);
                    std::process::exit(1);
                }
            }
            println!("✅ Memoria DB health check passed");
            return Ok(());
        }

        memoria_core::db::ensure_schema(&pool).await?;
        Arc::new(PgFactStore::new(pool))
    };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    memoria_server::http::start_http_server(store, config, tx.subscribe()).await?;

    Ok(())
}
