use review_service::infra::{AppConfig, StorageBackend};
use review_service::{PostgresReviewStore, ReviewStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads the same environment as api_server:\n\
           DATABASE_URL or DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME, DB_SSLMODE\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  LISTEN_ADDR={}", config.listen_addr);
    println!("  STORAGE_BACKEND={:?}", config.storage_backend);
    println!("  REQUEST_TIMEOUT_MS={}", config.request_timeout.as_millis());

    if config.storage_backend == StorageBackend::Memory {
        println!("> Preflight OK (in-memory storage, nothing to check).");
        return Ok(());
    }

    match &config.database.url {
        Some(_) => println!("  DATABASE_URL=<set>"),
        None => println!(
            "  DB={}@{}:{}/{} sslmode={}",
            config.database.user,
            config.database.host,
            config.database.port,
            config.database.name,
            config.database.ssl_mode
        ),
    }

    let store = PostgresReviewStore::connect(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Postgres: {}", e))?;

    store.ping().await?;
    println!("  Database reachable (SELECT 1 ok).");

    if !store.table_exists().await? {
        return Err(anyhow::anyhow!(
            "Table `review` does not exist. Apply sql/review.sql first."
        ));
    }
    println!("  Table `review` exists.");

    let rows = store.get_all().await?;
    println!("  Table readable ({} rows).", rows.len());

    println!("> Preflight OK.");
    Ok(())
}
