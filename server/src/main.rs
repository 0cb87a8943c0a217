use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use task_server::config::Config;
use task_server::store::events::LogSink;
use task_server::store::postgres::{build_pool, PgTaskStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let pool = build_pool(&config.database.url())?;
    let store = Arc::new(PgTaskStore::new(pool, Arc::new(LogSink)));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    task_server::run(listener, store).await?;
    Ok(())
}
