use std::sync::Arc;

use tokio::net::TcpListener;
use uitnodiging::config::Config;
use uitnodiging::store::SqliteStore;
use uitnodiging::{build_app, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    let store = Arc::new(SqliteStore::new(pool, "invites"));

    let app = build_app(AppState::from_config(&config, store));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
