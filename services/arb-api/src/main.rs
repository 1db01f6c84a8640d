use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

use arb_api::{AppConfig, AppState, ChatRelay, MemoryStore, PgStore, Store, TelegramRelay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting arbitrage bot API...");

    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match config.database_url() {
        Some(url) => {
            info!("Connecting to database...");
            let pool = arb_api::db::init_db(url).await?;
            let store = PgStore::new(pool);
            info!("Running migrations...");
            store.migrate().await?;
            info!("Database ready");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, using in-process store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let relay: Option<Arc<dyn ChatRelay>> = match config.bot_token() {
        Some(token) => {
            let timeout = Duration::from_secs(config.chat_relay_timeout_secs);
            Some(Arc::new(TelegramRelay::new(token, timeout)?))
        }
        None => {
            info!("BOT_TOKEN not set, chat relay disabled");
            None
        }
    };

    let port = config.port;
    let state = Arc::new(AppState::new(config, store, relay));
    let app = arb_api::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API listening on port {}", port);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
