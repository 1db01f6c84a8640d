mod commands;

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, warn, Level};

use arb_api::{AppConfig, MemoryStore, PgStore, Store};
use commands::{answer, BotDeps, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::from_env()?;
    let token = config
        .bot_token()
        .ok_or_else(|| anyhow::anyhow!("BOT_TOKEN is not set"))?;

    let store: Arc<dyn Store> = match config.database_url() {
        Some(url) => {
            let store = PgStore::new(arb_api::db::init_db(url).await?);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, chat links will not be visible to the API");
            Arc::new(MemoryStore::new())
        }
    };

    let deps = Arc::new(BotDeps::new(store, config.miniapp_url())?);
    let bot = Bot::new(token);

    info!("Starting chat bot...");

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(answer);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![deps])
        .default_handler(|upd| async move {
            tracing::debug!("unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "an error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
