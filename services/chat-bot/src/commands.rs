//! Chat commands
//!
//! `/start` links the Telegram user to this chat so the API can relay bot
//! events here, then offers the Mini App button.

use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use teloxide::utils::command::BotCommands;
use tracing::info;
use url::Url;

use arb_api::Store;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

const FALLBACK_MINIAPP_URL: &str = "https://example.com";
const OPEN_APP_TEXT: &str = "Open ØNE-ARB";
const WELCOME_TEXT: &str = "Welcome to ØNE-ARB. Tap the button below to open the Mini App.";
const HELP_TEXT: &str = "Use /start to open the ØNE-ARB Mini App and connect your wallet. \
    After connecting, you can start/stop the bot and review reports.";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Open the Mini App")]
    Start,
    #[command(description = "Usage information")]
    Help,
}

/// Shared handler dependencies
pub struct BotDeps {
    pub store: Arc<dyn Store>,
    pub miniapp_url: Url,
}

impl BotDeps {
    pub fn new(store: Arc<dyn Store>, miniapp_url: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            miniapp_url: miniapp_url_or_fallback(miniapp_url)?,
        })
    }
}

fn miniapp_url_or_fallback(configured: Option<&str>) -> anyhow::Result<Url> {
    match configured.map(Url::parse) {
        Some(Ok(url)) => Ok(url),
        Some(Err(e)) => {
            tracing::warn!("MINIAPP_URL is not a valid URL ({}), using fallback", e);
            Ok(Url::parse(FALLBACK_MINIAPP_URL)?)
        }
        None => Ok(Url::parse(FALLBACK_MINIAPP_URL)?),
    }
}

pub fn open_app_keyboard(url: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        OPEN_APP_TEXT,
        WebAppInfo { url: url.clone() },
    )]])
}

pub async fn answer(bot: Bot, msg: Message, cmd: Command, deps: Arc<BotDeps>) -> HandlerResult {
    match cmd {
        Command::Start => {
            if let Some(user) = msg.from() {
                let telegram_user_id = user.id.0 as i64;
                deps.store.link_telegram_chat(telegram_user_id, msg.chat.id.0).await?;
                info!(telegram_user_id, chat_id = msg.chat.id.0, "Chat linked");
            }
            bot.send_message(msg.chat.id, WELCOME_TEXT)
                .reply_markup(open_app_keyboard(&deps.miniapp_url))
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_fallback_url() {
        assert_eq!(miniapp_url_or_fallback(None).unwrap().as_str(), "https://example.com/");
        assert_eq!(
            miniapp_url_or_fallback(Some("not a url")).unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            miniapp_url_or_fallback(Some("https://app.test/arb")).unwrap().as_str(),
            "https://app.test/arb"
        );
    }

    #[test]
    fn test_keyboard_opens_web_app() {
        let url = Url::parse("https://app.test/").unwrap();
        let markup = open_app_keyboard(&url);
        let button = &markup.inline_keyboard[0][0];

        assert_eq!(button.text, OPEN_APP_TEXT);
        match &button.kind {
            InlineKeyboardButtonKind::WebApp(info) => assert_eq!(info.url, url),
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "arb_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help", "arb_bot").unwrap(), Command::Help);
        assert!(Command::parse("/collect", "arb_bot").is_err());
    }
}
