use anyhow::Result;
use log::info;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;

use inkpal::anthropic::AnthropicClient;
use inkpal::bot::message_handler;
use inkpal::image::TELEGRAM_FILE_BASE_URL;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting Inkpal Telegram Bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // A missing token yields an empty credential; the bot then fails at the
    // Telegram handshake rather than at startup.
    let bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();

    // Both clients are constructed once and shared across all requests.
    let bot = Bot::new(bot_token);
    let anthropic = Arc::new(AnthropicClient::from_env());

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry().branch(Update::filter_message().endpoint({
        let anthropic = Arc::clone(&anthropic);
        move |bot: Bot, msg: Message| {
            let anthropic = Arc::clone(&anthropic);
            async move { message_handler(bot, msg, anthropic, TELEGRAM_FILE_BASE_URL).await }
        }
    }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
