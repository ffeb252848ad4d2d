//! Message dispatch and the photo relay pipeline.
//!
//! Each inbound message is handled independently with no carried state: a
//! `/start` greeting, the photo pipeline (download, upload, completion,
//! reply), and a fallback instruction for plain text. Any other message kind
//! is ignored. Pipeline errors are not caught here; they propagate to the
//! dispatcher's default error handler and the user receives no reply.

use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, PhotoSize};

use crate::anthropic::AnthropicClient;
use crate::image;

/// Reply to the `/start` command.
pub const WELCOME_MESSAGE: &str =
    "Welcome to Inkpal! Please send an image of your handwritten text to get started.";

/// Reply to a text-only message, in MarkdownV2.
pub const SEND_IMAGE_MESSAGE: &str = "*Please send an image*";

/// Runs the three-step relay for one photo: fetch the image from Telegram,
/// upload it to Anthropic, request a completion, and return its text.
///
/// Strictly sequential; the first failing step aborts the pipeline.
pub async fn run_photo_pipeline(
    bot: &Bot,
    anthropic: &AnthropicClient,
    mut photos: Vec<PhotoSize>,
    file_base_url: &str,
) -> Result<String> {
    let image = image::fetch_telegram_image(bot, &mut photos, file_base_url).await?;
    let uploaded = anthropic.upload_file(image).await?;
    let message = anthropic.create_message(&uploaded.id).await?;

    Ok(message.first_text()?.to_string())
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    anthropic: &AnthropicClient,
    file_base_url: &str,
) -> Result<()> {
    info!("Received photo message from chat {}", msg.chat.id);

    let photos = msg.photo().map(<[PhotoSize]>::to_vec).unwrap_or_default();
    let text = run_photo_pipeline(bot, anthropic, photos, file_base_url).await?;

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    Ok(())
}

async fn handle_text_message(bot: &Bot, msg: &Message, text: &str) -> Result<()> {
    info!("Received text message from chat {}", msg.chat.id);

    if text == "/start" {
        bot.send_message(msg.chat.id, WELCOME_MESSAGE).await?;
    } else {
        bot.send_message(msg.chat.id, SEND_IMAGE_MESSAGE)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
    }

    Ok(())
}

/// Entry point for every inbound message. Messages that are neither photos
/// nor text (stickers, documents, voice notes) get no reply.
///
/// `file_base_url` is the Telegram file host, normally
/// [`image::TELEGRAM_FILE_BASE_URL`]; tests point it at a local server.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    anthropic: Arc<AnthropicClient>,
    file_base_url: &str,
) -> Result<()> {
    if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, &anthropic, file_base_url).await?;
    } else if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, text).await?;
    }

    Ok(())
}
