//! Telegram image retrieval.
//!
//! Resolves the highest-resolution variant of an inbound photo to a download
//! URL via the Bot API file lookup, then fetches the raw bytes over HTTP.

use anyhow::Result;
use log::info;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;

/// Base endpoint Telegram serves file content from.
pub const TELEGRAM_FILE_BASE_URL: &str = "https://api.telegram.org/file";

/// Removes and returns the highest-resolution variant of a photo.
///
/// Telegram orders the size variants ascending by resolution, so the last
/// element is the largest one.
pub fn select_highest_resolution(photos: &mut Vec<PhotoSize>) -> Result<PhotoSize> {
    photos
        .pop()
        .ok_or_else(|| anyhow::anyhow!("No image found in photo size list"))
}

/// Builds the download URL for a resolved file path.
pub fn file_download_url(base_url: &str, token: &str, file_path: &str) -> String {
    format!("{base_url}/bot{token}/{file_path}")
}

/// Fetches a file's content, failing on any non-success HTTP status.
pub async fn download_image(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Failed to fetch file from Telegram: HTTP {}",
            response.status()
        ));
    }

    Ok(response.bytes().await?.to_vec())
}

/// Downloads the highest-resolution variant of an inbound photo.
///
/// Two network round trips: the Bot API file lookup and the content GET.
/// Errors propagate immediately; there is no retry.
pub async fn fetch_telegram_image(
    bot: &Bot,
    photos: &mut Vec<PhotoSize>,
    file_base_url: &str,
) -> Result<Vec<u8>> {
    let photo = select_highest_resolution(photos)?;

    let file = bot.get_file(photo.file.id.clone()).await?;
    let url = file_download_url(file_base_url, bot.token(), &file.path);

    let bytes = download_image(&url).await?;
    info!(
        "Downloaded {} bytes for image {}x{}",
        bytes.len(),
        photo.width,
        photo.height
    );

    Ok(bytes)
}
