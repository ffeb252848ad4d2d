//! # Inkpal Telegram Bot
//!
//! A Telegram bot that transcribes handwritten text from photos by relaying
//! them to the Anthropic API: download the photo from Telegram, upload it to
//! the Files API, then request a vision completion referencing the uploaded
//! file and reply with the result.

pub mod anthropic;
pub mod bot;
pub mod image;
pub mod prompt;
