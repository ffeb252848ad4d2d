//! The fixed task prompt sent alongside every uploaded image.

/// User-facing task prompt attached to each completion request.
///
/// The reply is sent back to Telegram with `MarkdownV2` formatting, so the
/// prompt asks the model to produce output that is already valid MarkdownV2.
pub const PROMPT: &str = "Transcribe the handwritten text in the attached image. \
Reproduce the writing faithfully: keep the original line breaks, spelling and \
punctuation, and mark any word you cannot read as [illegible]. If the image \
contains no handwriting, say so briefly. Format your entire answer as Telegram \
MarkdownV2, escaping the characters _ * [ ] ( ) ~ ` > # + - = | { } . ! with a \
backslash wherever they appear in the transcription.";
