//! End-to-end tests for the photo relay pipeline.
//!
//! One mock server plays all three remote parties: the Telegram Bot API
//! (reached through `Bot::set_api_url`), the Telegram file host (reached
//! through the pipeline's file base URL), and the Anthropic API.

use inkpal::anthropic::AnthropicClient;
use inkpal::bot::run_photo_pipeline;
use mockito::Matcher;
use serde_json::json;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;

const BOT_TOKEN: &str = "test_token";

fn photo(id: &str, width: u32, height: u32) -> PhotoSize {
    serde_json::from_value(json!({
        "file_id": id,
        "file_unique_id": format!("u_{id}"),
        "file_size": width * height,
        "width": width,
        "height": height,
    }))
    .unwrap()
}

fn photo_variants() -> Vec<PhotoSize> {
    vec![
        photo("small", 90, 90),
        photo("medium", 320, 320),
        photo("large", 1280, 1280),
    ]
}

fn test_bot(server: &mockito::ServerGuard) -> Bot {
    Bot::new(BOT_TOKEN).set_api_url(server.url().parse().unwrap())
}

/// Registers a GetFile mock resolving any lookup to `photos/file_1.jpg`.
async fn mock_get_file(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", Matcher::Regex("(?i)getfile".into()))
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "result": {
                    "file_id": "large",
                    "file_unique_id": "u_large",
                    "file_size": 1024,
                    "file_path": "photos/file_1.jpg",
                },
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn photo_pipeline_replies_with_extracted_text() {
    let mut server = mockito::Server::new_async().await;

    let get_file = mock_get_file(&mut server).await;
    let download = server
        .mock("GET", format!("/bot{BOT_TOKEN}/photos/file_1.jpg").as_str())
        .with_status(200)
        .with_body(b"jpeg-bytes".to_vec())
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/v1/files")
        .with_status(200)
        .with_body(json!({"id": "file_123", "type": "file"}).to_string())
        .create_async()
        .await;
    let completion = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text"},
                    {"type": "image", "source": {"type": "file", "file_id": "file_123"}},
                ],
            }],
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "msg_1",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "Dear friend..."}],
                "stop_reason": "end_turn",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let bot = test_bot(&server);
    let anthropic = AnthropicClient::with_base_url("test-key", server.url());

    let text = run_photo_pipeline(&bot, &anthropic, photo_variants(), &server.url())
        .await
        .unwrap();

    get_file.assert_async().await;
    download.assert_async().await;
    upload.assert_async().await;
    completion.assert_async().await;
    assert_eq!(text, "Dear friend...");
}

#[tokio::test]
async fn failed_download_stops_pipeline_before_upload() {
    let mut server = mockito::Server::new_async().await;

    let _get_file = mock_get_file(&mut server).await;
    let _download = server
        .mock("GET", format!("/bot{BOT_TOKEN}/photos/file_1.jpg").as_str())
        .with_status(404)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/v1/files")
        .expect(0)
        .create_async()
        .await;

    let bot = test_bot(&server);
    let anthropic = AnthropicClient::with_base_url("test-key", server.url());

    let err = run_photo_pipeline(&bot, &anthropic, photo_variants(), &server.url())
        .await
        .unwrap_err();

    upload.assert_async().await;
    assert!(err.to_string().contains("Failed to fetch file"));
}

#[tokio::test]
async fn empty_variant_list_fails_before_any_network_call() {
    let mut server = mockito::Server::new_async().await;

    let get_file = server
        .mock("POST", Matcher::Regex("(?i)getfile".into()))
        .expect(0)
        .create_async()
        .await;

    let bot = test_bot(&server);
    let anthropic = AnthropicClient::with_base_url("test-key", server.url());

    let err = run_photo_pipeline(&bot, &anthropic, Vec::new(), &server.url())
        .await
        .unwrap_err();

    get_file.assert_async().await;
    assert!(err.to_string().contains("No image found"));
}

#[tokio::test]
async fn empty_completion_content_fails_without_reply_text() {
    let mut server = mockito::Server::new_async().await;

    let _get_file = mock_get_file(&mut server).await;
    let _download = server
        .mock("GET", format!("/bot{BOT_TOKEN}/photos/file_1.jpg").as_str())
        .with_status(200)
        .with_body(b"jpeg-bytes".to_vec())
        .create_async()
        .await;
    let _upload = server
        .mock("POST", "/v1/files")
        .with_status(200)
        .with_body(json!({"id": "file_123", "type": "file"}).to_string())
        .create_async()
        .await;
    let _completion = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(json!({"id": "msg_1", "content": []}).to_string())
        .create_async()
        .await;

    let bot = test_bot(&server);
    let anthropic = AnthropicClient::with_base_url("test-key", server.url());

    let err = run_photo_pipeline(&bot, &anthropic, photo_variants(), &server.url())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("no content blocks"));
}
