//! Connection test messages for the chat webhooks.

use chrono::{TimeZone, Utc};
use lectern_delivery::{DiscordSink, TelegramSink, is_discord_webhook_url};
use lectern_error::DeliveryErrorKind;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn discord_test_embed_is_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(body_partial_json(serde_json::json!({
            "username": "Lectern",
            "embeds": [{ "title": "Discord connection test" }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/webhooks/1/abc", server.uri());
    let sink = DiscordSink::new(reqwest::Client::new(), Some(url), "playwright");
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    sink.send_test(now).await.unwrap();
}

#[tokio::test]
async fn discord_unknown_webhook_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sink = DiscordSink::new(reqwest::Client::new(), Some(server.uri()), "");
    let err = sink.send_test(Utc::now()).await.unwrap_err();

    assert_eq!(err.kind(), &DeliveryErrorKind::Rejected(404));
}

#[tokio::test]
async fn telegram_test_message_goes_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:xyz/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": "42",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TelegramSink::new(
        reqwest::Client::new(),
        server.uri(),
        Some("123:xyz".to_string()),
        Some("42".to_string()),
        "",
    );

    sink.send_test().await.unwrap();
}

#[tokio::test]
async fn telegram_test_without_chat_fails_locally() {
    let sink = TelegramSink::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        Some("123:xyz".to_string()),
        None,
        "",
    );

    let err = sink.send_test().await.unwrap_err();
    assert!(matches!(err.kind(), DeliveryErrorKind::Transport(_)));
}

#[test]
fn webhook_url_shape() {
    assert!(is_discord_webhook_url("https://discord.com/api/webhooks/1/abc"));
    assert!(is_discord_webhook_url("https://discordapp.com/api/webhooks/1/abc"));
    assert!(!is_discord_webhook_url("https://discord.com/channels/1/2"));
    assert!(!is_discord_webhook_url("http://127.0.0.1:8080/hook"));
}
