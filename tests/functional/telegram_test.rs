//! Functional tests for the Telegram front-end against a mock Bot API

mod common;

use common::{StubProvider, UnreachableProvider};
use imagegen_bot::bot::handler::{Bot, GENERATING_NOTICE};
use imagegen_bot::bot::telegram::{Chat, Message, SendMessage, TelegramClient};
use imagegen_bot::config::Settings;
use imagegen_bot::error::AppError;
use imagegen_bot::gateway::FallbackChain;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.telegram.api_base = server.uri();
    settings.telegram.bot_token = TOKEN.to_string();
    settings
}

fn api_path(method_name: &str) -> String {
    format!("/bot{}/{}", TOKEN, method_name)
}

fn sent_message(message_id: i64) -> serde_json::Value {
    json!({
        "ok": true,
        "result": { "message_id": message_id, "chat": { "id": 1 }, "text": "ok" }
    })
}

async fn mount_api(server: &MockServer, photos: u64, edits: u64) {
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(10)))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("sendPhoto")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(11)))
        .expect(photos)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("editMessageText")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })))
        .expect(edits)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("deleteMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })))
        .mount(server)
        .await;
}

fn incoming(text: &str) -> Message {
    Message {
        message_id: 5,
        chat: Chat { id: 1 },
        text: Some(text.to_string()),
    }
}

fn bot(server: &MockServer, chain: FallbackChain) -> Bot {
    let settings = settings(server);
    let telegram = Arc::new(TelegramClient::new(&settings.telegram).unwrap());
    Bot::new(telegram, Arc::new(chain), &settings)
}

async fn requests_to(server: &MockServer, method_name: &str) -> Vec<Request> {
    let wanted = api_path(method_name);
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

#[tokio::test]
async fn test_image_command_sends_photo_from_primary() {
    let server = MockServer::start().await;
    mount_api(&server, 1, 0).await;

    let chain = FallbackChain::new(
        Arc::new(StubProvider::succeeding("A", b"IMG_A")),
        Arc::new(UnreachableProvider),
        400,
    );
    bot(&server, chain).handle_message(incoming("/img 512 512 a cute cat")).await;

    let notices = requests_to(&server, "sendMessage").await;
    assert_eq!(notices.len(), 1);
    assert!(body_text(&notices[0]).contains(GENERATING_NOTICE));

    assert_eq!(requests_to(&server, "deleteMessage").await.len(), 1);

    let photo = body_text(&requests_to(&server, "sendPhoto").await[0]);
    assert!(photo.contains("IMG_A"));
    assert!(photo.contains("512x512"));
    assert!(photo.contains("Source:* A"));
}

#[tokio::test]
async fn test_fallback_updates_progress_notice() {
    let server = MockServer::start().await;
    mount_api(&server, 1, 1).await;

    let chain = FallbackChain::new(
        Arc::new(StubProvider::failing("A")),
        Arc::new(StubProvider::succeeding("B", b"IMG_B")),
        400,
    );
    bot(&server, chain).handle_message(incoming("/img a cute cat")).await;

    let edit = body_text(&requests_to(&server, "editMessageText").await[0]);
    assert!(edit.contains("A failed, trying B"));

    let photo = body_text(&requests_to(&server, "sendPhoto").await[0]);
    assert!(photo.contains("IMG_B"));
}

#[tokio::test]
async fn test_total_failure_invites_retry() {
    let server = MockServer::start().await;
    mount_api(&server, 0, 1).await;

    let chain = FallbackChain::new(
        Arc::new(StubProvider::failing("A")),
        Arc::new(StubProvider::failing("B")),
        400,
    );
    bot(&server, chain).handle_message(incoming("/img a cute cat")).await;

    let messages = requests_to(&server, "sendMessage").await;
    assert_eq!(messages.len(), 2);
    assert!(body_text(&messages[1]).contains("try again later"));
}

#[tokio::test]
async fn test_long_prompt_rejected_without_notice() {
    let server = MockServer::start().await;
    mount_api(&server, 0, 0).await;

    let primary = Arc::new(StubProvider::succeeding("A", b"IMG_A"));
    let chain = FallbackChain::new(primary.clone(), Arc::new(UnreachableProvider), 400);
    let text = format!("/img {}", "x".repeat(401));
    bot(&server, chain).handle_message(incoming(&text)).await;

    let messages = requests_to(&server, "sendMessage").await;
    assert_eq!(messages.len(), 1);
    assert!(body_text(&messages[0]).contains("Prompt is too long. Maximum 400 characters allowed."));
    assert_eq!(primary.calls(), 0);
}

#[tokio::test]
async fn test_image_command_without_arguments_shows_usage() {
    let server = MockServer::start().await;
    mount_api(&server, 0, 0).await;

    let chain = FallbackChain::new(Arc::new(UnreachableProvider), Arc::new(UnreachableProvider), 400);
    bot(&server, chain).handle_message(incoming("/img")).await;

    let messages = requests_to(&server, "sendMessage").await;
    assert_eq!(messages.len(), 1);
    assert!(body_text(&messages[0]).contains("Please provide a prompt"));
}

#[tokio::test]
async fn test_help_and_plain_text() {
    let server = MockServer::start().await;
    mount_api(&server, 0, 0).await;

    let chain = FallbackChain::new(Arc::new(UnreachableProvider), Arc::new(UnreachableProvider), 400);
    let bot = bot(&server, chain);
    bot.handle_message(incoming("just chatting")).await;
    bot.handle_message(incoming("/help")).await;

    let messages = requests_to(&server, "sendMessage").await;
    assert_eq!(messages.len(), 1);
    let body = body_text(&messages[0]);
    assert!(body.contains("AI Image Generator Bot"));
    assert!(body.contains("\"parse_mode\":\"Markdown\""));
}

#[tokio::test]
async fn test_get_updates_parses_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("getUpdates")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                { "update_id": 7, "message": { "message_id": 1, "chat": { "id": 42 }, "text": "/start" } },
                { "update_id": 8, "edited_message": { "message_id": 1, "chat": { "id": 42 } } }
            ]
        })))
        .mount(&server)
        .await;

    let client = TelegramClient::new(&settings(&server).telegram).unwrap();
    let updates = client.get_updates(Some(7)).await.unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 42);
    assert!(updates[1].message.is_none());
}

#[tokio::test]
async fn test_api_error_description_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let client = TelegramClient::new(&settings(&server).telegram).unwrap();
    let err = client
        .send_message(&SendMessage::reply(&incoming("/start"), "hi"))
        .await
        .unwrap_err();

    match err {
        AppError::Telegram(message) => assert!(message.contains("chat not found")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_network_error_hides_bot_token() {
    let mut settings = Settings::default();
    settings.telegram.api_base = "http://127.0.0.1:9".to_string();
    settings.telegram.bot_token = "123456:SECRET_TOKEN".to_string();

    let client = TelegramClient::new(&settings.telegram).unwrap();
    let err = client
        .send_message(&SendMessage::reply(&incoming("/start"), "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::HttpClient(_)));
    assert!(!err.user_message().contains("SECRET_TOKEN"));
    assert!(!err.to_string().contains("SECRET_TOKEN"));
}
