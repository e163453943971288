//! AI client integration tests
//!
//! Runs every AI operation against a mock API server

use httpmock::prelude::*;
use serde_json::json;
use starterkit::models::ai::{AspectRatio, ImageOptions, Resolution};
use starterkit::{AiClient, AppError, Settings};

const PROJECT_ID: &str = "proj_test";

/// Create a client pointed at the mock server
fn create_client(server: &MockServer) -> AiClient {
    AiClient::new(Settings::for_project(PROJECT_ID, server.base_url()))
        .expect("Failed to create AI client")
}

#[tokio::test]
async fn test_generate_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate").json_body(json!({
                "projectId": PROJECT_ID,
                "prompt": "Write a haiku",
                "systemPrompt": "You are a poet"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": { "text": "Autumn moonlight", "remainingRequests": 41 }
            }));
        })
        .await;

    let client = create_client(&server);
    let result = client
        .generate_text("Write a haiku", Some("You are a poet"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.text, "Autumn moonlight");
    assert_eq!(result.remaining_requests, 41);
}

#[tokio::test]
async fn test_generate_text_without_system_prompt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/ai/generate")
                .json_body(json!({ "projectId": PROJECT_ID, "prompt": "Hi" }));
            then.status(200).json_body(json!({
                "success": true,
                "data": { "text": "Hello!", "remainingRequests": 3 }
            }));
        })
        .await;

    let client = create_client(&server);
    let result = client.generate_text("Hi", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text, "Hello!");
}

#[tokio::test]
async fn test_analyze_image_strips_data_url_prefix() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/vision").json_body(json!({
                "projectId": PROJECT_ID,
                "prompt": "What is this?",
                "imageBase64": "AAAA"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": { "analysis": "A cat", "remainingRequests": 9 }
            }));
        })
        .await;

    let client = create_client(&server);
    let result = client
        .analyze_image("data:image/png;base64,AAAA", "What is this?")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.analysis, "A cat");
    assert_eq!(result.remaining_requests, 9);
}

#[tokio::test]
async fn test_analyze_image_bytes() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/ai/vision")
                .json_body_partial(json!({ "imageBase64": "QUJD" }).to_string());
            then.status(200).json_body(json!({
                "success": true,
                "data": { "analysis": "Letters", "remainingRequests": 8 }
            }));
        })
        .await;

    let client = create_client(&server);
    let result = client.analyze_image_bytes(b"ABC", "Read it").await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.analysis, "Letters");
}

#[tokio::test]
async fn test_analyze_image_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/vision").json_body(json!({
                "projectId": PROJECT_ID,
                "prompt": "Describe",
                "imageUrl": "https://example.com/cat.jpg"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": { "analysis": "A sleeping cat", "remainingRequests": 7 }
            }));
        })
        .await;

    let client = create_client(&server);
    let result = client
        .analyze_image_url("https://example.com/cat.jpg", "Describe")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.analysis, "A sleeping cat");
}

#[tokio::test]
async fn test_check_ai_quota() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/ai/usage")
                .query_param("projectId", PROJECT_ID);
            then.status(200).json_body(json!({
                "success": true,
                "data": { "remaining": 12, "max": 50, "periodEnd": "2026-11-01T00:00:00Z" }
            }));
        })
        .await;

    let client = create_client(&server);
    let quota = client.check_ai_quota().await.unwrap();

    mock.assert_async().await;
    assert_eq!(quota.remaining, 12);
    assert_eq!(quota.max, 50);
    assert_eq!(quota.period_end, "2026-11-01T00:00:00Z");
}

#[tokio::test]
async fn test_generate_image_defaults() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate-image").json_body(json!({
                "projectId": PROJECT_ID,
                "prompt": "A red bicycle",
                "aspectRatio": "1:1",
                "resolution": "1K"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "imageBase64": "iVBORw0KGgo",
                    "mimeType": "image/jpeg",
                    "remainingRequests": 4
                }
            }));
        })
        .await;

    let client = create_client(&server);
    let image = client.generate_image("A red bicycle", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(image.image_base64, "data:image/jpeg;base64,iVBORw0KGgo");
    assert_eq!(image.remaining_requests, 4);
}

#[tokio::test]
async fn test_generate_image_with_options() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate-image").json_body_partial(
                json!({ "aspectRatio": "16:9", "resolution": "2K" }).to_string(),
            );
            then.status(200).json_body(json!({
                "success": true,
                "data": { "imageBase64": "AAAA", "remainingRequests": 2 }
            }));
        })
        .await;

    let client = create_client(&server);
    let options = ImageOptions {
        aspect_ratio: AspectRatio::Landscape16x9,
        resolution: Resolution::TwoK,
    };
    let image = client.generate_image("Skyline", Some(options)).await.unwrap();

    mock.assert_async().await;
    assert!(image.image_base64.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_edit_image() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate-image").json_body(json!({
                "projectId": PROJECT_ID,
                "prompt": "Add a hat",
                "aspectRatio": "1:1",
                "resolution": "1K",
                "sourceImageBase64": "BBBB"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": { "imageBase64": "CCCC", "mimeType": "image/png", "remainingRequests": 1 }
            }));
        })
        .await;

    let client = create_client(&server);
    let image = client
        .edit_image("data:image/png;base64,BBBB", "Add a hat", None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(image.image_base64, "data:image/png;base64,CCCC");
}

#[tokio::test]
async fn test_unconfigured_client_fails_before_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;

    let client = AiClient::new(Settings::for_project("", server.base_url())).unwrap();

    assert!(matches!(client.generate_text("Hi", None).await, Err(AppError::Config(_))));
    assert!(matches!(client.analyze_image("AAAA", "x").await, Err(AppError::Config(_))));
    assert!(matches!(client.analyze_image_url("https://e.com/a.png", "x").await, Err(AppError::Config(_))));
    assert!(matches!(client.check_ai_quota().await, Err(AppError::Config(_))));
    assert!(matches!(client.generate_image("x", None).await, Err(AppError::Config(_))));
    assert!(matches!(client.edit_image("AAAA", "x", None).await, Err(AppError::Config(_))));

    mock.assert_hits_async(0).await;
}

#[test]
fn test_missing_api_url_is_configuration_error() {
    let client = AiClient::new(Settings::unconfigured()).unwrap();
    let result = tokio_test::block_on(client.generate_text("Hi", None));

    let error = result.unwrap_err();
    assert!(error.is_configuration());
}

#[tokio::test]
async fn test_envelope_failure_uses_server_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate");
            then.status(429).json_body(json!({
                "success": false,
                "error": "Daily AI limit reached"
            }));
        })
        .await;

    let client = create_client(&server);
    let error = client.generate_text("Hi", None).await.unwrap_err();

    match error {
        AppError::Api(message) => assert_eq!(message, "Daily AI limit reached"),
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_data_uses_default_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/ai/usage");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let client = create_client(&server);
    let error = client.check_ai_quota().await.unwrap_err();

    match error {
        AppError::Api(message) => assert_eq!(message, "Failed to check AI quota"),
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ai/generate-image");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let client = create_client(&server);
    let error = client.generate_image("x", None).await.unwrap_err();

    match error {
        AppError::Api(message) => {
            assert!(message.starts_with("Failed to generate image"));
            assert!(message.contains("502"));
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_failure_is_surfaced() {
    let client = AiClient::new(Settings::for_project(PROJECT_ID, "http://127.0.0.1:9")).unwrap();
    let error = client.generate_text("Hi", None).await.unwrap_err();

    assert!(matches!(error, AppError::Network(_)));
    assert_eq!(error.error_type(), "network_error");
}
