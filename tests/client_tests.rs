//! Integration tests for FetchClient over real HTTP using mockito.

use mockito::{Matcher, Server};
use resilient_fetch::{Config, FetchClient, FetchError, FetchOptions, Method};
use serde::Deserialize;
use serde_json::json;

/// Helper to create a client pointed at the mock server with short backoff
fn setup_mock_client(server: &Server) -> FetchClient {
    let config = Config {
        base_url: server.url(),
        request_timeout_ms: 2000,
        backoff_base_ms: 10,
        backoff_cap_ms: 40,
        ..Config::default()
    };
    FetchClient::new(&config)
}

#[tokio::test]
async fn test_fetch_json_body() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon/bulbasaur")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "name": "bulbasaur"}"#)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let value = client
        .fetch("/pokemon/bulbasaur", FetchOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(value, json!({"id": 1, "name": "bulbasaur"}));
}

#[tokio::test]
async fn test_repeat_get_is_cached() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon/ditto")
        .with_status(200)
        .with_body(r#"{"id": 132, "name": "ditto"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let first = client.fetch("/pokemon/ditto", FetchOptions::new()).await.unwrap();
    let second = client.fetch("/pokemon/ditto", FetchOptions::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(client.metrics().cache_hits_total(), 1);
}

#[tokio::test]
async fn test_use_cache_false_bypasses_cache() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon/ditto")
        .with_status(200)
        .with_body(r#"{"id": 132, "name": "ditto"}"#)
        .expect(2)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let options = FetchOptions::new().use_cache(false);
    client.fetch("/pokemon/ditto", options.clone()).await.unwrap();
    client.fetch("/pokemon/ditto", options).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_single_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon/missingno")
        .with_status(404)
        .with_body("Not Found")
        .expect(1)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let result = client.fetch("/pokemon/missingno", FetchOptions::new()).await;

    mock.assert_async().await;
    match result {
        Err(FetchError::HttpStatus { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("Expected HttpStatus error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_retried_until_exhausted() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon/1")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let result = client
        .fetch("/pokemon/1", FetchOptions::new().retries(2))
        .await;

    mock.assert_async().await;
    assert_eq!(result.unwrap_err().status(), Some(500));
    assert_eq!(client.metrics().http_requests_total(), 3);
    assert_eq!(client.metrics().retries_total(), 2);
}

#[tokio::test]
async fn test_post_sends_json_body_and_is_not_cached() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/party")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"name": "eevee", "level": 5})))
        .with_status(200)
        .with_body(r#"{"slot": 1}"#)
        .expect(2)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let options = FetchOptions::new()
        .method(Method::Post)
        .body(json!({"name": "eevee", "level": 5}));

    client.fetch("/party", options.clone()).await.unwrap();
    let value = client.fetch("/party", options).await.unwrap();

    mock.assert_async().await;
    assert_eq!(value["slot"], 1);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_caller_headers_are_sent() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/pokemon-species/25")
        .match_header("accept-language", "ja")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"name": "pikachu"}"#)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    client
        .fetch(
            "/pokemon-species/25",
            FetchOptions::new().header("Accept-Language", "ja"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_content_decodes_as_null() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("DELETE", "/party/1")
        .with_status(204)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let value = client
        .fetch("/party/1", FetchOptions::new().method(Method::Delete))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(value.is_null());
}

#[tokio::test]
async fn test_fetch_json_typed() {
    #[derive(Debug, Deserialize)]
    struct Berry {
        id: u32,
        name: String,
        growth_time: u32,
    }

    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/berry/1")
        .with_status(200)
        .with_body(r#"{"id": 1, "name": "cheri", "growth_time": 3, "size": 20}"#)
        .create_async()
        .await;

    let client = setup_mock_client(&server);
    let berry: Berry = client
        .fetch_json("/berry/1", FetchOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(berry.id, 1);
    assert_eq!(berry.name, "cheri");
    assert_eq!(berry.growth_time, 3);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let config = Config {
        base_url: "http://127.0.0.1:1".to_string(),
        backoff_base_ms: 1,
        backoff_cap_ms: 1,
        ..Config::default()
    };
    let client = FetchClient::new(&config);

    let result = client
        .fetch("/pokemon/1", FetchOptions::new().retries(1))
        .await;

    assert!(matches!(result, Err(FetchError::Network(_))));
    assert_eq!(client.metrics().http_requests_total(), 2);
}
