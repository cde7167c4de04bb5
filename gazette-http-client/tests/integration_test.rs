//! Integration tests for gazette-http-client

use gazette_http_client::*;
use serde::Deserialize;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: String,
}

async fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(HttpClientConfig::builder().base_url(server.uri()).build()).unwrap()
}

#[tokio::test]
async fn test_send_json_decodes_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": "a1"}])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let items: Vec<Item> = client
        .get("/api/articles")
        .query("page", "1")
        .send_json()
        .await
        .unwrap();

    assert_eq!(items, vec![Item { id: "a1".to_string() }]);
}

#[tokio::test]
async fn test_send_optional_json_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let item: Option<Item> = client
        .get("/api/articles/missing")
        .send_optional_json()
        .await
        .unwrap();

    assert!(item.is_none());
}

#[tokio::test]
async fn test_server_error_is_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/topics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get("/api/topics")
        .send_json::<Vec<Item>>()
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert!(err.to_string().contains("Service Unavailable"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get("/api/research")
        .send_json::<Vec<Item>>()
        .await
        .unwrap_err();

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_json_body_is_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/topics"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"title": "Weekly"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .post("/api/topics")
        .json(&serde_json::json!({"title": "Weekly"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    let client = HttpClient::new(
        HttpClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .build(),
    )
    .unwrap();

    let err = client.get("/api/articles").send().await.unwrap_err();
    assert!(err.is_connection() || matches!(err, HttpClientError::Http(_)));
}
