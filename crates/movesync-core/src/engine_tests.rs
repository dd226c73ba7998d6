use super::*;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> EngineClient {
    EngineClient::new(format!("{}/", server.uri())).with_timeout(Duration::from_secs(2))
}

fn moves() -> MoveSequence {
    MoveSequence::from(&["e4", "e5"][..])
}

#[tokio::test]
async fn test_posts_moves_as_json() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/"))
        .and(matchers::header("content-type", "application/json"))
        .and(matchers::body_json(serde_json::json!({"moves": ["e4", "e5"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"best_move": "g1f3"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.recommend(&moves()).await.unwrap(), "g1f3");
}

#[tokio::test]
async fn test_object_best_move() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"best_move": {"uci": "e2e4", "score": 31}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.recommend(&moves()).await.unwrap(), "e2e4");
}

#[tokio::test]
async fn test_error_field_is_failure() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "no moves"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.recommend(&moves()).await.unwrap_err();
    assert!(matches!(err, EngineError::Service(ref m) if m == "no moves"));
}

#[tokio::test]
async fn test_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.recommend(&moves()).await.unwrap_err();
    match err {
        EngineError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_status_uses_error_body() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "Invalid input"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.recommend(&moves()).await.unwrap_err();
    assert!(matches!(err, EngineError::Status { status: 400, ref message } if message == "Invalid input"));
}

#[tokio::test]
async fn test_success_status_with_garbage_body() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.recommend(&moves()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_empty_reply_is_failure() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.recommend(&moves()).await.is_err());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let client = EngineClient::new("http://127.0.0.1:1/").with_timeout(Duration::from_secs(2));
    let err = client.recommend(&moves()).await.unwrap_err();
    assert!(matches!(err, EngineError::Network(_) | EngineError::Timeout(_)));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"best_move": "e2e4"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = EngineClient::new(server.uri()).with_timeout(Duration::from_millis(200));
    let err = client.recommend(&moves()).await.unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)));
}

#[test]
fn test_from_config() {
    let config = EngineConfig {
        endpoint: "http://engine.local:5000/".to_string(),
        timeout_seconds: 7,
    };
    let client = EngineClient::from_config(&config);
    assert_eq!(client.endpoint(), "http://engine.local:5000/");
    assert_eq!(client.timeout, Duration::from_secs(7));
}
