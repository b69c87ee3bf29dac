use super::*;
use crate::cancel::CancellationSource;
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn corolla_request() -> PredictionRequest {
    PredictionRequest {
        brand: "Toyota".to_string(),
        model: "Corolla".to_string(),
        fuel_type: "Petrol".to_string(),
        transmission: "Automatic".to_string(),
        year: 2017,
        mileage_km: 45000.0,
        owner_count: 1,
        engine_cc: 1600.0,
        seats: 5,
    }
}

fn metrics_body() -> serde_json::Value {
    json!({
        "ready": true,
        "model_type": "RandomForestRegressor",
        "trained_at": 1_700_000_000,
        "metrics": {"r2": 0.92, "mae": 1500.0, "rmse": 2100.0},
        "features": ["brand", "model", "year"]
    })
}

#[tokio::test]
async fn test_check_health_accepts_any_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"ok"}"#)
        .create_async()
        .await;

    let service = PriceService::new_with_url(server.url());
    let health = service.check_health(&CancellationToken::none()).await.unwrap();
    assert_eq!(health.0["message"], "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_check_health_service_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(503)
        .with_body("")
        .create_async()
        .await;

    let service = PriceService::new_with_url(server.url());
    let err = service
        .check_health(&CancellationToken::none())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        err.to_string(),
        "Unable to reach backend: Health request failed (503): Service Unavailable"
    );
}

#[tokio::test]
async fn test_fetch_metrics_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/metrics")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(metrics_body().to_string())
        .create_async()
        .await;

    let service = PriceService::new_with_url(format!("{}/", server.url()));
    let snapshot = service
        .fetch_metrics(&CancellationToken::none())
        .await
        .unwrap();
    assert!(snapshot.ready);
    assert_eq!(snapshot.model_type, "RandomForestRegressor");
    assert_eq!(snapshot.metrics.rmse, 2100.0);
    assert_eq!(snapshot.features.len(), 3);
}

#[tokio::test]
async fn test_fetch_metrics_malformed_body_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/metrics")
        .with_status(200)
        .with_body(r#"{"ready": true}"#)
        .create_async()
        .await;

    let service = PriceService::new_with_url(server.url());
    let err = service
        .fetch_metrics(&CancellationToken::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { endpoint: Endpoint::Metrics, .. }));
    assert!(err.to_string().starts_with("Unable to load metrics: malformed response body"));
}

#[tokio::test]
async fn test_submit_prediction_posts_service_schema() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "brand": "Toyota",
            "model": "Corolla",
            "fuel_type": "Petrol",
            "transmission": "Automatic",
            "year": 2017,
            "mileage_km": 45000.0,
            "owner_count": 1,
            "engine_cc": 1600.0,
            "seats": 5
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"predicted_price": 14250.75, "inputs": {"brand": "Toyota"}, "model_info": {}}"#)
        .expect(1)
        .create_async()
        .await;

    let service = PriceService::new_with_url(server.url());
    let response = service
        .submit_prediction(&corolla_request(), &CancellationToken::none())
        .await
        .unwrap();
    assert_eq!(response.predicted_price, 14250.75);
    assert_eq!(response.inputs.unwrap()["brand"], "Toyota");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_prediction_server_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .with_status(500)
        .with_body("model unavailable")
        .expect(1)
        .create_async()
        .await;

    let service = PriceService::new_with_url(server.url());
    let err = service
        .submit_prediction(&corolla_request(), &CancellationToken::none())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Service {
            endpoint: Endpoint::Predict,
            status: 500,
            body: "model unavailable".to_string(),
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // nothing listens on port 9 locally
    let service = PriceService::new_with_url("http://127.0.0.1:9");
    let err = service
        .check_health(&CancellationToken::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { endpoint: Endpoint::Health, .. }));
    assert!(err.to_string().starts_with("Unable to reach backend: "));
}

#[tokio::test]
async fn test_cancelled_token_skips_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/metrics")
        .with_status(200)
        .with_body(metrics_body().to_string())
        .expect(0)
        .create_async()
        .await;

    let source = CancellationSource::new();
    source.cancel();
    let service = PriceService::new_with_url(server.url());
    let err = service.fetch_metrics(&source.token()).await.unwrap_err();
    assert_eq!(err, ApiError::transport(Endpoint::Metrics, "request cancelled"));
    mock.assert_async().await;
}

struct StalledClient;

#[async_trait::async_trait]
impl HttpClient for StalledClient {
    async fn send(&self, _request: HttpRequest) -> std::result::Result<crate::http::HttpResponse, String> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancel_while_in_flight() {
    let source = CancellationSource::new();
    let token = source.token();
    let service = PriceService::with_client(StalledClient, "http://localhost:3001");
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        source.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), service.fetch_metrics(&token))
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(err, ApiError::transport(Endpoint::Metrics, "request cancelled"));
    canceller.await.unwrap();
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let service = PriceService::new_with_url("http://localhost:3001/");
    assert_eq!(service.base_url(), "http://localhost:3001");
    assert_eq!(service.url(Endpoint::Predict), "http://localhost:3001/predict");
    assert_eq!(service.url(Endpoint::Health), "http://localhost:3001/");
}
