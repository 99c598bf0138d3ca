/// HTTP surface tests, driven in-process through the router.
///
/// Run with: cargo test --test http_tests -- --nocapture

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use premium_predictor::{
    http::{router, AppState},
    FeatureRecord, LinearModel, ModelError, PremiumModel, Predictor,
};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Broken;

impl PremiumModel for Broken {
    fn predict(&self, _batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
        Err(ModelError::Output("size [1, 3] for 2 classes".into()))
    }

    fn feature_names(&self) -> &[String] {
        &[]
    }
}

fn app() -> Router {
    let model = LinearModel::load(Path::new("models/premium_model.json")).expect("shipped model should load");
    router(AppState::new(Predictor::new(Arc::new(model))))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_home_and_health() {
    println!("\n=== Test: Home & Health ===");
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Insurance Prediction API" }));

    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK", "version": "1.0.0", "model_loaded": true }));

    let (_, body) = send(router(AppState::without_model()), get("/health")).await;
    assert_eq!(body["model_loaded"], json!(false));
    println!("✓ Static endpoints respond");
}

#[tokio::test]
async fn test_predict_ok() {
    println!("\n=== Test: Predict ===");
    let (status, body) = send(
        app(),
        post_json(&json!({
            "age": 30,
            "weight": 68.0,
            "height": 1.76,
            "income": 25.0,
            "smoker": false,
            "city": " pune ",
            "occupation": "private_job"
        })),
    )
    .await;

    println!("  response: {}", body);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_category"], json!("high"));
    assert_eq!(body["description"], json!("Insurance premium category is predicted to be HIGH"));
}

#[tokio::test]
async fn test_predict_reports_every_bad_field() {
    println!("\n=== Test: Predict Validation ===");
    let (status, body) = send(
        app(),
        post_json(&json!({
            "age": 120,
            "weight": 70.0,
            "height": 2.5,
            "income": 5.0,
            "smoker": false,
            "city": "Pune",
            "occupation": "hacker"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_array().unwrap();
    let fields: Vec<&str> = detail.iter().map(|d| d["loc"][1].as_str().unwrap()).collect();
    assert_eq!(fields, ["age", "height", "occupation"]);
    assert_eq!(detail[0]["loc"][0], json!("body"));
    assert_eq!(detail[2]["type"], json!("literal_error"));
    println!("✓ {} field errors reported", detail.len());
}

#[tokio::test]
async fn test_predict_missing_field_with_range_errors() {
    println!("\n=== Test: Missing Field Alongside Range Errors ===");
    let (status, body) = send(
        app(),
        post_json(&json!({
            "age": 0,
            "weight": 70,
            "height": 3.0,
            "income": 5,
            "city": "Pune",
            "occupation": "hacker"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_array().unwrap();
    let got: Vec<(&str, &str)> = detail
        .iter()
        .map(|d| (d["loc"][1].as_str().unwrap(), d["type"].as_str().unwrap()))
        .collect();
    assert_eq!(
        got,
        [
            ("age", "greater_than"),
            ("height", "less_than"),
            ("smoker", "missing"),
            ("occupation", "literal_error"),
        ]
    );
    println!("✓ {} field errors reported in one response", detail.len());
}

#[tokio::test]
async fn test_predict_accepts_integral_float_age() {
    let (status, body) = send(
        app(),
        post_json(&json!({
            "age": 30.0,
            "weight": 68.0,
            "height": 1.76,
            "income": 5,
            "smoker": false,
            "city": "Nowhere",
            "occupation": "private_job"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_category"], json!("low"));
}

#[tokio::test]
async fn test_predict_malformed_body() {
    println!("\n=== Test: Malformed Body ===");
    let (status, body) = send(app(), post_json(&json!({ "age": "thirty" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 7);
    assert_eq!(detail[0]["loc"], json!(["body", "age"]));
    assert_eq!(detail[0]["type"], json!("int_parsing"));
    assert_eq!(detail[1]["type"], json!("missing"));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"age\": "))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    assert_eq!(body["detail"][0]["type"], json!("json_invalid"));

    let (status, body) = send(app(), post_json(&json!([1, 2]))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], json!("model_type"));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_model_failure_is_500() {
    println!("\n=== Test: Model Failure ===");
    let app = router(AppState::new(Predictor::new(Arc::new(Broken))));
    let (status, body) = send(
        app,
        post_json(&json!({
            "age": 40,
            "weight": 80.0,
            "height": 1.8,
            "income": 12.0,
            "smoker": true,
            "city": "Delhi",
            "occupation": "retired"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("unexpected model output"));
}

#[tokio::test]
async fn test_predict_without_model_is_503() {
    let (status, _) = send(
        router(AppState::without_model()),
        post_json(&json!({
            "age": 40,
            "weight": 80.0,
            "height": 1.8,
            "income": 12.0,
            "smoker": false,
            "city": "Delhi",
            "occupation": "retired"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
