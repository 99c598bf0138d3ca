use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};

use crate::predictor::Predictor;
use crate::types::PremiumCategory;
use crate::validate::{validate_json, FieldError, ValidationError};

pub const API_VERSION: &str = "1.0.0";

// ---------- Response types ----------

#[derive(Serialize)]
struct PredictOut {
    predicted_category: PremiumCategory,
    description: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
}

/// One entry of a 422 body, shaped `{"loc": ["body", field], "msg", "type"}`.
/// Errors about the body as a whole carry `["body"]` only.
#[derive(Serialize)]
struct ErrorDetail {
    loc: Vec<String>,
    msg: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl From<&FieldError> for ErrorDetail {
    fn from(e: &FieldError) -> Self {
        let mut loc = vec!["body".to_string()];
        if !e.field.is_empty() {
            loc.push(e.field.clone());
        }
        Self {
            loc,
            msg: e.message.clone(),
            kind: e.kind,
        }
    }
}

fn unprocessable(details: Vec<ErrorDetail>) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": details }))).into_response()
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        unprocessable(self.errors.iter().map(ErrorDetail::from).collect())
    }
}

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    predictor: Option<Arc<Predictor>>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Some(Arc::new(predictor)),
        }
    }

    /// State with no model; `/predict` answers 503.
    pub fn without_model() -> Self {
        Self { predictor: None }
    }
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rej) => {
            let status = rej.status();
            if status != StatusCode::UNPROCESSABLE_ENTITY && status != StatusCode::BAD_REQUEST {
                // wrong content type and the like keep axum's own response
                return rej.into_response();
            }
            return unprocessable(vec![ErrorDetail {
                loc: vec!["body".to_string()],
                msg: rej.body_text(),
                kind: "json_invalid",
            }]);
        }
    };

    let profile = match validate_json(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("rejected input: {}", e);
            return e.into_response();
        }
    };

    let Some(predictor) = state.predictor.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "model not loaded" })),
        )
            .into_response();
    };

    match predictor.predict_category(&profile) {
        Ok(res) => Json(PredictOut {
            predicted_category: res.final_category,
            description: res.description,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("prediction failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "Insurance Prediction API" }))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        version: API_VERSION,
        model_loaded: state.predictor.is_some(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state)).await
}
