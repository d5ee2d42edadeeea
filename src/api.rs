//! HTTP API сервиса предсказаний

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::DelayError;
use crate::models::DelayModel;
use crate::types::{FlightRecord, FlightType, KNOWN_OPERATORS};

/// Дата-заглушка: признаки модели от неё не зависят
const PLACEHOLDER_SCHEDULED: &str = "2023-01-01 10:00:00";

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<DelayModel>,
}

impl AppState {
    pub fn new(model: DelayModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInput {
    #[serde(rename = "OPERA")]
    pub operator: String,
    #[serde(rename = "TIPOVUELO")]
    pub flight_type: String,
    #[serde(rename = "MES")]
    pub month: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightBatch {
    pub flights: Vec<FlightInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predict: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Model(DelayError),
}

impl From<DelayError> for ApiError {
    fn from(e: DelayError) -> Self {
        ApiError::Model(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Model(DelayError::ModelNotTrained) => (
                StatusCode::SERVICE_UNAVAILABLE,
                DelayError::ModelNotTrained.to_string(),
            ),
            ApiError::Model(e @ DelayError::FeatureShape { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Model(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", e),
            ),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl FlightInput {
    /// Проверка полей и преобразование в запись для модели
    pub fn validate(&self) -> Result<FlightRecord, ApiError> {
        if !KNOWN_OPERATORS.contains(&self.operator.as_str()) {
            return Err(ApiError::Validation(format!(
                "OPERA must be one of: {}",
                KNOWN_OPERATORS.join(", ")
            )));
        }

        let flight_type = match self.flight_type.as_str() {
            "N" => FlightType::Domestic,
            "I" => FlightType::International,
            _ => {
                return Err(ApiError::Validation(
                    "TIPOVUELO must be N or I".to_string(),
                ))
            }
        };

        if !(1..=12).contains(&self.month) {
            return Err(ApiError::Validation(
                "MES must be between 1 and 12".to_string(),
            ));
        }

        Ok(FlightRecord::new(
            self.operator.clone(),
            flight_type,
            self.month as u32,
            PLACEHOLDER_SCHEDULED,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FlightBatch>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(batch) = payload.map_err(|e| {
        tracing::debug!("Rejected predict body: {}", e);
        ApiError::Validation("Validation error".to_string())
    })?;
    tracing::info!("Predict request: {} flights", batch.flights.len());

    let records = batch
        .flights
        .iter()
        .map(FlightInput::validate)
        .collect::<Result<Vec<_>, _>>()?;

    let features = state.model.preprocess(&records);
    let predict = state.model.predict(&features).map_err(|e| {
        tracing::warn!("Prediction failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(PredictionResponse { predict }))
}
