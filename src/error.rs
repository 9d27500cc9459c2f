use crate::affordability::AffordabilityError;
use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::regulatory::ProviderError;
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Regulatory(ProviderError),
    Affordability(AffordabilityError),
    Request(JsonRejection),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Affordability(AffordabilityError::UnknownSchedule(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Affordability(AffordabilityError::Engine(EngineError::InvalidInput {
                ..
            })) => StatusCode::BAD_REQUEST,
            AppError::Affordability(AffordabilityError::Engine(
                EngineError::NoApplicableRule { .. },
            )) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Request(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Request(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Regulatory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Regulatory(err) => write!(f, "regulatory configuration error: {}", err),
            AppError::Affordability(err) => write!(f, "{}", err),
            AppError::Request(err) => write!(f, "invalid request body: {}", err.body_text()),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Regulatory(err) => Some(err),
            AppError::Affordability(err) => Some(err),
            AppError::Request(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Regulatory(value)
    }
}

impl From<AffordabilityError> for AppError {
    fn from(value: AffordabilityError) -> Self {
        Self::Affordability(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::Request(value)
    }
}
