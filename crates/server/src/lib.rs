use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run_with_listener};

mod confirmation;
mod convert;
mod friends;
mod lekkas;
mod pools;
mod server;
mod statistics;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'static str>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidState { .. } | EngineError::ConcurrencyConflict { .. } => {
            StatusCode::CONFLICT
        }
        EngineError::InvalidToken { .. } => StatusCode::GONE,
        EngineError::KeyNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::Notify(_) => StatusCode::BAD_GATEWAY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Notify(reason) => {
            tracing::warn!("notification failed: {reason}");
            "notification could not be delivered".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, operation) = match self {
            ServerError::Engine(err) => {
                let operation = err.operation().map(|op| op.as_str());
                (
                    status_for_engine_error(&err),
                    message_for_engine_error(err),
                    operation,
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err, None),
        };

        (status, Json(Error { error, operation })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
