use std::collections::BTreeMap;

use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use tracing::{debug, error};

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Field name -> list of messages, as reported to clients
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn internal(e: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(e.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn field_errors(report: &garde::Report) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (path, error) in report.iter() {
        let name = path.to_string();
        let name = if name.is_empty() {
            "payload".to_string()
        } else {
            name
        };
        fields.entry(name).or_default().push(error.to_string());
    }
    fields
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::Validation(field_errors(&report))
    }
}

impl From<tcms_dal::Error> for ApiError {
    fn from(value: tcms_dal::Error) -> Self {
        use tcms_dal::Error as E;
        match value {
            E::RecordNotFound(entity) => ApiError::NotFound(entity),
            E::Conflict(msg) => ApiError::Conflict(msg),
            E::InvalidOrderByField(field) => {
                ApiError::InvalidQuery(format!("Invalid order by field: {field}"))
            }
            E::InvalidCredentials => ApiError::Unauthorized,
            e @ (E::DatabaseError(_) | E::MigrationError(_)) => ApiError::Storage(e.to_string()),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(e: tower_sessions::session::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<std::num::TryFromIntError> for ApiError {
    fn from(e: std::num::TryFromIntError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(fields) => {
                debug!("Validation failed: {fields:?}");
                json!({"error": "Validation failed", "fields": fields})
            }
            ApiError::Storage(detail) => {
                error!("Storage error: {detail}");
                json!({"error": "Storage error", "detail": detail})
            }
            ApiError::Internal(e) => {
                error!("Internal error: {e}");
                json!({"error": "Internal server error"})
            }
            ApiError::Unauthorized => json!({"error": "Unauthorized"}),
            other => {
                debug!("Request failed: {other}");
                json!({"error": other.to_string()})
            }
        };
        (status, Json(body)).into_response()
    }
}
