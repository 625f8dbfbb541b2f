use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Failures raised by the record stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique column already holds the value.
    #[error("a record with this {0} already exists")]
    Conflict(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps unique-index violations to [`StoreError::Conflict`] on `field`.
    pub fn unique_on(field: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(field),
            other => StoreError::Database(other),
        }
    }
}

/// Field name -> messages, rendered under `fields` in error bodies.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when nothing was recorded, otherwise a validation error.
    pub fn finish<T>(self, value: T) -> Result<T, ApiError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    fields: FieldErrors,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, fields) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "invalid input".to_string(),
                fields,
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, FieldErrors::new()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, FieldErrors::new()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    FieldErrors::new(),
                )
            }
        };
        (status, Json(ErrorBody { error, fields })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => {
                let mut fields = FieldErrors::new();
                fields.add(field, format!("a record with this {} already exists", field));
                ApiError::Validation(fields)
            }
            StoreError::Database(db) => ApiError::Internal(db.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
