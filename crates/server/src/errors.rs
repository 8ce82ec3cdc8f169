use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::WithRejection;
use thiserror::Error;
use tracing::error;

use common::types::ErrorBody;
use models::errors::ModelError;
use service::errors::ServiceError;

/// JSON error response: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
    pub field: Option<&'static str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail, field: None }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(m) | ServiceError::Model(ModelError::Validation(m)) => Self::bad_request(m),
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(m)),
            ServiceError::Conflict { message, field } => Self { field, ..Self::new(StatusCode::CONFLICT, "Conflict", Some(message)) },
            ServiceError::Unauthorized(m) => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(m)),
            ServiceError::Db(m) | ServiceError::Model(ModelError::Db(m)) => {
                error!(error = %m, "database failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database Error", Some(m))
            }
            ServiceError::Internal(m) => {
                error!(error = %m, "internal failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", Some(m))
            }
        }
    }
}

// 解析失败统一走 JSON 错误体
impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

/// Extractors whose rejections render as [`JsonApiError`].
pub type ApiJson<T> = WithRejection<Json<T>, JsonApiError>;
pub type ApiPath<T> = WithRejection<Path<T>, JsonApiError>;
pub type ApiQuery<T> = WithRejection<Query<T>, JsonApiError>;

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.title.to_string(), message: self.detail, field: self.field.map(str::to_string) };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
}
