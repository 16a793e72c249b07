use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::FieldErrors;
use serde::Serialize;
use tracing::error;

use crate::endpoints::EndpointError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const PERSISTENCE: &str = "persistence_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Body of a rejected form submission.
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub code: u16,
    pub message: &'static str,
    pub errors: FieldErrors,
}

#[derive(Debug)]
pub enum ApiError {
    Message {
        status: StatusCode,
        code: &'static str,
        message: String,
        hint: Option<String>,
    },
    Validation(FieldErrors),
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self::Message {
            status,
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: Option<String>) -> Self {
        Self::Message {
            status: StatusCode::BAD_REQUEST,
            code: codes::BAD_REQUEST,
            message: message.into(),
            hint,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Message { status, .. } => *status,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<EndpointError> for ApiError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, err.to_string())
            }
            EndpointError::Forbidden(_) => {
                Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, err.to_string())
            }
            EndpointError::ValidationFailed(errors) => Self::Validation(errors),
            EndpointError::PersistenceFailure(message) => {
                Self::new(StatusCode::BAD_REQUEST, codes::PERSISTENCE, message)
            }
            EndpointError::BadRequest(e) => Self::bad_request(e.to_string(), None),
            EndpointError::Storage(message) => {
                error!("Storage failure: {}", message);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL,
                    "Storage unavailable",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Malformed JSON body", Some(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Message {
                status,
                code,
                message,
                hint,
            } => {
                let body = ApiErrorBody {
                    error: ApiErrorMessage {
                        code: code.to_string(),
                        message,
                        hint,
                    },
                };
                (status, Json(body)).into_response()
            }
            Self::Validation(errors) => {
                let body = ValidationBody {
                    code: StatusCode::BAD_REQUEST.as_u16(),
                    message: "Validation Failed",
                    errors,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
