use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;

use crate::store::StoreError;

pub async fn handler404(path: Uri) -> Error {
    Error::NotFound {
        error: format!("Invalid path: {}", path),
    }
}

/// Every failure a request can end in. Serialized as
/// `{"kind": "<Variant>", "error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Error {
    NotFound { error: String },
    MalformedInput { error: String },
    ConnectionFailure { error: String },
    PrepareFailure { error: String },
    ExecutionFailure { error: String },
    InternalError { error: String },
}

impl Error {
    pub fn malformed<S: Into<String>>(msg: S) -> Error {
        Error::MalformedInput { error: msg.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MalformedInput { .. } => StatusCode::BAD_REQUEST,
            Error::ConnectionFailure { .. }
            | Error::PrepareFailure { .. }
            | Error::ExecutionFailure { .. }
            | Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        log::error!("{}", err);
        match err {
            StoreError::Connection(cause) => Self::ConnectionFailure {
                error: format!("Connection failed: {}", cause),
            },
            StoreError::Prepare(cause) => Self::PrepareFailure {
                error: format!("Prepare failed: {}", cause),
            },
            StoreError::Execution(cause) => Self::ExecutionFailure {
                error: format!("Error: {}", cause),
            },
            StoreError::Query(cause) => Self::ExecutionFailure {
                error: format!("Query failed: {}", cause),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => Self::malformed(err.to_string()),
            _ => Self::malformed(format!("Invalid JSON data received: {}", err)),
        }
    }
}

impl From<pbkdf2::password_hash::Error> for Error {
    fn from(err: pbkdf2::password_hash::Error) -> Self {
        Self::InternalError {
            error: format!("Could not hash password: {}", err),
        }
    }
}
