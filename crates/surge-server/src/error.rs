use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use surge_core::{Error, ErrorKind};
use tracing::error;

/// Error returned by handlers. Wraps the domain error and picks the status.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(Error::bad_input(message))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(kind = %self.0.kind(), error = %self.0, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.kind().as_str(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}
