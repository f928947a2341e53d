use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::usecases::errors::ConsultationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ConsultationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ConsultationError::Internal(err) => {
                error!(error = ?err, status = status.as_u16(), "http: internal error");
                // Don't leak internal error detail to client
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error: self.kind(),
            message,
        });

        (status, body).into_response()
    }
}
