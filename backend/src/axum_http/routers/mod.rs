pub mod consultation_rooms;
pub mod doctors;
pub mod patients;
pub mod payments;
pub mod users;

use axum::{Json, extract::rejection::JsonRejection};

use crate::usecases::errors::{ConsultationError, UseCaseResult};

/// Malformed JSON reads as a validation failure with our error body.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> UseCaseResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ConsultationError::Validation(rejection.body_text()))
}
