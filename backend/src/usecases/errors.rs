use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsultationError {
    #[error("invalid or missing identity token")]
    AuthInvalid,
    #[error("{0}")]
    Validation(String),
    #[error("only patients can book consultations")]
    PatientOnly,
    #[error("dummy payments are disabled")]
    DummyPaymentsDisabled,
    #[error("consultation is not active")]
    ConsultationInactive,
    #[error("consultation not found")]
    ConsultationNotFound,
    #[error("doctor not found")]
    DoctorNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("payment gateway unavailable")]
    PaymentGatewayUnavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ConsultationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConsultationError::AuthInvalid => StatusCode::UNAUTHORIZED,
            ConsultationError::Validation(_) | ConsultationError::InvalidWebhook(_) => {
                StatusCode::BAD_REQUEST
            }
            ConsultationError::PatientOnly
            | ConsultationError::DummyPaymentsDisabled
            | ConsultationError::ConsultationInactive => StatusCode::FORBIDDEN,
            ConsultationError::ConsultationNotFound
            | ConsultationError::DoctorNotFound
            | ConsultationError::UserNotFound => StatusCode::NOT_FOUND,
            ConsultationError::PaymentGatewayUnavailable | ConsultationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable name for the JSON body.
    pub fn kind(&self) -> &'static str {
        match self {
            ConsultationError::AuthInvalid => "auth_invalid",
            ConsultationError::Validation(_) => "validation_error",
            ConsultationError::PatientOnly => "patient_only",
            ConsultationError::DummyPaymentsDisabled => "dummy_payments_disabled",
            ConsultationError::ConsultationInactive => "consultation_inactive",
            ConsultationError::ConsultationNotFound => "consultation_not_found",
            ConsultationError::DoctorNotFound => "doctor_not_found",
            ConsultationError::UserNotFound => "user_not_found",
            ConsultationError::InvalidWebhook(_) => "invalid_webhook",
            ConsultationError::PaymentGatewayUnavailable => "payment_gateway_unavailable",
            ConsultationError::Internal(_) => "internal_error",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ConsultationError>;
