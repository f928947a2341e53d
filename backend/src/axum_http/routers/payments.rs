use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{
            doctors::DoctorRepository, interest_entries::InterestEntryRepository,
            users::UserRepository,
        },
        value_objects::consultations::{
            ConfirmPaymentRequest, CreateIntentRequest, InitiatePaymentRequest,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            doctors::DoctorPostgres, interest_entries::InterestEntryPostgres, users::UserPostgres,
        },
    },
    payments::stripe_client::StripeClient,
};
use serde_json::json;
use tracing::{info, warn};

use super::json_body;
use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    usecases::{
        errors::ConsultationError,
        payments::{PaymentGateway, PaymentSettings, PaymentUseCase},
    },
};

type Doctors = DoctorPostgres;
type Entries = InterestEntryPostgres;
type Users = UserPostgres;

const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Result<Router> {
    let gateway = match config.payments.stripe.as_ref() {
        Some(stripe) => Some(Arc::new(StripeClient::new(
            stripe.secret_key.clone(),
            stripe.webhook_secret.clone(),
            stripe.api_base.clone(),
        )?)),
        None => {
            warn!("payments: STRIPE_SECRET_KEY not set; gateway payments disabled");
            None
        }
    };

    let payments_usecase = PaymentUseCase::new(
        Arc::new(DoctorPostgres::new(Arc::clone(&db_pool))),
        Arc::new(InterestEntryPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        gateway,
        PaymentSettings {
            default_currency: config.payments.default_currency.clone(),
            dummy_enabled: config.payments.dummy_enabled,
        },
    );

    Ok(Router::new()
        .route("/create-intent", post(create_intent::<Doctors, Entries, Users, StripeClient>))
        .route("/confirm", post(confirm::<Doctors, Entries, Users, StripeClient>))
        .route("/status/:consultation_id", get(status::<Doctors, Entries, Users, StripeClient>))
        .route("/initiate", post(initiate::<Doctors, Entries, Users, StripeClient>))
        .route("/webhook", post(webhook::<Doctors, Entries, Users, StripeClient>))
        .route("/consultations", get(consultation_history::<Doctors, Entries, Users, StripeClient>))
        .with_state(Arc::new(payments_usecase)))
}

pub async fn create_intent<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    auth: AuthUser,
    payload: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let request = json_body(payload)?;
    let response = payments_usecase
        .create_intent(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn confirm<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    auth: AuthUser,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let request = json_body(payload)?;
    let response = payments_usecase
        .confirm(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn status<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    auth: AuthUser,
    Path(consultation_id): Path<String>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let response = payments_usecase
        .status(&auth.to_patient(), &consultation_id, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn initiate<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    auth: AuthUser,
    payload: Result<Json<InitiatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let request = json_body(payload)?;
    let response = payments_usecase
        .initiate(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}

// Public: authenticity comes from the signature header.
pub async fn webhook<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ConsultationError::InvalidWebhook("missing stripe-signature header".into()))?;

    info!(payload_bytes = body.len(), "payments: webhook received");
    payments_usecase
        .handle_gateway_webhook(&body, signature, Utc::now())
        .await?;

    Ok(Json(json!({ "received": true })))
}

pub async fn consultation_history<D, I, U, G>(
    State(payments_usecase): State<Arc<PaymentUseCase<D, I, U, G>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let response = payments_usecase
        .consultation_history(&auth.to_patient(), Utc::now())
        .await?;
    Ok(Json(response))
}
