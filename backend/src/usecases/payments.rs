use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::{
    domain::{
        entities::{
            doctors::DoctorEntity,
            interest_entries::{InterestEntryEntity, PaymentTarget, UpsertInterestEntryEntity},
        },
        repositories::{
            doctors::DoctorRepository, interest_entries::InterestEntryRepository,
            users::UserRepository,
        },
        value_objects::{
            consultations::{
                ConfirmPaymentRequest, ConfirmPaymentResponse, ConsultationHistoryItemDto,
                ConsultationHistoryResponse, ConsultationStatusDto, CreateIntentCommand,
                CreateIntentRequest, CreateIntentResponse, InitiatePaymentCommand,
                InitiatePaymentRequest, InitiatePaymentResponse, PatientIdentity,
            },
            doctors::DoctorSummaryDto,
            enums::payment_methods::PaymentMethod,
        },
    },
    payments::stripe_client::{StripeClient, StripeEvent, StripePaymentIntent},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::errors::{ConsultationError, UseCaseResult};
use super::users::require_patient;

pub const REASON_NOT_FOUND: &str = "Consultation not found";
pub const REASON_UNPAID: &str = "Payment not completed";
pub const REASON_EXPIRED: &str = "Consultation window has expired";

const PAYMENT_SUCCEEDED_EVENT: &str = "payment_intent.succeeded";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<StripePaymentIntent>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<StripePaymentIntent> {
        self.create_payment_intent(amount_minor, currency, metadata)
            .await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

/// What recording a payment does to an entry that is already paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPayment {
    /// Client confirmation: `paid_at` moves to the latest confirm.
    Restamp,
    Keep,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub default_currency: String,
    pub dummy_enabled: bool,
}

pub struct PaymentUseCase<D, I, U, G>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    doctor_repo: Arc<D>,
    entry_repo: Arc<I>,
    user_repo: Arc<U>,
    gateway: Option<Arc<G>>,
    settings: PaymentSettings,
}

impl<D, I, U, G> PaymentUseCase<D, I, U, G>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        doctor_repo: Arc<D>,
        entry_repo: Arc<I>,
        user_repo: Arc<U>,
        gateway: Option<Arc<G>>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            doctor_repo,
            entry_repo,
            user_repo,
            gateway,
            settings,
        }
    }

    /// Starts a gateway payment. The returned consultation id becomes the
    /// pair's current attempt; earlier attempts for the pair are superseded.
    pub async fn create_intent(
        &self,
        patient: &PatientIdentity,
        request: CreateIntentRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CreateIntentResponse> {
        let command = validate_create_intent(request, &self.settings.default_currency)?;
        require_patient(self.user_repo.as_ref(), &patient.id).await?;
        info!(
            patient_id = %patient.id,
            doctor_id = %command.doctor_id,
            amount_minor = command.amount_minor,
            currency = %command.currency,
            "payments: create intent requested"
        );

        let Some(gateway) = self.gateway.as_ref() else {
            error!(
                doctor_id = %command.doctor_id,
                status = ConsultationError::PaymentGatewayUnavailable.status_code().as_u16(),
                "payments: gateway is not configured"
            );
            return Err(ConsultationError::PaymentGatewayUnavailable);
        };

        let consultation_id = Uuid::new_v4();
        let mut metadata = HashMap::from([
            ("consultation_id".to_string(), consultation_id.to_string()),
            ("doctor_id".to_string(), command.doctor_id.to_string()),
            ("patient_id".to_string(), patient.id.clone()),
            ("slot_time".to_string(), command.slot_time.clone()),
        ]);
        if let Some(email) = patient.email.as_ref() {
            metadata.insert("patient_email".to_string(), email.clone());
        }

        let intent = gateway
            .create_payment_intent(command.amount_minor, &command.currency, metadata)
            .await
            .map_err(|err| {
                error!(
                    %consultation_id,
                    doctor_id = %command.doctor_id,
                    gateway_error = ?err,
                    "payments: gateway intent creation failed"
                );
                ConsultationError::PaymentGatewayUnavailable
            })?;

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            error!(
                %consultation_id,
                intent_id = %intent.id,
                "payments: gateway intent has no client secret"
            );
            ConsultationError::PaymentGatewayUnavailable
        })?;

        let doctor = self.find_doctor(command.doctor_id).await?;
        if doctor.is_none() {
            // The client can still pay; confirm will report the consultation as missing.
            warn!(
                %consultation_id,
                doctor_id = %command.doctor_id,
                intent_id = %intent.id,
                "payments: doctor not found; intent created without an interest entry"
            );
            return Ok(CreateIntentResponse {
                client_secret,
                consultation_id,
            });
        }

        let entry = self
            .entry_repo
            .upsert_attempt(UpsertInterestEntryEntity {
                doctor_id: command.doctor_id,
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                patient_email: patient.email.clone(),
                slot_time: Some(command.slot_time),
                consultation_id: Some(consultation_id),
                gateway_intent_id: Some(intent.id.clone()),
                added_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %consultation_id,
                    doctor_id = %command.doctor_id,
                    db_error = ?err,
                    "payments: failed to record consultation attempt"
                );
                ConsultationError::Internal(err)
            })?;

        info!(
            %consultation_id,
            entry_id = %entry.id,
            intent_id = %intent.id,
            "payments: intent created and attempt recorded"
        );

        Ok(CreateIntentResponse {
            client_secret,
            consultation_id,
        })
    }

    /// Client-side confirmation after the gateway accepted the payment.
    /// Confirming again re-stamps `paid_at`.
    pub async fn confirm(
        &self,
        patient: &PatientIdentity,
        request: ConfirmPaymentRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ConfirmPaymentResponse> {
        let doctor_id = parse_uuid_field(request.doctor_id.as_deref(), "doctorId")?;
        let consultation_id = parse_uuid_field(request.consultation_id.as_deref(), "consultationId")?;
        require_patient(self.user_repo.as_ref(), &patient.id).await?;

        info!(
            patient_id = %patient.id,
            %doctor_id,
            %consultation_id,
            "payments: confirm requested"
        );

        if self.find_doctor(doctor_id).await?.is_none() {
            warn!(%doctor_id, %consultation_id, "payments: confirm for unknown doctor");
            return Err(ConsultationError::ConsultationNotFound);
        }

        let target = PaymentTarget {
            doctor_id,
            patient_id: patient.id.clone(),
            consultation_id,
        };
        self.record_payment(&target, PaymentMethod::Gateway, RepeatPayment::Restamp, now)
            .await?;

        Ok(ConfirmPaymentResponse { success: true })
    }

    /// Whether the caller may chat/call for this consultation right now.
    /// Another patient's consultation reads as not found.
    pub async fn status(
        &self,
        patient: &PatientIdentity,
        consultation_id: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ConsultationStatusDto> {
        let consultation_id = parse_uuid_field(Some(consultation_id), "consultationId")?;

        let entry = self
            .entry_repo
            .find_for_patient(consultation_id, &patient.id)
            .await
            .map_err(|err| {
                error!(
                    %consultation_id,
                    db_error = ?err,
                    "payments: failed to load consultation status"
                );
                ConsultationError::Internal(err)
            })?;

        let Some(entry) = entry else {
            debug!(%consultation_id, patient_id = %patient.id, "payments: status for unknown consultation");
            return Ok(ConsultationStatusDto::inactive(consultation_id, REASON_NOT_FOUND));
        };

        if !entry.paid {
            return Ok(ConsultationStatusDto::inactive(consultation_id, REASON_UNPAID));
        }

        let window = entry.access_window(now);
        let doctor = match self.find_doctor(entry.doctor_id).await {
            Ok(doctor) => doctor.as_ref().map(DoctorSummaryDto::from),
            Err(err) => {
                warn!(%consultation_id, error = %err, "payments: doctor summary unavailable");
                None
            }
        };

        Ok(ConsultationStatusDto {
            active: window.active,
            hours_remaining: window.hours_remaining,
            reason: (!window.active).then(|| REASON_EXPIRED.to_string()),
            consultation_id,
            doctor,
            slot_time: entry.slot_time.clone(),
            paid_at: entry.paid_at,
            expires_at: window.expires_at,
            payment_method: entry.payment_method(),
        })
    }

    /// Payment path that bypasses the gateway. Only available while dummy
    /// payments are enabled.
    pub async fn initiate(
        &self,
        patient: &PatientIdentity,
        request: InitiatePaymentRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<InitiatePaymentResponse> {
        let command = validate_initiate(request)?;
        require_patient(self.user_repo.as_ref(), &patient.id).await?;

        if !self.settings.dummy_enabled {
            warn!(
                patient_id = %patient.id,
                doctor_id = %command.doctor_id,
                payment_path = "dummy",
                "payments: dummy payment rejected; disabled by configuration"
            );
            return Err(ConsultationError::DummyPaymentsDisabled);
        }

        let Some(doctor) = self.find_doctor(command.doctor_id).await? else {
            warn!(doctor_id = %command.doctor_id, "payments: dummy payment for unknown doctor");
            return Err(ConsultationError::DoctorNotFound);
        };

        let consultation_id = Uuid::new_v4();
        self.entry_repo
            .upsert_attempt(UpsertInterestEntryEntity {
                doctor_id: doctor.id,
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                patient_email: patient.email.clone(),
                slot_time: Some(command.slot_time.clone()),
                consultation_id: Some(consultation_id),
                gateway_intent_id: None,
                added_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %consultation_id,
                    doctor_id = %doctor.id,
                    db_error = ?err,
                    "payments: failed to record dummy consultation attempt"
                );
                ConsultationError::Internal(err)
            })?;

        let target = PaymentTarget {
            doctor_id: doctor.id,
            patient_id: patient.id.clone(),
            consultation_id,
        };
        self.record_payment(&target, PaymentMethod::Dummy, RepeatPayment::Restamp, now)
            .await?;

        Ok(InitiatePaymentResponse {
            success: true,
            message: "Payment successful! You can now chat with the doctor.".to_string(),
            consultation_id,
            doctor_id: doctor.id,
            doctor_name: command.doctor_name.or(doctor.full_name),
            slot_time: command.slot_time,
            fee: command.fee,
        })
    }

    /// The only place an entry becomes paid. With `RepeatPayment::Keep` an
    /// entry that is already paid is returned as is and its window keeps its
    /// original anchor.
    pub async fn record_payment(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        repeat: RepeatPayment,
        now: DateTime<Utc>,
    ) -> UseCaseResult<InterestEntryEntity> {
        let marked = match repeat {
            RepeatPayment::Restamp => self.entry_repo.mark_paid(target, method, now).await,
            RepeatPayment::Keep => self.entry_repo.mark_paid_if_unpaid(target, method, now).await,
        }
        .map_err(|err| {
            error!(
                consultation_id = %target.consultation_id,
                doctor_id = %target.doctor_id,
                payment_method = %method,
                db_error = ?err,
                "payments: failed to record payment"
            );
            ConsultationError::Internal(err)
        })?;

        let entry = match marked {
            Some(entry) => entry,
            None if repeat == RepeatPayment::Keep => {
                let paid = self.already_paid(target).await?.ok_or_else(|| {
                    warn!(
                        consultation_id = %target.consultation_id,
                        doctor_id = %target.doctor_id,
                        patient_id = %target.patient_id,
                        payment_method = %method,
                        "payments: no entry matches payment target"
                    );
                    ConsultationError::ConsultationNotFound
                })?;
                debug!(
                    consultation_id = %target.consultation_id,
                    paid_at = ?paid.paid_at,
                    "payments: consultation already paid; window left unchanged"
                );
                return Ok(paid);
            }
            None => {
                warn!(
                    consultation_id = %target.consultation_id,
                    doctor_id = %target.doctor_id,
                    patient_id = %target.patient_id,
                    payment_method = %method,
                    "payments: no entry matches payment target"
                );
                return Err(ConsultationError::ConsultationNotFound);
            }
        };

        match method {
            PaymentMethod::Dummy => warn!(
                consultation_id = %target.consultation_id,
                doctor_id = %target.doctor_id,
                payment_path = "dummy",
                "payments: consultation marked paid without gateway"
            ),
            PaymentMethod::Gateway => info!(
                consultation_id = %target.consultation_id,
                doctor_id = %target.doctor_id,
                payment_path = "gateway",
                "payments: consultation marked paid"
            ),
        }

        Ok(entry)
    }

    async fn already_paid(&self, target: &PaymentTarget) -> UseCaseResult<Option<InterestEntryEntity>> {
        let entry = self
            .entry_repo
            .find_for_patient(target.consultation_id, &target.patient_id)
            .await
            .map_err(|err| {
                error!(
                    consultation_id = %target.consultation_id,
                    db_error = ?err,
                    "payments: failed to load consultation"
                );
                ConsultationError::Internal(err)
            })?;

        Ok(entry.filter(|entry| entry.paid && entry.doctor_id == target.doctor_id))
    }

    pub async fn handle_gateway_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<()> {
        let Some(gateway) = self.gateway.as_ref() else {
            error!("payments: webhook received but gateway is not configured");
            return Err(ConsultationError::PaymentGatewayUnavailable);
        };

        let event = gateway
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(
                    error = %err,
                    status = ConsultationError::InvalidWebhook(String::new()).status_code().as_u16(),
                    "payments: webhook verification failed"
                );
                ConsultationError::InvalidWebhook("signature verification failed".into())
            })?;

        info!(event_type = %event.type_, event_id = ?event.id, "payments: webhook verified");

        if event.type_ != PAYMENT_SUCCEEDED_EVENT {
            debug!(event_type = %event.type_, "payments: unhandled webhook event type");
            return Ok(());
        }

        let intent = StripeClient::extract_payment_intent(&event).ok_or_else(|| {
            warn!(event_id = ?event.id, "payments: webhook without payment intent object");
            ConsultationError::InvalidWebhook("payment intent missing".into())
        })?;

        let Some(target) = payment_target_from_metadata(&intent.metadata) else {
            // Intents created outside this service carry no consultation metadata.
            warn!(intent_id = %intent.id, "payments: webhook intent has no consultation metadata");
            return Ok(());
        };

        // Gateways redeliver events; a late delivery must not restart the window.
        match self
            .record_payment(&target, PaymentMethod::Gateway, RepeatPayment::Keep, now)
            .await
        {
            Ok(_) => Ok(()),
            Err(ConsultationError::ConsultationNotFound) => {
                warn!(
                    intent_id = %intent.id,
                    consultation_id = %target.consultation_id,
                    "payments: webhook for superseded or unknown consultation acknowledged"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// The caller's consultations across doctors, newest first.
    pub async fn consultation_history(
        &self,
        patient: &PatientIdentity,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ConsultationHistoryResponse> {
        let entries = self
            .entry_repo
            .list_for_patient(&patient.id)
            .await
            .map_err(|err| {
                error!(patient_id = %patient.id, db_error = ?err, "payments: failed to list history");
                ConsultationError::Internal(err)
            })?;

        Ok(ConsultationHistoryResponse {
            consultations: entries
                .iter()
                .map(|entry| ConsultationHistoryItemDto::from_entry(entry, now))
                .collect(),
        })
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> UseCaseResult<Option<DoctorEntity>> {
        self.doctor_repo.find_by_id(doctor_id).await.map_err(|err| {
            error!(%doctor_id, db_error = ?err, "payments: failed to load doctor");
            ConsultationError::Internal(err)
        })
    }
}

pub(crate) fn required_text(value: Option<String>, field: &str) -> UseCaseResult<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConsultationError::Validation(format!("{field} is required")))
}

pub(crate) fn parse_uuid_field(value: Option<&str>, field: &str) -> UseCaseResult<Uuid> {
    let raw = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConsultationError::Validation(format!("{field} is required")))?;

    Uuid::parse_str(raw)
        .map_err(|_| ConsultationError::Validation(format!("{field} is not a valid id")))
}

fn validate_create_intent(
    request: CreateIntentRequest,
    default_currency: &str,
) -> UseCaseResult<CreateIntentCommand> {
    let doctor_id = parse_uuid_field(request.doctor_id.as_deref(), "doctorId")?;
    let slot_time = required_text(request.slot_time, "slotTime")?;
    let amount_minor = match request.amount {
        Some(amount) if amount > 0 => amount,
        Some(_) => {
            return Err(ConsultationError::Validation(
                "amount must be a positive integer".into(),
            ));
        }
        None => return Err(ConsultationError::Validation("amount is required".into())),
    };
    let currency = request
        .currency
        .map(|currency| currency.trim().to_ascii_lowercase())
        .filter(|currency| !currency.is_empty())
        .unwrap_or_else(|| default_currency.to_string());

    Ok(CreateIntentCommand {
        doctor_id,
        doctor_name: request.doctor_name,
        slot_time,
        amount_minor,
        currency,
    })
}

fn validate_initiate(request: InitiatePaymentRequest) -> UseCaseResult<InitiatePaymentCommand> {
    Ok(InitiatePaymentCommand {
        doctor_id: parse_uuid_field(request.doctor_id.as_deref(), "doctorId")?,
        slot_time: required_text(request.slot_time, "slotTime")?,
        doctor_name: request.doctor_name,
        fee: request.fee,
    })
}

fn payment_target_from_metadata(metadata: &HashMap<String, String>) -> Option<PaymentTarget> {
    let consultation_id = metadata.get("consultation_id")?.parse().ok()?;
    let doctor_id = metadata.get("doctor_id")?.parse().ok()?;
    let patient_id = metadata.get("patient_id")?.trim();
    if patient_id.is_empty() {
        return None;
    }

    Some(PaymentTarget {
        doctor_id,
        patient_id: patient_id.to_string(),
        consultation_id,
    })
}
