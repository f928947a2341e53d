use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::interest_entries::InterestEntryEntity;
use crate::domain::value_objects::{
    doctors::DoctorSummaryDto,
    enums::{consultation_statuses::ConsultationStatus, payment_methods::PaymentMethod},
};

/// Verified caller identity as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

// Request bodies keep every field optional so missing fields surface as
// validation errors with a readable message instead of a JSON rejection.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub slot_time: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub doctor_id: Option<String>,
    pub consultation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub slot_time: Option<String>,
    pub fee: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntentCommand {
    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub slot_time: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitiatePaymentCommand {
    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub slot_time: String,
    pub fee: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub consultation_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    pub success: bool,
    pub message: String,
    pub consultation_id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub slot_time: String,
    pub fee: Option<serde_json::Value>,
}

/// Answer to "may I chat/call right now". Inactive answers are normal
/// responses carrying a reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationStatusDto {
    pub active: bool,
    pub hours_remaining: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub consultation_id: Uuid,
    #[serde(rename = "doctorSummary", skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorSummaryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl ConsultationStatusDto {
    pub fn inactive(consultation_id: Uuid, reason: &str) -> Self {
        Self {
            active: false,
            hours_remaining: 0.0,
            reason: Some(reason.to_string()),
            consultation_id,
            doctor: None,
            slot_time: None,
            paid_at: None,
            expires_at: None,
            payment_method: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationHistoryItemDto {
    pub consultation_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub slot_time: Option<String>,
    pub status: ConsultationStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub hours_remaining: f64,
    pub payment_method: Option<PaymentMethod>,
    pub added_at: DateTime<Utc>,
}

impl ConsultationHistoryItemDto {
    pub fn from_entry(entry: &InterestEntryEntity, now: DateTime<Utc>) -> Self {
        Self {
            consultation_id: entry.consultation_id,
            doctor_id: entry.doctor_id,
            slot_time: entry.slot_time.clone(),
            status: entry.status(now),
            paid: entry.paid,
            paid_at: entry.paid_at,
            hours_remaining: entry.access_window(now).hours_remaining,
            payment_method: entry.payment_method(),
            added_at: entry.added_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsultationHistoryResponse {
    pub consultations: Vec<ConsultationHistoryItemDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestedPatientDto {
    pub patient_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub slot_time: Option<String>,
    pub consultation_id: Option<Uuid>,
    pub status: ConsultationStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub hours_remaining: f64,
    pub added_at: DateTime<Utc>,
}

impl InterestedPatientDto {
    pub fn from_entry(entry: &InterestEntryEntity, now: DateTime<Utc>) -> Self {
        Self {
            patient_id: entry.patient_id.clone(),
            name: entry.patient_name.clone(),
            email: entry.patient_email.clone(),
            slot_time: entry.slot_time.clone(),
            consultation_id: entry.consultation_id,
            status: entry.status(now),
            paid: entry.paid,
            paid_at: entry.paid_at,
            hours_remaining: entry.access_window(now).hours_remaining,
            added_at: entry.added_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestedPatientsResponse {
    pub doctor_id: Uuid,
    pub interested_patients: Vec<InterestedPatientDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry() -> InterestEntryEntity {
        let now = Utc::now();
        InterestEntryEntity {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: "patient-1".to_string(),
            patient_name: Some("Meera".to_string()),
            patient_email: Some("meera@example.com".to_string()),
            slot_time: None,
            consultation_id: None,
            paid: false,
            paid_at: None,
            payment_method: None,
            gateway_intent_id: None,
            added_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn derived_status_follows_the_lifecycle() {
        let now = Utc::now();
        let mut entry = entry();
        assert_eq!(entry.status(now), ConsultationStatus::Interested);

        entry.consultation_id = Some(Uuid::new_v4());
        entry.slot_time = Some("10:00 AM".to_string());
        assert_eq!(entry.status(now), ConsultationStatus::Pending);

        entry.paid = true;
        entry.paid_at = Some(now - Duration::hours(1));
        entry.payment_method = Some("gateway".to_string());
        assert_eq!(entry.status(now), ConsultationStatus::Active);

        entry.paid_at = Some(now - Duration::hours(25));
        assert_eq!(entry.status(now), ConsultationStatus::Expired);
    }

    #[test]
    fn inactive_status_serializes_without_empty_fields() {
        let consultation_id = Uuid::new_v4();
        let dto = ConsultationStatusDto::inactive(consultation_id, "Payment not completed");
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["active"], false);
        assert_eq!(json["hoursRemaining"], 0.0);
        assert_eq!(json["reason"], "Payment not completed");
        assert!(json.get("doctorSummary").is_none());
        assert!(json.get("paidAt").is_none());
    }

    #[test]
    fn active_status_exposes_doctor_summary() {
        let now = Utc::now();
        let doctor_id = Uuid::new_v4();
        let dto = ConsultationStatusDto {
            active: true,
            hours_remaining: 24.0,
            reason: None,
            consultation_id: Uuid::new_v4(),
            doctor: Some(DoctorSummaryDto {
                id: doctor_id,
                name: "Dr. Asha Rao".to_string(),
                specialty: "Cardiology".to_string(),
            }),
            slot_time: Some("10:00 AM".to_string()),
            paid_at: Some(now),
            expires_at: Some(now + Duration::hours(24)),
            payment_method: Some(PaymentMethod::Gateway),
        };

        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["doctorSummary"]["id"], doctor_id.to_string());
        assert_eq!(json["doctorSummary"]["name"], "Dr. Asha Rao");
        assert!(json.get("doctor").is_none());
        assert_eq!(json["paymentMethod"], "gateway");
    }

    #[test]
    fn create_intent_request_reads_camel_case() {
        let body = serde_json::json!({
            "doctorId": "5f1c9d0e-8a4b-4c77-9b55-0d2f0a1b2c3d",
            "doctorName": "Dr. Rao",
            "slotTime": "10:00 AM",
            "amount": 50000,
            "currency": "inr"
        });
        let request: CreateIntentRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.slot_time.as_deref(), Some("10:00 AM"));
        assert_eq!(request.amount, Some(50000));
    }
}
