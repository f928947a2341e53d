use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::{
    access_window::{self, AccessWindow},
    enums::{consultation_statuses::ConsultationStatus, payment_methods::PaymentMethod},
};
use crate::infra::db::postgres::schema::interest_entries;

/// One patient's engagement with one doctor. At most one row exists per
/// `(doctor_id, patient_id)`; `consultation_id` is unique across all rows.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = interest_entries)]
pub struct InterestEntryEntity {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub slot_time: Option<String>,
    pub consultation_id: Option<Uuid>,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub gateway_intent_id: Option<String>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterestEntryEntity {
    pub fn access_window(&self, now: DateTime<Utc>) -> AccessWindow {
        access_window::evaluate(self.paid, self.paid_at, self.added_at, now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> ConsultationStatus {
        if self.consultation_id.is_none() && !self.paid {
            return ConsultationStatus::Interested;
        }
        if !self.paid {
            return ConsultationStatus::Pending;
        }
        if self.access_window(now).active {
            ConsultationStatus::Active
        } else {
            ConsultationStatus::Expired
        }
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method.as_deref().and_then(PaymentMethod::from_str)
    }
}

/// Row written when a patient starts (or restarts) a consultation attempt.
/// On conflict only the attempt fields are overwritten; `added_at` and the
/// patient snapshot of the existing row are kept.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = interest_entries)]
pub struct UpsertInterestEntryEntity {
    pub doctor_id: Uuid,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub slot_time: Option<String>,
    pub consultation_id: Option<Uuid>,
    pub gateway_intent_id: Option<String>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identifies the entry a payment applies to. All three keys must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTarget {
    pub doctor_id: Uuid,
    pub patient_id: String,
    pub consultation_id: Uuid,
}
