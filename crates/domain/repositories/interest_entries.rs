use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::interest_entries::{
    InterestEntryEntity, PaymentTarget, UpsertInterestEntryEntity,
};
use crate::domain::value_objects::enums::payment_methods::PaymentMethod;

/// Storage for interest entries. Every mutation is a single atomic statement
/// keyed by `(doctor_id, patient_id)` so concurrent requests for the same pair
/// cannot produce duplicates.
#[automock]
#[async_trait]
pub trait InterestEntryRepository {
    /// Inserts or overwrites the pair's entry with a new unpaid attempt.
    async fn upsert_attempt(&self, entry: UpsertInterestEntryEntity) -> Result<InterestEntryEntity>;

    /// Inserts a bare entry unless one already exists. Returns whether a row
    /// was written.
    async fn insert_if_absent(&self, entry: UpsertInterestEntryEntity) -> Result<bool>;

    /// Marks the entry matching all keys of `target` as paid. `None` when no
    /// entry matches.
    async fn mark_paid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>>;

    /// Like `mark_paid` but leaves an already paid entry untouched, so a
    /// repeated settlement never moves `paid_at`. `None` when no unpaid entry
    /// matches.
    async fn mark_paid_if_unpaid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>>;

    async fn find_by_consultation_id(
        &self,
        consultation_id: Uuid,
    ) -> Result<Option<InterestEntryEntity>>;

    async fn find_for_patient(
        &self,
        consultation_id: Uuid,
        patient_id: &str,
    ) -> Result<Option<InterestEntryEntity>>;

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<InterestEntryEntity>>;

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<InterestEntryEntity>>;
}
