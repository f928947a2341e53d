use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::patient_profiles::{PatientProfileChanges, PatientProfileEntity};

#[automock]
#[async_trait]
pub trait PatientProfileRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<PatientProfileEntity>>;

    /// One row per uid; provided fields overwrite, the rest are kept.
    async fn upsert(&self, changes: PatientProfileChanges) -> Result<PatientProfileEntity>;

    /// `None` when the uid has no profile yet.
    async fn update(&self, changes: PatientProfileChanges) -> Result<Option<PatientProfileEntity>>;
}
