use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::doctors::DoctorEntity;

#[automock]
#[async_trait]
pub trait DoctorRepository {
    async fn find_by_id(&self, doctor_id: Uuid) -> Result<Option<DoctorEntity>>;

    async fn find_by_uid(&self, uid: &str) -> Result<Option<DoctorEntity>>;

    async fn list_public(&self) -> Result<Vec<DoctorEntity>>;
}
