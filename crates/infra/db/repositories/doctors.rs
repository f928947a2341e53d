use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::doctors},
};
use domain::{entities::doctors::DoctorEntity, repositories::doctors::DoctorRepository};

pub struct DoctorPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DoctorPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DoctorRepository for DoctorPostgres {
    async fn find_by_id(&self, doctor_id: Uuid) -> Result<Option<DoctorEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = doctors::table
            .filter(doctors::id.eq(doctor_id))
            .select(DoctorEntity::as_select())
            .first::<DoctorEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<DoctorEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = doctors::table
            .filter(doctors::uid.eq(uid))
            .select(DoctorEntity::as_select())
            .first::<DoctorEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_public(&self) -> Result<Vec<DoctorEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = doctors::table
            .filter(doctors::profile_completed.eq(true))
            .order(doctors::created_at.asc())
            .select(DoctorEntity::as_select())
            .load::<DoctorEntity>(&mut conn)?;

        Ok(results)
    }
}
