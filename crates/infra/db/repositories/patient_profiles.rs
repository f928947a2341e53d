use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::patient_profiles},
};
use domain::{
    entities::patient_profiles::{PatientProfileChanges, PatientProfileEntity},
    repositories::patient_profiles::PatientProfileRepository,
};

pub struct PatientProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PatientProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PatientProfileRepository for PatientProfilePostgres {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<PatientProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = patient_profiles::table
            .filter(patient_profiles::uid.eq(uid))
            .select(PatientProfileEntity::as_select())
            .first::<PatientProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert(&self, changes: PatientProfileChanges) -> Result<PatientProfileEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(patient_profiles::table)
            .values(&changes)
            .on_conflict(patient_profiles::uid)
            .do_update()
            .set(&changes)
            .returning(PatientProfileEntity::as_returning())
            .get_result::<PatientProfileEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update(&self, changes: PatientProfileChanges) -> Result<Option<PatientProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(patient_profiles::table)
            .filter(patient_profiles::uid.eq(&changes.uid))
            .set(&changes)
            .returning(PatientProfileEntity::as_returning())
            .get_result::<PatientProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
