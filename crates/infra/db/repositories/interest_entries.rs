use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::interest_entries},
};
use domain::{
    entities::interest_entries::{InterestEntryEntity, PaymentTarget, UpsertInterestEntryEntity},
    repositories::interest_entries::InterestEntryRepository,
    value_objects::enums::payment_methods::PaymentMethod,
};

pub struct InterestEntryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InterestEntryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InterestEntryRepository for InterestEntryPostgres {
    async fn upsert_attempt(&self, entry: UpsertInterestEntryEntity) -> Result<InterestEntryEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Relies on the unique (doctor_id, patient_id) constraint; added_at and
        // the patient snapshot of an existing row are left untouched.
        let result = insert_into(interest_entries::table)
            .values(&entry)
            .on_conflict((interest_entries::doctor_id, interest_entries::patient_id))
            .do_update()
            .set((
                interest_entries::slot_time.eq(&entry.slot_time),
                interest_entries::consultation_id.eq(entry.consultation_id),
                interest_entries::gateway_intent_id.eq(&entry.gateway_intent_id),
                interest_entries::paid.eq(false),
                interest_entries::paid_at.eq(None::<DateTime<Utc>>),
                interest_entries::payment_method.eq(None::<String>),
                interest_entries::updated_at.eq(entry.updated_at),
            ))
            .returning(InterestEntryEntity::as_returning())
            .get_result::<InterestEntryEntity>(&mut conn)?;

        Ok(result)
    }

    async fn insert_if_absent(&self, entry: UpsertInterestEntryEntity) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(interest_entries::table)
            .values(&entry)
            .on_conflict((interest_entries::doctor_id, interest_entries::patient_id))
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted > 0)
    }

    async fn mark_paid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(interest_entries::table)
            .filter(interest_entries::doctor_id.eq(target.doctor_id))
            .filter(interest_entries::patient_id.eq(&target.patient_id))
            .filter(interest_entries::consultation_id.eq(target.consultation_id))
            .set((
                interest_entries::paid.eq(true),
                interest_entries::paid_at.eq(Some(paid_at)),
                interest_entries::payment_method.eq(Some(method.to_string())),
                interest_entries::updated_at.eq(paid_at),
            ))
            .returning(InterestEntryEntity::as_returning())
            .get_result::<InterestEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn mark_paid_if_unpaid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(interest_entries::table)
            .filter(interest_entries::doctor_id.eq(target.doctor_id))
            .filter(interest_entries::patient_id.eq(&target.patient_id))
            .filter(interest_entries::consultation_id.eq(target.consultation_id))
            .filter(interest_entries::paid.eq(false))
            .set((
                interest_entries::paid.eq(true),
                interest_entries::paid_at.eq(Some(paid_at)),
                interest_entries::payment_method.eq(Some(method.to_string())),
                interest_entries::updated_at.eq(paid_at),
            ))
            .returning(InterestEntryEntity::as_returning())
            .get_result::<InterestEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_consultation_id(
        &self,
        consultation_id: Uuid,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = interest_entries::table
            .filter(interest_entries::consultation_id.eq(consultation_id))
            .select(InterestEntryEntity::as_select())
            .first::<InterestEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_for_patient(
        &self,
        consultation_id: Uuid,
        patient_id: &str,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = interest_entries::table
            .filter(interest_entries::consultation_id.eq(consultation_id))
            .filter(interest_entries::patient_id.eq(patient_id))
            .select(InterestEntryEntity::as_select())
            .first::<InterestEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = interest_entries::table
            .filter(interest_entries::doctor_id.eq(doctor_id))
            .order(interest_entries::updated_at.desc())
            .select(InterestEntryEntity::as_select())
            .load::<InterestEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<InterestEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = interest_entries::table
            .filter(interest_entries::patient_id.eq(patient_id))
            .order(interest_entries::updated_at.desc())
            .select(InterestEntryEntity::as_select())
            .load::<InterestEntryEntity>(&mut conn)?;

        Ok(results)
    }
}
