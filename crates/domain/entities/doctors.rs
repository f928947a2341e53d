use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::doctors;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = doctors)]
pub struct DoctorEntity {
    pub id: Uuid,
    pub uid: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub consultation_fee: Option<i32>,
    pub experience: Option<i32>,
    pub languages: Option<String>,
    pub available_days: Vec<String>,
    pub available_time_slots: Option<String>,
    pub verified: bool,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
