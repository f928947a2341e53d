use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::patient_profiles;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = patient_profiles)]
pub struct PatientProfileEntity {
    pub id: Uuid,
    pub uid: String,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_contact: Option<String>,
    pub selected_disease: Option<String>,
    pub other_disease: Option<String>,
    pub symptoms: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub specialty: Option<String>,
    pub medical_documents: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a submit or update writes. `None` leaves the stored column as it
/// is, both on insert (column default) and on update.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = patient_profiles)]
pub struct PatientProfileChanges {
    pub uid: String,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_contact: Option<String>,
    pub selected_disease: Option<String>,
    pub other_disease: Option<String>,
    pub symptoms: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub specialty: Option<String>,
    pub medical_documents: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
