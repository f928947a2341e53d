//! In-memory stand-ins for the Postgres repositories, mirroring their
//! single-statement upsert semantics.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{
        doctors::DoctorEntity,
        interest_entries::{InterestEntryEntity, PaymentTarget, UpsertInterestEntryEntity},
        patient_profiles::{PatientProfileChanges, PatientProfileEntity},
        users::{InsertUserEntity, UserEntity},
    },
    repositories::{
        doctors::DoctorRepository, interest_entries::InterestEntryRepository,
        patient_profiles::PatientProfileRepository, users::UserRepository,
    },
    value_objects::{
        consultations::PatientIdentity,
        enums::{payment_methods::PaymentMethod, user_roles::UserRole},
    },
};
use uuid::Uuid;

pub fn doctor(uid: &str) -> DoctorEntity {
    let now = Utc::now();
    DoctorEntity {
        id: Uuid::new_v4(),
        uid: uid.to_string(),
        full_name: Some("Dr. Asha Rao".to_string()),
        email: Some("asha@example.com".to_string()),
        specialty: Some("Cardiology".to_string()),
        consultation_fee: Some(500),
        experience: Some(12),
        languages: Some("English, Hindi".to_string()),
        available_days: vec!["Monday".to_string(), "Thursday".to_string()],
        available_time_slots: Some("10:00 AM - 1:00 PM".to_string()),
        verified: true,
        profile_completed: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn patient(id: &str) -> PatientIdentity {
    PatientIdentity {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        name: Some(format!("Patient {id}")),
    }
}

#[derive(Default)]
pub struct InMemoryDoctors {
    doctors: Vec<DoctorEntity>,
}

impl InMemoryDoctors {
    pub fn with(doctors: Vec<DoctorEntity>) -> Self {
        Self { doctors }
    }
}

#[async_trait]
impl DoctorRepository for InMemoryDoctors {
    async fn find_by_id(&self, doctor_id: Uuid) -> Result<Option<DoctorEntity>> {
        Ok(self.doctors.iter().find(|d| d.id == doctor_id).cloned())
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<DoctorEntity>> {
        Ok(self.doctors.iter().find(|d| d.uid == uid).cloned())
    }

    async fn list_public(&self) -> Result<Vec<DoctorEntity>> {
        Ok(self
            .doctors
            .iter()
            .filter(|d| d.profile_completed)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryEntries {
    rows: Mutex<Vec<InterestEntryEntity>>,
}

impl InMemoryEntries {
    pub fn all(&self) -> Vec<InterestEntryEntity> {
        self.rows.lock().unwrap().clone()
    }

    pub fn for_pair(&self, doctor_id: Uuid, patient_id: &str) -> Vec<InterestEntryEntity> {
        self.all()
            .into_iter()
            .filter(|row| row.doctor_id == doctor_id && row.patient_id == patient_id)
            .collect()
    }

    fn new_row(entry: UpsertInterestEntryEntity) -> InterestEntryEntity {
        InterestEntryEntity {
            id: Uuid::new_v4(),
            doctor_id: entry.doctor_id,
            patient_id: entry.patient_id,
            patient_name: entry.patient_name,
            patient_email: entry.patient_email,
            slot_time: entry.slot_time,
            consultation_id: entry.consultation_id,
            paid: false,
            paid_at: None,
            payment_method: None,
            gateway_intent_id: entry.gateway_intent_id,
            added_at: entry.added_at,
            updated_at: entry.updated_at,
        }
    }
}

#[async_trait]
impl InterestEntryRepository for InMemoryEntries {
    async fn upsert_attempt(&self, entry: UpsertInterestEntryEntity) -> Result<InterestEntryEntity> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.doctor_id == entry.doctor_id && row.patient_id == entry.patient_id)
        {
            row.slot_time = entry.slot_time;
            row.consultation_id = entry.consultation_id;
            row.gateway_intent_id = entry.gateway_intent_id;
            row.paid = false;
            row.paid_at = None;
            row.payment_method = None;
            row.updated_at = entry.updated_at;
            return Ok(row.clone());
        }

        let row = Self::new_row(entry);
        rows.push(row.clone());
        Ok(row)
    }

    async fn insert_if_absent(&self, entry: UpsertInterestEntryEntity) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.doctor_id == entry.doctor_id && row.patient_id == entry.patient_id)
        {
            return Ok(false);
        }
        rows.push(Self::new_row(entry));
        Ok(true)
    }

    async fn mark_paid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|row| {
            row.doctor_id == target.doctor_id
                && row.patient_id == target.patient_id
                && row.consultation_id == Some(target.consultation_id)
        }) else {
            return Ok(None);
        };

        row.paid = true;
        row.paid_at = Some(paid_at);
        row.payment_method = Some(method.as_str().to_string());
        row.updated_at = paid_at;
        Ok(Some(row.clone()))
    }

    async fn mark_paid_if_unpaid(
        &self,
        target: &PaymentTarget,
        method: PaymentMethod,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<InterestEntryEntity>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|row| {
            row.doctor_id == target.doctor_id
                && row.patient_id == target.patient_id
                && row.consultation_id == Some(target.consultation_id)
                && !row.paid
        }) else {
            return Ok(None);
        };

        row.paid = true;
        row.paid_at = Some(paid_at);
        row.payment_method = Some(method.as_str().to_string());
        row.updated_at = paid_at;
        Ok(Some(row.clone()))
    }

    async fn find_by_consultation_id(
        &self,
        consultation_id: Uuid,
    ) -> Result<Option<InterestEntryEntity>> {
        Ok(self
            .all()
            .into_iter()
            .find(|row| row.consultation_id == Some(consultation_id)))
    }

    async fn find_for_patient(
        &self,
        consultation_id: Uuid,
        patient_id: &str,
    ) -> Result<Option<InterestEntryEntity>> {
        Ok(self.all().into_iter().find(|row| {
            row.consultation_id == Some(consultation_id) && row.patient_id == patient_id
        }))
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<InterestEntryEntity>> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|row| row.doctor_id == doctor_id)
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<InterestEntryEntity>> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|row| row.patient_id == patient_id)
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserEntity>>,
}

impl InMemoryUsers {
    pub fn with_patients(uids: &[&str]) -> Self {
        let users = Self::default();
        for uid in uids {
            users.insert_role(uid, UserRole::Patient);
        }
        users
    }

    pub fn with_doctor(uid: &str) -> Self {
        let users = Self::default();
        users.insert_role(uid, UserRole::Doctor);
        users
    }

    pub fn insert_role(&self, uid: &str, role: UserRole) {
        let now = Utc::now();
        self.rows.lock().unwrap().push(UserEntity {
            id: Uuid::new_v4(),
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            display_name: format!("User {uid}"),
            role: role.as_str().to_string(),
            provider: Some("password".to_string()),
            metadata: None,
            profile_completed: false,
            created_at: now,
            last_seen: now,
        });
    }

    pub fn all(&self) -> Vec<UserEntity> {
        self.rows.lock().unwrap().clone()
    }

    pub fn find(&self, uid: &str) -> Option<UserEntity> {
        self.all().into_iter().find(|user| user.uid == uid)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserEntity>> {
        Ok(self.find(uid))
    }

    async fn insert_or_touch(&self, user: InsertUserEntity) -> Result<UserEntity> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.uid == user.uid) {
            row.last_seen = user.last_seen;
            return Ok(row.clone());
        }

        let row = UserEntity {
            id: Uuid::new_v4(),
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            provider: user.provider,
            metadata: user.metadata,
            profile_completed: false,
            created_at: user.created_at,
            last_seen: user.last_seen,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn touch_last_seen(&self, uid: &str, at: DateTime<Utc>) -> Result<Option<UserEntity>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| row.uid == uid).map(|row| {
            row.last_seen = at;
            row.clone()
        }))
    }

    async fn mark_profile_completed(&self, uid: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|row| row.uid == uid) else {
            return Ok(false);
        };
        row.profile_completed = true;
        Ok(true)
    }
}

/// Applies only the provided fields, like the diesel changeset does.
#[derive(Default)]
pub struct InMemoryPatientProfiles {
    rows: Mutex<Vec<PatientProfileEntity>>,
}

impl InMemoryPatientProfiles {
    fn apply(row: &mut PatientProfileEntity, changes: PatientProfileChanges) {
        fn set<T>(field: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *field = value;
            }
        }

        set(&mut row.full_name, changes.full_name);
        set(&mut row.age, changes.age);
        set(&mut row.gender, changes.gender);
        set(&mut row.blood_group, changes.blood_group);
        set(&mut row.email, changes.email);
        set(&mut row.phone, changes.phone);
        set(&mut row.address, changes.address);
        set(&mut row.city, changes.city);
        set(&mut row.state, changes.state);
        set(&mut row.pincode, changes.pincode);
        set(&mut row.emergency_name, changes.emergency_name);
        set(&mut row.emergency_contact, changes.emergency_contact);
        set(&mut row.selected_disease, changes.selected_disease);
        set(&mut row.other_disease, changes.other_disease);
        set(&mut row.symptoms, changes.symptoms);
        set(&mut row.allergies, changes.allergies);
        set(&mut row.current_medications, changes.current_medications);
        set(&mut row.specialty, changes.specialty);
        if let Some(documents) = changes.medical_documents {
            row.medical_documents = documents;
        }
        row.updated_at = changes.updated_at;
    }
}

#[async_trait]
impl PatientProfileRepository for InMemoryPatientProfiles {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<PatientProfileEntity>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.uid == uid)
            .cloned())
    }

    async fn upsert(&self, changes: PatientProfileChanges) -> Result<PatientProfileEntity> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.uid == changes.uid) {
            Self::apply(row, changes);
            return Ok(row.clone());
        }

        let mut row = PatientProfileEntity {
            id: Uuid::new_v4(),
            uid: changes.uid.clone(),
            full_name: None,
            age: None,
            gender: None,
            blood_group: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            pincode: None,
            emergency_name: None,
            emergency_contact: None,
            selected_disease: None,
            other_disease: None,
            symptoms: None,
            allergies: None,
            current_medications: None,
            specialty: None,
            medical_documents: serde_json::json!([]),
            created_at: changes.updated_at,
            updated_at: changes.updated_at,
        };
        Self::apply(&mut row, changes);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, changes: PatientProfileChanges) -> Result<Option<PatientProfileEntity>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| row.uid == changes.uid).map(|row| {
            Self::apply(row, changes);
            row.clone()
        }))
    }
}
