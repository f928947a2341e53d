use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::doctors::DoctorEntity;
use crate::domain::value_objects::consultations::InterestedPatientDto;

const DEFAULT_DOCTOR_NAME: &str = "Doctor";
const DEFAULT_SPECIALTY: &str = "General Medicine";
const DEFAULT_FEE: &str = "₹500";
const DEFAULT_LANGUAGES: &str = "English";
const DEFAULT_AVAILABILITY: &str = "Slots";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
}

impl From<&DoctorEntity> for DoctorSummaryDto {
    fn from(doctor: &DoctorEntity) -> Self {
        Self {
            id: doctor.id,
            name: display_name(doctor),
            specialty: specialty(doctor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotDto {
    pub time: String,
    pub available: bool,
}

/// Directory listing shape consumed by the doctor search page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDoctorDto {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub diseases: Vec<String>,
    pub fee: String,
    pub fee_minor: Option<i64>,
    pub availability: String,
    pub experience: String,
    pub languages: String,
    pub time_slots: Vec<TimeSlotDto>,
    pub verified: bool,
}

impl From<DoctorEntity> for PublicDoctorDto {
    fn from(doctor: DoctorEntity) -> Self {
        let fee = doctor
            .consultation_fee
            .map(|fee| format!("₹{fee}"))
            .unwrap_or_else(|| DEFAULT_FEE.to_string());
        // Fees are stored in whole rupees; the gateway charges in paise.
        let fee_minor = doctor.consultation_fee.map(|fee| i64::from(fee) * 100);

        Self {
            id: doctor.id,
            name: display_name(&doctor),
            specialty: specialty(&doctor),
            diseases: Vec::new(),
            fee,
            fee_minor,
            availability: doctor
                .available_time_slots
                .clone()
                .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
            experience: format!("{} yrs", doctor.experience.unwrap_or(0)),
            languages: doctor
                .languages
                .clone()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGES.to_string()),
            time_slots: doctor
                .available_days
                .iter()
                .map(|day| TimeSlotDto {
                    time: day.clone(),
                    available: true,
                })
                .collect(),
            verified: doctor.verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicDoctorsResponse {
    pub doctors: Vec<PublicDoctorDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDoctorResponse {
    pub message: String,
    pub doctor_id: Uuid,
}

/// The signed-in doctor's own record, as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileDto {
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

impl From<DoctorEntity> for DoctorProfileDto {
    fn from(doctor: DoctorEntity) -> Self {
        Self {
            id: doctor.id,
            uid: doctor.uid,
            full_name: doctor.full_name,
            email: doctor.email,
            specialty: doctor.specialty,
            consultation_fee: doctor.consultation_fee,
            experience: doctor.experience,
            languages: doctor.languages,
            available_days: doctor.available_days,
            available_time_slots: doctor.available_time_slots,
            verified: doctor.verified,
            profile_completed: doctor.profile_completed,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileResponse {
    pub message: String,
    pub doctor: DoctorProfileDto,
    pub interested_patients: Vec<InterestedPatientDto>,
}

fn display_name(doctor: &DoctorEntity) -> String {
    doctor
        .full_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOCTOR_NAME.to_string())
}

fn specialty(doctor: &DoctorEntity) -> String {
    doctor
        .specialty
        .clone()
        .filter(|specialty| !specialty.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SPECIALTY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doctor() -> DoctorEntity {
        let now = Utc::now();
        DoctorEntity {
            id: Uuid::new_v4(),
            uid: "doctor-uid".to_string(),
            full_name: None,
            email: None,
            specialty: None,
            consultation_fee: None,
            experience: None,
            languages: None,
            available_days: vec![],
            available_time_slots: None,
            verified: false,
            profile_completed: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_listing_fills_defaults() {
        let dto = PublicDoctorDto::from(doctor());

        assert_eq!(dto.name, "Doctor");
        assert_eq!(dto.specialty, "General Medicine");
        assert_eq!(dto.fee, "₹500");
        assert_eq!(dto.fee_minor, None);
        assert_eq!(dto.experience, "0 yrs");
        assert_eq!(dto.languages, "English");
        assert!(dto.time_slots.is_empty());
    }

    #[test]
    fn public_listing_maps_profile_fields() {
        let mut entity = doctor();
        entity.full_name = Some("Dr. Asha Rao".to_string());
        entity.specialty = Some("Dermatology".to_string());
        entity.consultation_fee = Some(450);
        entity.experience = Some(12);
        entity.available_days = vec!["Monday".to_string(), "Thursday".to_string()];

        let dto = PublicDoctorDto::from(entity);

        assert_eq!(dto.name, "Dr. Asha Rao");
        assert_eq!(dto.fee, "₹450");
        assert_eq!(dto.fee_minor, Some(45_000));
        assert_eq!(dto.experience, "12 yrs");
        assert_eq!(dto.time_slots.len(), 2);
        assert_eq!(dto.time_slots[1].time, "Thursday");
    }
}
