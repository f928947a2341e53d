use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{doctors::DoctorEntity, interest_entries::UpsertInterestEntryEntity},
    repositories::{
        doctors::DoctorRepository, interest_entries::InterestEntryRepository,
        users::UserRepository,
    },
    value_objects::{
        consultations::{InterestedPatientDto, InterestedPatientsResponse, PatientIdentity},
        doctors::{
            DoctorProfileDto, DoctorProfileResponse, PublicDoctorDto, PublicDoctorsResponse,
            SelectDoctorResponse,
        },
    },
};
use tracing::{error, info, warn};

use super::errors::{ConsultationError, UseCaseResult};
use super::payments::parse_uuid_field;
use super::users::require_patient;

pub struct DoctorUseCase<D, I, U>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    doctor_repo: Arc<D>,
    entry_repo: Arc<I>,
    user_repo: Arc<U>,
}

impl<D, I, U> DoctorUseCase<D, I, U>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(doctor_repo: Arc<D>, entry_repo: Arc<I>, user_repo: Arc<U>) -> Self {
        Self {
            doctor_repo,
            entry_repo,
            user_repo,
        }
    }

    pub async fn list_public(&self) -> UseCaseResult<PublicDoctorsResponse> {
        let doctors = self.doctor_repo.list_public().await.map_err(|err| {
            error!(db_error = ?err, "doctors: failed to list public doctors");
            ConsultationError::Internal(err)
        })?;

        info!(doctor_count = doctors.len(), "doctors: public directory loaded");

        Ok(PublicDoctorsResponse {
            doctors: doctors.into_iter().map(PublicDoctorDto::from).collect(),
        })
    }

    /// Records that the patient is interested in the doctor. Repeat calls
    /// leave the existing entry untouched. Only patients may select.
    pub async fn record_interest(
        &self,
        patient: &PatientIdentity,
        doctor_id: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SelectDoctorResponse> {
        let doctor_id = parse_uuid_field(Some(doctor_id), "doctorId")?;
        require_patient(self.user_repo.as_ref(), &patient.id).await?;

        let doctor = self
            .doctor_repo
            .find_by_id(doctor_id)
            .await
            .map_err(|err| {
                error!(%doctor_id, db_error = ?err, "doctors: failed to load doctor");
                ConsultationError::Internal(err)
            })?;
        if doctor.is_none() {
            warn!(%doctor_id, patient_id = %patient.id, "doctors: select for unknown doctor");
            return Err(ConsultationError::DoctorNotFound);
        }

        let inserted = self
            .entry_repo
            .insert_if_absent(UpsertInterestEntryEntity {
                doctor_id,
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                patient_email: patient.email.clone(),
                slot_time: None,
                consultation_id: None,
                gateway_intent_id: None,
                added_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%doctor_id, db_error = ?err, "doctors: failed to record interest");
                ConsultationError::Internal(err)
            })?;

        info!(%doctor_id, patient_id = %patient.id, inserted, "doctors: interest recorded");

        Ok(SelectDoctorResponse {
            message: "Doctor selected successfully".to_string(),
            doctor_id,
        })
    }

    /// The caller's own doctor record with its interested patients.
    pub async fn profile(
        &self,
        doctor_uid: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<DoctorProfileResponse> {
        let doctor = self.own_doctor(doctor_uid).await?;
        let interested_patients = self.interested(&doctor, now).await?;

        info!(
            doctor_id = %doctor.id,
            interested_count = interested_patients.len(),
            "doctors: profile loaded"
        );

        Ok(DoctorProfileResponse {
            message: "Doctor profile retrieved successfully".to_string(),
            doctor: DoctorProfileDto::from(doctor),
            interested_patients,
        })
    }

    /// Entries of the doctor profile owned by `doctor_uid`.
    pub async fn interested_patients(
        &self,
        doctor_uid: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<InterestedPatientsResponse> {
        let doctor = self.own_doctor(doctor_uid).await?;

        Ok(InterestedPatientsResponse {
            doctor_id: doctor.id,
            interested_patients: self.interested(&doctor, now).await?,
        })
    }

    async fn own_doctor(&self, doctor_uid: &str) -> UseCaseResult<DoctorEntity> {
        self.doctor_repo
            .find_by_uid(doctor_uid)
            .await
            .map_err(|err| {
                error!(doctor_uid, db_error = ?err, "doctors: failed to load doctor profile");
                ConsultationError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(doctor_uid, "doctors: caller has no doctor profile");
                ConsultationError::DoctorNotFound
            })
    }

    async fn interested(
        &self,
        doctor: &DoctorEntity,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Vec<InterestedPatientDto>> {
        let entries = self
            .entry_repo
            .list_for_doctor(doctor.id)
            .await
            .map_err(|err| {
                error!(doctor_id = %doctor.id, db_error = ?err, "doctors: failed to list patients");
                ConsultationError::Internal(err)
            })?;

        Ok(entries
            .iter()
            .map(|entry| InterestedPatientDto::from_entry(entry, now))
            .collect())
    }
}
