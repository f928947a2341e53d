use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::patient_profiles::PatientProfileChanges,
    repositories::{patient_profiles::PatientProfileRepository, users::UserRepository},
    value_objects::{
        consultations::PatientIdentity,
        patients::{PatientProfileDto, PatientProfileRequest, SavePatientProfileResponse},
    },
};
use tracing::{debug, error, info};

use super::errors::{ConsultationError, UseCaseResult};

pub struct PatientProfileUseCase<P, U>
where
    P: PatientProfileRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> PatientProfileUseCase<P, U>
where
    P: PatientProfileRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(profile_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            profile_repo,
            user_repo,
        }
    }

    /// Saves the intake form and marks the caller's profile as completed.
    pub async fn submit(
        &self,
        caller: &PatientIdentity,
        request: PatientProfileRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SavePatientProfileResponse> {
        let changes = profile_changes(&caller.id, request, now)?;

        let profile = self.profile_repo.upsert(changes).await.map_err(|err| {
            error!(uid = %caller.id, db_error = ?err, "patients: failed to save profile");
            ConsultationError::Internal(err)
        })?;

        let marked = self
            .user_repo
            .mark_profile_completed(&caller.id)
            .await
            .map_err(|err| {
                error!(uid = %caller.id, db_error = ?err, "patients: failed to mark profile completed");
                ConsultationError::Internal(err)
            })?;
        if !marked {
            debug!(uid = %caller.id, "patients: profile saved for a user that never synced");
        }

        info!(uid = %caller.id, "patients: profile submitted");
        Ok(SavePatientProfileResponse {
            success: true,
            message: "Patient data saved and profile marked as completed".to_string(),
            patient: Some(PatientProfileDto::from(profile)),
        })
    }

    /// A caller without a stored profile gets an empty form.
    pub async fn get(&self, caller: &PatientIdentity) -> UseCaseResult<PatientProfileDto> {
        let profile = self
            .profile_repo
            .find_by_uid(&caller.id)
            .await
            .map_err(|err| {
                error!(uid = %caller.id, db_error = ?err, "patients: failed to load profile");
                ConsultationError::Internal(err)
            })?;

        Ok(profile
            .map(PatientProfileDto::from)
            .unwrap_or_else(|| PatientProfileDto::empty(&caller.id)))
    }

    /// Updates an existing profile. Nothing is created when the caller has
    /// none; the response then carries no patient.
    pub async fn update(
        &self,
        caller: &PatientIdentity,
        request: PatientProfileRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<SavePatientProfileResponse> {
        let changes = profile_changes(&caller.id, request, now)?;

        let profile = self.profile_repo.update(changes).await.map_err(|err| {
            error!(uid = %caller.id, db_error = ?err, "patients: failed to update profile");
            ConsultationError::Internal(err)
        })?;

        info!(uid = %caller.id, found = profile.is_some(), "patients: profile updated");
        Ok(SavePatientProfileResponse {
            success: true,
            message: "Patient data updated".to_string(),
            patient: profile.map(PatientProfileDto::from),
        })
    }
}

fn profile_changes(
    uid: &str,
    request: PatientProfileRequest,
    now: DateTime<Utc>,
) -> UseCaseResult<PatientProfileChanges> {
    let age = parse_age(request.age.as_ref())?;
    let medical_documents = request
        .medical_documents
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| ConsultationError::Validation(format!("medicalDocuments is invalid: {err}")))?;

    Ok(PatientProfileChanges {
        uid: uid.to_string(),
        full_name: request.full_name,
        age,
        gender: request.gender,
        blood_group: request.blood_group,
        email: request.email,
        phone: request.phone,
        address: request.address,
        city: request.city,
        state: request.state,
        pincode: request.pincode,
        emergency_name: request.emergency_name,
        emergency_contact: request.emergency_contact,
        selected_disease: request.selected_disease,
        other_disease: request.other_disease,
        symptoms: request.symptoms,
        allergies: request.allergies,
        current_medications: request.current_medications,
        specialty: request.specialty,
        medical_documents,
        updated_at: now,
    })
}

fn parse_age(value: Option<&serde_json::Value>) -> UseCaseResult<Option<i32>> {
    let invalid = || ConsultationError::Validation("age must be a whole number".into());

    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .and_then(|age| i32::try_from(age).ok())
            .filter(|age| *age >= 0)
            .map(Some)
            .ok_or_else(invalid),
        Some(serde_json::Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|age| *age >= 0)
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{InMemoryPatientProfiles, InMemoryUsers, patient};
    use crates::domain::{
        repositories::{
            patient_profiles::MockPatientProfileRepository, users::MockUserRepository,
        },
        value_objects::patients::MedicalDocumentDto,
    };
    use serde_json::json;

    type TestUseCase = PatientProfileUseCase<InMemoryPatientProfiles, InMemoryUsers>;

    fn usecase() -> (TestUseCase, Arc<InMemoryUsers>) {
        let users = Arc::new(InMemoryUsers::with_patients(&["patient-1"]));
        let usecase =
            PatientProfileUseCase::new(Arc::new(InMemoryPatientProfiles::default()), Arc::clone(&users));
        (usecase, users)
    }

    fn intake_form() -> PatientProfileRequest {
        PatientProfileRequest {
            full_name: Some("Meera Iyer".to_string()),
            age: Some(json!("34")),
            blood_group: Some("O+".to_string()),
            city: Some("Pune".to_string()),
            symptoms: Some("fever".to_string()),
            medical_documents: Some(vec![MedicalDocumentDto {
                id: Some(1),
                name: Some("report.pdf".to_string()),
                size: Some("120 KB".to_string()),
                kind: Some("application/pdf".to_string()),
            }]),
            ..PatientProfileRequest::default()
        }
    }

    #[tokio::test]
    async fn submit_saves_profile_and_completes_user() {
        let (usecase, users) = usecase();
        let caller = patient("patient-1");

        let response = usecase.submit(&caller, intake_form(), Utc::now()).await.unwrap();

        assert!(response.success);
        let saved = response.patient.unwrap();
        assert_eq!(saved.full_name, "Meera Iyer");
        assert_eq!(saved.age, Some(34));
        assert_eq!(saved.medical_documents.len(), 1);
        assert!(users.find("patient-1").unwrap().profile_completed);
    }

    #[tokio::test]
    async fn get_without_profile_returns_empty_form() {
        let (usecase, _) = usecase();

        let profile = usecase.get(&patient("patient-1")).await.unwrap();

        assert_eq!(profile, PatientProfileDto::empty("patient-1"));
        assert_eq!(profile.full_name, "");
        assert!(profile.medical_documents.is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_only_provided_fields() {
        let (usecase, _) = usecase();
        let caller = patient("patient-1");
        let now = Utc::now();
        usecase.submit(&caller, intake_form(), now).await.unwrap();

        let response = usecase
            .update(
                &caller,
                PatientProfileRequest {
                    city: Some("Mumbai".to_string()),
                    allergies: Some("penicillin".to_string()),
                    ..PatientProfileRequest::default()
                },
                now,
            )
            .await
            .unwrap();

        let updated = response.patient.unwrap();
        assert_eq!(updated.city, "Mumbai");
        assert_eq!(updated.allergies, "penicillin");
        assert_eq!(updated.full_name, "Meera Iyer");
        assert_eq!(updated.blood_group, "O+");

        let fetched = usecase.get(&caller).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn update_without_profile_creates_nothing() {
        let (usecase, _) = usecase();
        let caller = patient("patient-1");

        let response = usecase.update(&caller, intake_form(), Utc::now()).await.unwrap();

        assert!(response.success);
        assert!(response.patient.is_none());
        assert_eq!(
            usecase.get(&caller).await.unwrap(),
            PatientProfileDto::empty("patient-1")
        );
    }

    #[tokio::test]
    async fn invalid_age_is_rejected_before_writing() {
        let mut profiles = MockPatientProfileRepository::new();
        profiles.expect_upsert().never();
        let mut users = MockUserRepository::new();
        users.expect_mark_profile_completed().never();
        let usecase = PatientProfileUseCase::new(Arc::new(profiles), Arc::new(users));

        let mut form = intake_form();
        form.age = Some(json!("thirty"));
        let err = usecase
            .submit(&patient("patient-1"), form, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ConsultationError::Validation(_)));
    }

    #[test]
    fn age_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_age(Some(&json!(41))).unwrap(), Some(41));
        assert_eq!(parse_age(Some(&json!(" 41 "))).unwrap(), Some(41));
        assert_eq!(parse_age(Some(&json!(""))).unwrap(), None);
        assert_eq!(parse_age(None).unwrap(), None);
        assert!(parse_age(Some(&json!(-3))).is_err());
        assert!(parse_age(Some(&json!(true))).is_err());
    }
}
