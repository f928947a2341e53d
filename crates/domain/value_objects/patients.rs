use serde::{Deserialize, Serialize};

use crate::domain::entities::patient_profiles::PatientProfileEntity;

/// Metadata of an uploaded document; file contents are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalDocumentDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Body of both submit and update. Absent fields leave stored values alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileRequest {
    pub full_name: Option<String>,
    /// The intake form sends a number or a numeric string.
    pub age: Option<serde_json::Value>,
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
    pub medical_documents: Option<Vec<MedicalDocumentDto>>,
}

/// Text fields render as empty strings so the form can bind them directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileDto {
    pub uid: String,
    pub full_name: String,
    pub age: Option<i32>,
    pub gender: String,
    pub blood_group: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub emergency_name: String,
    pub emergency_contact: String,
    pub selected_disease: String,
    pub other_disease: String,
    pub symptoms: String,
    pub allergies: String,
    pub current_medications: String,
    pub specialty: String,
    pub medical_documents: Vec<MedicalDocumentDto>,
}

impl PatientProfileDto {
    pub fn empty(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            ..Self::default()
        }
    }
}

impl From<PatientProfileEntity> for PatientProfileDto {
    fn from(profile: PatientProfileEntity) -> Self {
        let medical_documents =
            serde_json::from_value(profile.medical_documents).unwrap_or_default();

        Self {
            uid: profile.uid,
            full_name: profile.full_name.unwrap_or_default(),
            age: profile.age,
            gender: profile.gender.unwrap_or_default(),
            blood_group: profile.blood_group.unwrap_or_default(),
            email: profile.email.unwrap_or_default(),
            phone: profile.phone.unwrap_or_default(),
            address: profile.address.unwrap_or_default(),
            city: profile.city.unwrap_or_default(),
            state: profile.state.unwrap_or_default(),
            pincode: profile.pincode.unwrap_or_default(),
            emergency_name: profile.emergency_name.unwrap_or_default(),
            emergency_contact: profile.emergency_contact.unwrap_or_default(),
            selected_disease: profile.selected_disease.unwrap_or_default(),
            other_disease: profile.other_disease.unwrap_or_default(),
            symptoms: profile.symptoms.unwrap_or_default(),
            allergies: profile.allergies.unwrap_or_default(),
            current_medications: profile.current_medications.unwrap_or_default(),
            specialty: profile.specialty.unwrap_or_default(),
            medical_documents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavePatientProfileResponse {
    pub success: bool,
    pub message: String,
    pub patient: Option<PatientProfileDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn stored_profile_renders_missing_text_as_empty() {
        let now = Utc::now();
        let entity = PatientProfileEntity {
            id: Uuid::new_v4(),
            uid: "patient-1".to_string(),
            full_name: Some("Meera Iyer".to_string()),
            age: Some(34),
            gender: None,
            blood_group: Some("O+".to_string()),
            email: None,
            phone: None,
            address: None,
            city: Some("Pune".to_string()),
            state: None,
            pincode: None,
            emergency_name: None,
            emergency_contact: None,
            selected_disease: None,
            other_disease: None,
            symptoms: Some("fever".to_string()),
            allergies: None,
            current_medications: None,
            specialty: None,
            medical_documents: serde_json::json!([
                { "id": 1, "name": "report.pdf", "size": "120 KB", "type": "application/pdf" }
            ]),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(PatientProfileDto::from(entity)).unwrap();

        assert_eq!(json["fullName"], "Meera Iyer");
        assert_eq!(json["age"], 34);
        assert_eq!(json["gender"], "");
        assert_eq!(json["bloodGroup"], "O+");
        assert_eq!(json["medicalDocuments"][0]["type"], "application/pdf");
    }

    #[test]
    fn request_reads_camel_case_document_list() {
        let request: PatientProfileRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Meera Iyer",
            "age": "34",
            "currentMedications": "none",
            "medicalDocuments": [{ "id": 7, "name": "xray.png", "size": "2 MB", "type": "image/png" }]
        }))
        .unwrap();

        assert_eq!(request.current_medications.as_deref(), Some("none"));
        assert_eq!(request.age, Some(serde_json::json!("34")));
        let documents = request.medical_documents.unwrap();
        assert_eq!(documents[0].kind.as_deref(), Some("image/png"));
        assert!(request.city.is_none());
    }
}
