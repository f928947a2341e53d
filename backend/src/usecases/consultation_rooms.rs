use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::{
    domain::repositories::{doctors::DoctorRepository, interest_entries::InterestEntryRepository},
    realtime::rooms::{ConsultationRooms, RoomMembership, RoomParticipant},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::errors::{ConsultationError, UseCaseResult};
use super::payments::parse_uuid_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRole {
    Patient,
    Doctor,
}

pub struct ConsultationRoomUseCase<D, I>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
{
    doctor_repo: Arc<D>,
    entry_repo: Arc<I>,
    rooms: Arc<ConsultationRooms>,
}

impl<D, I> ConsultationRoomUseCase<D, I>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
{
    pub fn new(doctor_repo: Arc<D>, entry_repo: Arc<I>, rooms: Arc<ConsultationRooms>) -> Self {
        Self {
            doctor_repo,
            entry_repo,
            rooms,
        }
    }

    /// Checks that `uid` belongs to the consultation and that its window is
    /// open. Strangers get `ConsultationNotFound`, not a hint that it exists.
    pub async fn authorize(
        &self,
        consultation_id: &str,
        uid: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<(Uuid, RoomRole)> {
        let consultation_id = parse_uuid_field(Some(consultation_id), "consultationId")?;

        let entry = self
            .entry_repo
            .find_by_consultation_id(consultation_id)
            .await
            .map_err(|err| {
                error!(%consultation_id, db_error = ?err, "rooms: failed to load consultation");
                ConsultationError::Internal(err)
            })?
            .ok_or(ConsultationError::ConsultationNotFound)?;

        let role = if entry.patient_id == uid {
            RoomRole::Patient
        } else {
            let doctor = self.doctor_repo.find_by_uid(uid).await.map_err(|err| {
                error!(%consultation_id, db_error = ?err, "rooms: failed to load doctor profile");
                ConsultationError::Internal(err)
            })?;
            match doctor {
                Some(doctor) if doctor.id == entry.doctor_id => RoomRole::Doctor,
                _ => {
                    warn!(%consultation_id, uid, "rooms: join by non-participant");
                    return Err(ConsultationError::ConsultationNotFound);
                }
            }
        };

        if !entry.access_window(now).active {
            info!(%consultation_id, paid = entry.paid, "rooms: join rejected; consultation inactive");
            return Err(ConsultationError::ConsultationInactive);
        }

        Ok((consultation_id, role))
    }

    pub async fn join(
        &self,
        consultation_id: &str,
        participant: RoomParticipant,
        now: DateTime<Utc>,
    ) -> UseCaseResult<(RoomMembership, RoomRole)> {
        let (consultation_id, role) = self.authorize(consultation_id, &participant.id, now).await?;
        Ok((self.rooms.join(consultation_id, participant), role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{InMemoryDoctors, InMemoryEntries, doctor, patient};
    use chrono::Duration;
    use crates::{
        domain::{
            entities::interest_entries::{PaymentTarget, UpsertInterestEntryEntity},
            value_objects::enums::payment_methods::PaymentMethod,
        },
        realtime::rooms::{ClientFrame, RoomMessageKind},
    };

    struct Fixture {
        usecase: ConsultationRoomUseCase<InMemoryDoctors, InMemoryEntries>,
        rooms: Arc<ConsultationRooms>,
        consultation_id: Uuid,
        paid_at: DateTime<Utc>,
    }

    async fn fixture(paid: bool) -> Fixture {
        let owner = doctor("doctor-uid-1");
        let entries = Arc::new(InMemoryEntries::default());
        let consultation_id = Uuid::new_v4();
        let paid_at = Utc::now();
        let patient = patient("patient-1");

        entries
            .upsert_attempt(UpsertInterestEntryEntity {
                doctor_id: owner.id,
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                patient_email: patient.email.clone(),
                slot_time: Some("10:00 AM".to_string()),
                consultation_id: Some(consultation_id),
                gateway_intent_id: None,
                added_at: paid_at,
                updated_at: paid_at,
            })
            .await
            .unwrap();
        if paid {
            entries
                .mark_paid(
                    &PaymentTarget {
                        doctor_id: owner.id,
                        patient_id: patient.id.clone(),
                        consultation_id,
                    },
                    PaymentMethod::Gateway,
                    paid_at,
                )
                .await
                .unwrap();
        }

        let rooms = ConsultationRooms::new();
        Fixture {
            usecase: ConsultationRoomUseCase::new(
                Arc::new(InMemoryDoctors::with(vec![owner, doctor("doctor-uid-2")])),
                entries,
                Arc::clone(&rooms),
            ),
            rooms,
            consultation_id,
            paid_at,
        }
    }

    fn participant(id: &str) -> RoomParticipant {
        RoomParticipant {
            id: id.to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn patient_and_doctor_share_a_room_while_active() {
        let f = fixture(true).await;
        let id = f.consultation_id.to_string();

        let (mut patient_seat, patient_role) = f
            .usecase
            .join(&id, participant("patient-1"), f.paid_at)
            .await
            .unwrap();
        let (mut doctor_seat, doctor_role) = f
            .usecase
            .join(&id, participant("doctor-uid-1"), f.paid_at)
            .await
            .unwrap();

        assert_eq!(patient_role, RoomRole::Patient);
        assert_eq!(doctor_role, RoomRole::Doctor);
        assert_eq!(f.rooms.member_count(f.consultation_id), 2);

        doctor_seat.publish(ClientFrame {
            kind: RoomMessageKind::Chat,
            body: serde_json::json!("How are you feeling?"),
        });
        let received = patient_seat.recv().await.unwrap();
        assert_eq!(received.sender_id, "doctor-uid-1");

        drop(patient_seat);
        drop(doctor_seat);
        assert_eq!(f.rooms.room_count(), 0);
    }

    #[tokio::test]
    async fn other_doctor_and_strangers_are_not_found() {
        let f = fixture(true).await;
        let id = f.consultation_id.to_string();

        for uid in ["doctor-uid-2", "patient-2"] {
            let err = f.usecase.authorize(&id, uid, f.paid_at).await.unwrap_err();
            assert!(matches!(err, ConsultationError::ConsultationNotFound), "{uid}");
        }

        let err = f
            .usecase
            .authorize(&Uuid::new_v4().to_string(), "patient-1", f.paid_at)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsultationError::ConsultationNotFound));
    }

    #[tokio::test]
    async fn unpaid_or_expired_consultation_is_inactive() {
        let unpaid = fixture(false).await;
        let err = unpaid
            .usecase
            .authorize(&unpaid.consultation_id.to_string(), "patient-1", unpaid.paid_at)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsultationError::ConsultationInactive));

        let expired = fixture(true).await;
        let err = expired
            .usecase
            .authorize(
                &expired.consultation_id.to_string(),
                "doctor-uid-1",
                expired.paid_at + Duration::hours(25),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConsultationError::ConsultationInactive));
        assert_eq!(expired.rooms.room_count(), 0);
    }
}
