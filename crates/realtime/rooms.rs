use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_ROOM_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomMessageKind {
    Chat,
    /// Opaque call-signalling payload (offer/answer/candidates).
    Signal,
}

/// Frame a participant sends into the room.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub kind: RoomMessageKind,
    pub body: serde_json::Value,
}

/// Frame delivered to the other participants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessage {
    pub kind: RoomMessageKind,
    pub body: serde_json::Value,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomParticipant {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
struct Envelope {
    connection_id: u64,
    message: RoomMessage,
}

struct Room {
    tx: broadcast::Sender<Envelope>,
    members: usize,
}

/// In-process chat/call rooms keyed by consultation id. Nothing is persisted;
/// a room lives only while it has members.
pub struct ConsultationRooms {
    rooms: Mutex<HashMap<Uuid, Room>>,
    next_connection_id: AtomicU64,
    capacity: usize,
}

impl Default for ConsultationRooms {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ROOM_CAPACITY)
    }
}

impl ConsultationRooms {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            next_connection_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Room>> {
        // The map stays consistent even if a holder panicked.
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn join(
        self: &Arc<Self>,
        consultation_id: Uuid,
        participant: RoomParticipant,
    ) -> RoomMembership {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);

        let (tx, rx) = {
            let mut rooms = self.lock();
            let room = rooms.entry(consultation_id).or_insert_with(|| Room {
                tx: broadcast::channel(self.capacity).0,
                members: 0,
            });
            room.members += 1;
            (room.tx.clone(), room.tx.subscribe())
        };

        info!(
            %consultation_id,
            connection_id,
            participant_id = %participant.id,
            "rooms: participant joined"
        );

        RoomMembership {
            hub: Arc::clone(self),
            consultation_id,
            connection_id,
            participant,
            tx,
            rx,
        }
    }

    fn leave(&self, consultation_id: Uuid, connection_id: u64) {
        let mut rooms = self.lock();
        let Some(room) = rooms.get_mut(&consultation_id) else {
            return;
        };

        room.members = room.members.saturating_sub(1);
        if room.members == 0 {
            rooms.remove(&consultation_id);
            debug!(%consultation_id, "rooms: last participant left; room closed");
        }

        debug!(%consultation_id, connection_id, "rooms: participant left");
    }

    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    pub fn member_count(&self, consultation_id: Uuid) -> usize {
        self.lock()
            .get(&consultation_id)
            .map(|room| room.members)
            .unwrap_or(0)
    }
}

/// One connection's seat in a room. Dropping it leaves the room.
pub struct RoomMembership {
    hub: Arc<ConsultationRooms>,
    consultation_id: Uuid,
    connection_id: u64,
    participant: RoomParticipant,
    tx: broadcast::Sender<Envelope>,
    rx: broadcast::Receiver<Envelope>,
}

impl RoomMembership {
    pub fn consultation_id(&self) -> Uuid {
        self.consultation_id
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    /// Broadcasts to every other member and returns the message as sent.
    pub fn publish(&self, frame: ClientFrame) -> RoomMessage {
        let message = RoomMessage {
            kind: frame.kind,
            body: frame.body,
            sender_id: self.participant.id.clone(),
            sender_name: self.participant.name.clone(),
            sent_at: Utc::now(),
        };

        // Our own receiver keeps the channel open, so send cannot fail here.
        let _ = self.tx.send(Envelope {
            connection_id: self.connection_id,
            message: message.clone(),
        });

        message
    }

    /// Next message from another member. Messages this receiver fell behind
    /// on are skipped.
    pub async fn recv(&mut self) -> Option<RoomMessage> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.connection_id == self.connection_id => continue,
                Ok(envelope) => return Some(envelope.message),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(
                        consultation_id = %self.consultation_id,
                        connection_id = self.connection_id,
                        skipped,
                        "rooms: receiver lagged; messages dropped"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for RoomMembership {
    fn drop(&mut self) {
        self.hub.leave(self.consultation_id, self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn participant(id: &str) -> RoomParticipant {
        RoomParticipant {
            id: id.to_string(),
            name: Some(format!("{id} name")),
        }
    }

    fn chat(text: &str) -> ClientFrame {
        ClientFrame {
            kind: RoomMessageKind::Chat,
            body: serde_json::Value::String(text.to_string()),
        }
    }

    #[tokio::test]
    async fn delivers_to_other_members_only() {
        let hub = ConsultationRooms::new();
        let consultation_id = Uuid::new_v4();
        let mut patient = hub.join(consultation_id, participant("patient-1"));
        let mut doctor = hub.join(consultation_id, participant("doctor-1"));

        patient.publish(chat("hello doctor"));

        let received = doctor.recv().await.unwrap();
        assert_eq!(received.sender_id, "patient-1");
        assert_eq!(received.body, serde_json::json!("hello doctor"));
        assert_eq!(received.kind, RoomMessageKind::Chat);

        let echoed = timeout(Duration::from_millis(50), patient.recv()).await;
        assert!(echoed.is_err(), "sender must not receive its own message");
    }

    #[tokio::test]
    async fn rooms_are_isolated_by_consultation() {
        let hub = ConsultationRooms::new();
        let sender = hub.join(Uuid::new_v4(), participant("a"));
        let mut other_room = hub.join(Uuid::new_v4(), participant("b"));

        sender.publish(chat("private"));

        let leaked = timeout(Duration::from_millis(50), other_room.recv()).await;
        assert!(leaked.is_err());
        assert_eq!(hub.room_count(), 2);
    }

    #[tokio::test]
    async fn room_is_removed_when_last_member_leaves() {
        let hub = ConsultationRooms::new();
        let consultation_id = Uuid::new_v4();
        let first = hub.join(consultation_id, participant("a"));
        let second = hub.join(consultation_id, participant("b"));
        assert_eq!(hub.member_count(consultation_id), 2);

        drop(first);
        assert_eq!(hub.member_count(consultation_id), 1);
        assert_eq!(hub.room_count(), 1);

        drop(second);
        assert_eq!(hub.member_count(consultation_id), 0);
        assert_eq!(hub.room_count(), 0);
    }

    #[tokio::test]
    async fn lagging_receiver_skips_dropped_messages() {
        let hub = Arc::new(ConsultationRooms::with_capacity(2));
        let consultation_id = Uuid::new_v4();
        let sender = hub.join(consultation_id, participant("a"));
        let mut slow = hub.join(consultation_id, participant("b"));

        for text in ["one", "two", "three", "four"] {
            sender.publish(chat(text));
        }

        let next = slow.recv().await.unwrap();
        assert_eq!(next.body, serde_json::json!("three"));
        let last = slow.recv().await.unwrap();
        assert_eq!(last.body, serde_json::json!("four"));
    }

    #[test]
    fn signal_frames_parse_and_serialize_camel_case() {
        let frame: ClientFrame = serde_json::from_value(serde_json::json!({
            "kind": "signal",
            "body": { "type": "offer", "sdp": "v=0" }
        }))
        .unwrap();
        assert_eq!(frame.kind, RoomMessageKind::Signal);

        let message = RoomMessage {
            kind: frame.kind,
            body: frame.body,
            sender_id: "p".to_string(),
            sender_name: None,
            sent_at: Utc::now(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["kind"], "signal");
        assert_eq!(json["senderId"], "p");
        assert!(json.get("sentAt").is_some());
    }
}
