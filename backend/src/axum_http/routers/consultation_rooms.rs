use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use crates::{
    domain::repositories::{doctors::DoctorRepository, interest_entries::InterestEntryRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{doctors::DoctorPostgres, interest_entries::InterestEntryPostgres},
    },
    realtime::rooms::{ClientFrame, ConsultationRooms, RoomMembership, RoomParticipant},
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::{
    auth::AuthUser,
    usecases::{consultation_rooms::ConsultationRoomUseCase, errors::ConsultationError},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, rooms: Arc<ConsultationRooms>) -> Router {
    let rooms_usecase = ConsultationRoomUseCase::new(
        Arc::new(DoctorPostgres::new(Arc::clone(&db_pool))),
        Arc::new(InterestEntryPostgres::new(Arc::clone(&db_pool))),
        rooms,
    );

    Router::new()
        .route("/:consultation_id/room", get(join_room::<DoctorPostgres, InterestEntryPostgres>))
        .with_state(Arc::new(rooms_usecase))
}

pub async fn join_room<D, I>(
    State(rooms_usecase): State<Arc<ConsultationRoomUseCase<D, I>>>,
    auth: AuthUser,
    Path(consultation_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
{
    let participant = RoomParticipant {
        id: auth.uid,
        name: auth.name,
    };
    let (membership, role) = rooms_usecase
        .join(&consultation_id, participant, Utc::now())
        .await?;

    info!(
        consultation_id = %membership.consultation_id(),
        connection_id = membership.connection_id(),
        role = ?role,
        "rooms: websocket upgrade accepted"
    );

    Ok(ws.on_upgrade(move |socket| relay(socket, membership)))
}

async fn relay(socket: WebSocket, mut membership: RoomMembership) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(frame) => {
                        membership.publish(frame);
                    }
                    Err(err) => {
                        debug!(
                            connection_id = membership.connection_id(),
                            error = %err,
                            "rooms: ignoring malformed frame"
                        );
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(connection_id = membership.connection_id(), error = %err, "rooms: socket error");
                    break;
                }
            },
            outbound = membership.recv() => {
                let Some(message) = outbound else { break };
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(error = %err, "rooms: failed to encode message");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    debug!(
        consultation_id = %membership.consultation_id(),
        connection_id = membership.connection_id(),
        "rooms: websocket closed"
    );
}
