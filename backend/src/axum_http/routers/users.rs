use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::users::UserRepository, value_objects::users::SyncUserRequest,
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
};

use super::json_body;
use crate::{
    auth::AuthUser,
    usecases::{errors::ConsultationError, users::UserUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let users_usecase = UserUseCase::new(Arc::new(UserPostgres::new(Arc::clone(&db_pool))));

    Router::new()
        .route("/sync", post(sync::<UserPostgres>))
        .route("/login", post(login::<UserPostgres>))
        .with_state(Arc::new(users_usecase))
}

pub async fn sync<U>(
    State(users_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    payload: Result<Json<SyncUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let request = json_body(payload)?;
    let response = users_usecase
        .sync(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn login<U>(
    State(users_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ConsultationError>
where
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(users_usecase.login(&auth.to_patient()).await?))
}
