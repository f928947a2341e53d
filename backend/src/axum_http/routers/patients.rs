use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{patient_profiles::PatientProfileRepository, users::UserRepository},
        value_objects::patients::PatientProfileRequest,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{patient_profiles::PatientProfilePostgres, users::UserPostgres},
    },
};

use super::json_body;
use crate::{
    auth::AuthUser,
    usecases::{errors::ConsultationError, patients::PatientProfileUseCase},
};

type Profiles = PatientProfilePostgres;
type Users = UserPostgres;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let patients_usecase = PatientProfileUseCase::new(
        Arc::new(PatientProfilePostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/submit", post(submit::<Profiles, Users>))
        .route("/get", get(get_profile::<Profiles, Users>))
        .route("/update", put(update::<Profiles, Users>))
        .with_state(Arc::new(patients_usecase))
}

pub async fn submit<P, U>(
    State(patients_usecase): State<Arc<PatientProfileUseCase<P, U>>>,
    auth: AuthUser,
    payload: Result<Json<PatientProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    P: PatientProfileRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let request = json_body(payload)?;
    let response = patients_usecase
        .submit(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn get_profile<P, U>(
    State(patients_usecase): State<Arc<PatientProfileUseCase<P, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ConsultationError>
where
    P: PatientProfileRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(patients_usecase.get(&auth.to_patient()).await?))
}

pub async fn update<P, U>(
    State(patients_usecase): State<Arc<PatientProfileUseCase<P, U>>>,
    auth: AuthUser,
    payload: Result<Json<PatientProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConsultationError>
where
    P: PatientProfileRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let request = json_body(payload)?;
    let response = patients_usecase
        .update(&auth.to_patient(), request, Utc::now())
        .await?;
    Ok(Json(response))
}
