use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use crates::{
    domain::repositories::{
        doctors::DoctorRepository, interest_entries::InterestEntryRepository,
        users::UserRepository,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            doctors::DoctorPostgres, interest_entries::InterestEntryPostgres, users::UserPostgres,
        },
    },
};

use crate::{
    auth::AuthUser,
    usecases::{doctors::DoctorUseCase, errors::ConsultationError},
};

type Doctors = DoctorPostgres;
type Entries = InterestEntryPostgres;
type Users = UserPostgres;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let doctors_usecase = DoctorUseCase::new(
        Arc::new(DoctorPostgres::new(Arc::clone(&db_pool))),
        Arc::new(InterestEntryPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/public", get(list_public::<Doctors, Entries, Users>))
        .route("/profile", get(profile::<Doctors, Entries, Users>))
        .route("/select/:doctor_id", post(select_doctor::<Doctors, Entries, Users>))
        .route("/me/patients", get(interested_patients::<Doctors, Entries, Users>))
        .with_state(Arc::new(doctors_usecase))
}

pub async fn list_public<D, I, U>(
    State(doctors_usecase): State<Arc<DoctorUseCase<D, I, U>>>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(doctors_usecase.list_public().await?))
}

pub async fn profile<D, I, U>(
    State(doctors_usecase): State<Arc<DoctorUseCase<D, I, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let response = doctors_usecase.profile(&auth.uid, Utc::now()).await?;
    Ok(Json(response))
}

pub async fn select_doctor<D, I, U>(
    State(doctors_usecase): State<Arc<DoctorUseCase<D, I, U>>>,
    auth: AuthUser,
    Path(doctor_id): Path<String>,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let response = doctors_usecase
        .record_interest(&auth.to_patient(), &doctor_id, Utc::now())
        .await?;
    Ok(Json(response))
}

pub async fn interested_patients<D, I, U>(
    State(doctors_usecase): State<Arc<DoctorUseCase<D, I, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ConsultationError>
where
    D: DoctorRepository + Send + Sync + 'static,
    I: InterestEntryRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let response = doctors_usecase
        .interested_patients(&auth.uid, Utc::now())
        .await?;
    Ok(Json(response))
}
