use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::users::{InsertUserEntity, UserEntity},
    repositories::users::UserRepository,
    value_objects::{
        consultations::PatientIdentity,
        enums::user_roles::UserRole,
        users::{DEFAULT_DISPLAY_NAME, LoginRoleResponse, SyncUserRequest, UserDto},
    },
};
use tracing::{error, info, warn};

use super::errors::{ConsultationError, UseCaseResult};

const PASSWORD_PROVIDER: &str = "password";

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Stores the caller on first sign-in. The role is required then and
    /// fixed afterwards; later syncs only refresh `last_seen`.
    pub async fn sync(
        &self,
        caller: &PatientIdentity,
        request: SyncUserRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<UserDto> {
        let existing = self.find_user(&caller.id).await?;
        if existing.is_some() {
            let touched = self
                .user_repo
                .touch_last_seen(&caller.id, now)
                .await
                .map_err(|err| {
                    error!(uid = %caller.id, db_error = ?err, "users: failed to refresh last seen");
                    ConsultationError::Internal(err)
                })?
                .ok_or(ConsultationError::UserNotFound)?;
            info!(uid = %caller.id, role = %touched.role, "users: returning user synced");
            return Ok(UserDto::from(touched));
        }

        let role = request
            .role
            .as_deref()
            .and_then(UserRole::from_str)
            .ok_or_else(|| {
                warn!(uid = %caller.id, role = ?request.role, "users: first sync without a valid role");
                ConsultationError::Validation("Role required for new users".into())
            })?;

        let display_name = caller
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| request.extra_name())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let user = self
            .user_repo
            .insert_or_touch(InsertUserEntity {
                uid: caller.id.clone(),
                email: caller.email.clone(),
                display_name,
                role: role.to_string(),
                provider: Some(PASSWORD_PROVIDER.to_string()),
                metadata: request.extra,
                created_at: now,
                last_seen: now,
            })
            .await
            .map_err(|err| {
                error!(uid = %caller.id, db_error = ?err, "users: failed to store user");
                ConsultationError::Internal(err)
            })?;

        info!(uid = %caller.id, role = %user.role, "users: new user synced");
        Ok(UserDto::from(user))
    }

    /// Role lookup used to route the caller after sign-in.
    pub async fn login(&self, caller: &PatientIdentity) -> UseCaseResult<LoginRoleResponse> {
        let user = self
            .find_user(&caller.id)
            .await?
            .ok_or(ConsultationError::UserNotFound)?;

        Ok(LoginRoleResponse {
            role: user.role,
            profile_completed: user.profile_completed,
        })
    }

    async fn find_user(&self, uid: &str) -> UseCaseResult<Option<UserEntity>> {
        self.user_repo.find_by_uid(uid).await.map_err(|err| {
            error!(uid, db_error = ?err, "users: failed to load user");
            ConsultationError::Internal(err)
        })
    }
}

/// Rejects callers whose stored role is not `patient`, including callers that
/// never synced.
pub(crate) async fn require_patient<U>(user_repo: &U, uid: &str) -> UseCaseResult<()>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = user_repo.find_by_uid(uid).await.map_err(|err| {
        error!(uid, db_error = ?err, "users: failed to load caller role");
        ConsultationError::Internal(err)
    })?;

    match user {
        Some(user) if user.is_patient() => Ok(()),
        other => {
            warn!(
                uid,
                role = ?other.as_ref().map(|user| user.role.as_str()),
                "users: caller is not a patient"
            );
            Err(ConsultationError::PatientOnly)
        }
    }
}
