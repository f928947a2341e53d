use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::users::UserEntity;

pub const DEFAULT_DISPLAY_NAME: &str = "New User";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncUserRequest {
    pub role: Option<String>,
    /// Free-form sign-up details kept as user metadata.
    pub extra: Option<serde_json::Value>,
}

impl SyncUserRequest {
    pub fn extra_name(&self) -> Option<String> {
        self.extra
            .as_ref()?
            .get("name")?
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: String,
    pub provider: Option<String>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl From<UserEntity> for UserDto {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            provider: user.provider,
            profile_completed: user.profile_completed,
            created_at: user.created_at,
            last_seen: user.last_seen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRoleResponse {
    pub role: String,
    pub profile_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_name_ignores_blank_values() {
        let request: SyncUserRequest = serde_json::from_value(serde_json::json!({
            "role": "patient",
            "extra": { "name": "  " }
        }))
        .unwrap();
        assert_eq!(request.extra_name(), None);

        let request: SyncUserRequest = serde_json::from_value(serde_json::json!({
            "extra": { "name": "Meera" }
        }))
        .unwrap();
        assert_eq!(request.extra_name().as_deref(), Some("Meera"));
        assert!(request.role.is_none());
    }
}
