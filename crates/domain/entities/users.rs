use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::user_roles::UserRole;
use crate::infra::db::postgres::schema::users;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: String,
    pub provider: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl UserEntity {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::from_str(&self.role)
    }

    pub fn is_patient(&self) -> bool {
        self.role() == Some(UserRole::Patient)
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: String,
    pub provider: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}
