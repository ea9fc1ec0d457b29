use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::Role;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User, "users", "User");

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.email.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

const USER_FIELDS: &[Field] = &[
    Field::nullable("email", Kind::Email),
    Field::nullable("firstName", Kind::Text),
    Field::nullable("lastName", Kind::Text),
    Field::nullable("profileImageUrl", Kind::Text),
    Field::defaulted("role", Kind::OneOf(Role::VALUES)),
];

impl Schema for NewUser {
    const FIELDS: &'static [Field] = USER_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewUser {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_image_url: self.profile_image_url,
            role: self.role,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub profile_image_url: Option<Option<String>>,
    pub role: Option<Role>,
}

impl Schema for UserPatch {
    const FIELDS: &'static [Field] = USER_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl UserPatch {
    pub fn apply(self, row: &mut User, now: DateTime<Utc>) {
        if let Some(v) = self.email {
            row.email = v;
        }
        if let Some(v) = self.first_name {
            row.first_name = v;
        }
        if let Some(v) = self.last_name {
            row.last_name = v;
        }
        if let Some(v) = self.profile_image_url {
            row.profile_image_url = v;
        }
        if let Some(v) = self.role {
            row.role = v;
        }
        row.updated_at = now;
    }
}
