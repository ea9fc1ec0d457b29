use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub user_id: String,
    pub employee_id: String,
    pub subject: String,
    pub years_experience: i32,
    pub phone: Option<String>,
    pub qualifications: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Teacher, "teachers", "Teacher");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub user_id: String,
    pub employee_id: String,
    pub subject: String,
    pub years_experience: i32,
    pub phone: Option<String>,
    pub qualifications: Option<String>,
}

const TEACHER_FIELDS: &[Field] = &[
    Field::required("userId", Kind::Text),
    Field::required("employeeId", Kind::Text),
    Field::required("subject", Kind::Text),
    Field::required("yearsExperience", Kind::Integer { min: 0, max: 80 }),
    Field::nullable("phone", Kind::Text),
    Field::nullable("qualifications", Kind::Text),
];

impl Schema for NewTeacher {
    const FIELDS: &'static [Field] = TEACHER_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewTeacher {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Teacher {
        Teacher {
            id,
            user_id: self.user_id,
            employee_id: self.employee_id,
            subject: self.subject,
            years_experience: self.years_experience,
            phone: self.phone,
            qualifications: self.qualifications,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherPatch {
    pub user_id: Option<String>,
    pub employee_id: Option<String>,
    pub subject: Option<String>,
    pub years_experience: Option<i32>,
    #[serde(deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub qualifications: Option<Option<String>>,
}

impl Schema for TeacherPatch {
    const FIELDS: &'static [Field] = TEACHER_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl TeacherPatch {
    pub fn apply(self, row: &mut Teacher, now: DateTime<Utc>) {
        if let Some(v) = self.user_id {
            row.user_id = v;
        }
        if let Some(v) = self.employee_id {
            row.employee_id = v;
        }
        if let Some(v) = self.subject {
            row.subject = v;
        }
        if let Some(v) = self.years_experience {
            row.years_experience = v;
        }
        if let Some(v) = self.phone {
            row.phone = v;
        }
        if let Some(v) = self.qualifications {
            row.qualifications = v;
        }
        row.updated_at = now;
    }
}
