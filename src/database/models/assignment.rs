use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::AssignmentStatus;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub class_id: String,
    pub teacher_id: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub max_marks: i32,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Assignment, "assignments", "Assignment");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub class_id: String,
    pub teacher_id: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub max_marks: i32,
    #[serde(default)]
    pub status: AssignmentStatus,
}

const ASSIGNMENT_FIELDS: &[Field] = &[
    Field::required("title", Kind::Text),
    Field::nullable("description", Kind::Text),
    Field::required("classId", Kind::Text),
    Field::required("teacherId", Kind::Text),
    Field::required("subject", Kind::Text),
    Field::required("dueDate", Kind::Date),
    Field::required("maxMarks", Kind::Integer { min: 1, max: 1000 }),
    Field::defaulted("status", Kind::OneOf(AssignmentStatus::VALUES)),
];

impl Schema for NewAssignment {
    const FIELDS: &'static [Field] = ASSIGNMENT_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewAssignment {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            title: self.title,
            description: self.description,
            class_id: self.class_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            due_date: self.due_date,
            max_marks: self.max_marks,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub class_id: Option<String>,
    pub teacher_id: Option<String>,
    pub subject: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub max_marks: Option<i32>,
    pub status: Option<AssignmentStatus>,
}

impl Schema for AssignmentPatch {
    const FIELDS: &'static [Field] = ASSIGNMENT_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl AssignmentPatch {
    pub fn apply(self, row: &mut Assignment, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            row.title = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.class_id {
            row.class_id = v;
        }
        if let Some(v) = self.teacher_id {
            row.teacher_id = v;
        }
        if let Some(v) = self.subject {
            row.subject = v;
        }
        if let Some(v) = self.due_date {
            row.due_date = v;
        }
        if let Some(v) = self.max_marks {
            row.max_marks = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        row.updated_at = now;
    }
}
