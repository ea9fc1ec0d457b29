use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::AttendanceStatus;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

/// One attendance mark; a student has at most one per date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Attendance, "attendance", "Attendance record");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: Option<String>,
}

const ATTENDANCE_FIELDS: &[Field] = &[
    Field::required("studentId", Kind::Text),
    Field::required("classId", Kind::Text),
    Field::required("date", Kind::Date),
    Field::required("status", Kind::OneOf(AttendanceStatus::VALUES)),
    Field::nullable("markedBy", Kind::Text),
];

impl Schema for NewAttendance {
    const FIELDS: &'static [Field] = ATTENDANCE_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewAttendance {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Attendance {
        Attendance {
            id,
            student_id: self.student_id,
            class_id: self.class_id,
            date: self.date,
            status: self.status,
            marked_by: self.marked_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendancePatch {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    #[serde(deserialize_with = "double_option")]
    pub marked_by: Option<Option<String>>,
}

impl Schema for AttendancePatch {
    const FIELDS: &'static [Field] = ATTENDANCE_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl AttendancePatch {
    pub fn apply(self, row: &mut Attendance, now: DateTime<Utc>) {
        if let Some(v) = self.student_id {
            row.student_id = v;
        }
        if let Some(v) = self.class_id {
            row.class_id = v;
        }
        if let Some(v) = self.date {
            row.date = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        if let Some(v) = self.marked_by {
            row.marked_by = v;
        }
        row.updated_at = now;
    }
}
