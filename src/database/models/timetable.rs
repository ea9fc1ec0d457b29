use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::validation::{double_option, parse_hhmm, Field, Kind, Mode, Schema, ValidationErrors};

/// A weekly lesson slot. Times are zero-padded `HH:MM` strings, so they
/// order correctly as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub class_id: String,
    pub teacher_id: String,
    pub subject: String,
    /// 1 = Monday ... 7 = Sunday
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    pub academic_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(TimetableEntry, "timetable", "Timetable entry");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimetableEntry {
    pub class_id: String,
    pub teacher_id: String,
    pub subject: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    pub academic_year: String,
}

const TIMETABLE_FIELDS: &[Field] = &[
    Field::required("classId", Kind::Text),
    Field::required("teacherId", Kind::Text),
    Field::required("subject", Kind::Text),
    Field::required("dayOfWeek", Kind::Integer { min: 1, max: 7 }),
    Field::required("startTime", Kind::Time),
    Field::required("endTime", Kind::Time),
    Field::nullable("room", Kind::Text),
    Field::required("academicYear", Kind::Text),
];

/// Record an error when a slot does not end after it starts
pub fn check_slot(start: &str, end: &str, errors: &mut ValidationErrors) {
    if let (Some(s), Some(e)) = (parse_hhmm(start), parse_hhmm(end)) {
        if s >= e {
            errors.add("endTime", "must be later than startTime");
        }
    }
}

impl Schema for NewTimetableEntry {
    const FIELDS: &'static [Field] = TIMETABLE_FIELDS;
    const MODE: Mode = Mode::Insert;

    fn check_rules(&self, errors: &mut ValidationErrors) {
        check_slot(&self.start_time, &self.end_time, errors);
    }
}

impl NewTimetableEntry {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> TimetableEntry {
        TimetableEntry {
            id,
            class_id: self.class_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
            academic_year: self.academic_year,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetablePatch {
    pub class_id: Option<String>,
    pub teacher_id: Option<String>,
    pub subject: Option<String>,
    pub day_of_week: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub room: Option<Option<String>>,
    pub academic_year: Option<String>,
}

impl Schema for TimetablePatch {
    const FIELDS: &'static [Field] = TIMETABLE_FIELDS;
    const MODE: Mode = Mode::Patch;

    fn check_rules(&self, errors: &mut ValidationErrors) {
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            check_slot(start, end, errors);
        }
    }
}

impl TimetablePatch {
    pub fn apply(self, row: &mut TimetableEntry, now: DateTime<Utc>) {
        if let Some(v) = self.class_id {
            row.class_id = v;
        }
        if let Some(v) = self.teacher_id {
            row.teacher_id = v;
        }
        if let Some(v) = self.subject {
            row.subject = v;
        }
        if let Some(v) = self.day_of_week {
            row.day_of_week = v;
        }
        if let Some(v) = self.start_time {
            row.start_time = v;
        }
        if let Some(v) = self.end_time {
            row.end_time = v;
        }
        if let Some(v) = self.room {
            row.room = v;
        }
        if let Some(v) = self.academic_year {
            row.academic_year = v;
        }
        row.updated_at = now;
    }
}
