use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

/// A class section, e.g. "Grade 10-A" for one academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: String,
    pub name: String,
    pub grade: i32,
    pub section: String,
    pub teacher_id: Option<String>,
    pub academic_year: String,
    pub max_students: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(SchoolClass, "classes", "Class");

pub const DEFAULT_MAX_STUDENTS: i32 = 30;

fn default_max_students() -> i32 {
    DEFAULT_MAX_STUDENTS
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub grade: i32,
    pub section: String,
    pub teacher_id: Option<String>,
    pub academic_year: String,
    #[serde(default = "default_max_students")]
    pub max_students: i32,
}

const CLASS_FIELDS: &[Field] = &[
    Field::required("name", Kind::Text),
    Field::required("grade", Kind::Integer { min: 1, max: 12 }),
    Field::required("section", Kind::Text),
    Field::nullable("teacherId", Kind::Text),
    Field::required("academicYear", Kind::Text),
    Field::defaulted("maxStudents", Kind::Integer { min: 1, max: 500 }),
];

impl Schema for NewClass {
    const FIELDS: &'static [Field] = CLASS_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewClass {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> SchoolClass {
        SchoolClass {
            id,
            name: self.name,
            grade: self.grade,
            section: self.section,
            teacher_id: self.teacher_id,
            academic_year: self.academic_year,
            max_students: self.max_students,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub grade: Option<i32>,
    pub section: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub teacher_id: Option<Option<String>>,
    pub academic_year: Option<String>,
    pub max_students: Option<i32>,
}

impl Schema for ClassPatch {
    const FIELDS: &'static [Field] = CLASS_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl ClassPatch {
    pub fn apply(self, row: &mut SchoolClass, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.grade {
            row.grade = v;
        }
        if let Some(v) = self.section {
            row.section = v;
        }
        if let Some(v) = self.teacher_id {
            row.teacher_id = v;
        }
        if let Some(v) = self.academic_year {
            row.academic_year = v;
        }
        if let Some(v) = self.max_students {
            row.max_students = v;
        }
        row.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse;
    use serde_json::json;

    #[test]
    fn max_students_defaults_to_thirty() {
        let class: NewClass = parse(json!({
            "name": "Grade 10-A",
            "grade": 10,
            "section": "A",
            "academicYear": "2024-2025"
        }))
        .unwrap();
        assert_eq!(class.max_students, 30);
        assert_eq!(class.teacher_id, None);
    }

    #[test]
    fn grade_is_bounded() {
        let err = parse::<NewClass>(json!({
            "name": "X",
            "grade": 0,
            "section": "A",
            "academicYear": "2024-2025"
        }))
        .unwrap_err();
        assert_eq!(err.get("grade"), Some("must be between 1 and 12"));
    }
}
