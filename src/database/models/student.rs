use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::StudentStatus;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    /// School-issued identifier, e.g. "STU-2024-001"
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub class_id: Option<String>,
    pub parent_id: Option<String>,
    pub admission_date: NaiveDate,
    pub status: StudentStatus,
    pub roll_number: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Student, "students", "Student");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub class_id: Option<String>,
    pub parent_id: Option<String>,
    pub admission_date: NaiveDate,
    #[serde(default)]
    pub status: StudentStatus,
    pub roll_number: Option<i32>,
}

const STUDENT_FIELDS: &[Field] = &[
    Field::required("studentId", Kind::Text),
    Field::required("firstName", Kind::Text),
    Field::required("lastName", Kind::Text),
    Field::required("dateOfBirth", Kind::Date),
    Field::nullable("classId", Kind::Text),
    Field::nullable("parentId", Kind::Text),
    Field::required("admissionDate", Kind::Date),
    Field::defaulted("status", Kind::OneOf(StudentStatus::VALUES)),
    Field::nullable("rollNumber", Kind::Integer { min: 1, max: 10_000 }),
];

impl Schema for NewStudent {
    const FIELDS: &'static [Field] = STUDENT_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewStudent {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Student {
        Student {
            id,
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            class_id: self.class_id,
            parent_id: self.parent_id,
            admission_date: self.admission_date,
            status: self.status,
            roll_number: self.roll_number,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentPatch {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub class_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
    pub admission_date: Option<NaiveDate>,
    pub status: Option<StudentStatus>,
    #[serde(deserialize_with = "double_option")]
    pub roll_number: Option<Option<i32>>,
}

impl Schema for StudentPatch {
    const FIELDS: &'static [Field] = STUDENT_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl StudentPatch {
    pub fn apply(self, row: &mut Student, now: DateTime<Utc>) {
        if let Some(v) = self.student_id {
            row.student_id = v;
        }
        if let Some(v) = self.first_name {
            row.first_name = v;
        }
        if let Some(v) = self.last_name {
            row.last_name = v;
        }
        if let Some(v) = self.date_of_birth {
            row.date_of_birth = v;
        }
        if let Some(v) = self.class_id {
            row.class_id = v;
        }
        if let Some(v) = self.parent_id {
            row.parent_id = v;
        }
        if let Some(v) = self.admission_date {
            row.admission_date = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        if let Some(v) = self.roll_number {
            row.roll_number = v;
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
    fn status_defaults_to_active() {
        let student: NewStudent = parse(json!({
            "studentId": "STU-2024-001",
            "firstName": "Emma",
            "lastName": "Thompson",
            "dateOfBirth": "2010-03-14",
            "admissionDate": "2024-06-01"
        }))
        .unwrap();
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.admission_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn dates_have_no_time_part() {
        let err = parse::<NewStudent>(json!({
            "studentId": "STU-1",
            "firstName": "A",
            "lastName": "B",
            "dateOfBirth": "2010-03-14T00:00:00Z",
            "admissionDate": "2024-06-01"
        }))
        .unwrap_err();
        assert_eq!(err.get("dateOfBirth"), Some("must be a calendar date (YYYY-MM-DD)"));
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let now = Utc::now();
        let mut row = Student {
            id: "s1".into(),
            student_id: "STU-1".into(),
            first_name: "Emma".into(),
            last_name: "Thompson".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 3, 14).unwrap(),
            class_id: Some("c1".into()),
            parent_id: None,
            admission_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: StudentStatus::Active,
            roll_number: Some(4),
            created_at: now,
            updated_at: now,
        };
        let patch: StudentPatch = parse(json!({ "lastName": "Smith", "rollNumber": null })).unwrap();
        patch.apply(&mut row, now);
        assert_eq!(row.last_name, "Smith");
        assert_eq!(row.first_name, "Emma");
        assert_eq!(row.class_id.as_deref(), Some("c1"));
        assert_eq!(row.roll_number, None);
    }
}
