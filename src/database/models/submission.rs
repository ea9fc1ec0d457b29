use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::SubmissionStatus;
use crate::validation::{double_option, Field, Kind, Mode, Schema};

/// A student's work against one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub submission_text: Option<String>,
    pub marks_obtained: Option<i32>,
    pub feedback: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Submission, "assignment_submissions", "Submission");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub assignment_id: String,
    pub student_id: String,
    pub submission_text: Option<String>,
    pub marks_obtained: Option<i32>,
    pub feedback: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: SubmissionStatus,
}

const SUBMISSION_FIELDS: &[Field] = &[
    Field::required("assignmentId", Kind::Text),
    Field::required("studentId", Kind::Text),
    Field::nullable("submissionText", Kind::Text),
    Field::nullable("marksObtained", Kind::Integer { min: 0, max: 1000 }),
    Field::nullable("feedback", Kind::Text),
    Field::nullable("submittedAt", Kind::Timestamp),
    Field::nullable("gradedAt", Kind::Timestamp),
    Field::defaulted("status", Kind::OneOf(SubmissionStatus::VALUES)),
];

impl Schema for NewSubmission {
    const FIELDS: &'static [Field] = SUBMISSION_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewSubmission {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Submission {
        Submission {
            id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            submission_text: self.submission_text,
            marks_obtained: self.marks_obtained,
            feedback: self.feedback,
            submitted_at: self.submitted_at,
            graded_at: self.graded_at,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPatch {
    pub assignment_id: Option<String>,
    pub student_id: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub submission_text: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub marks_obtained: Option<Option<i32>>,
    #[serde(deserialize_with = "double_option")]
    pub feedback: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub submitted_at: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "double_option")]
    pub graded_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<SubmissionStatus>,
}

impl Schema for SubmissionPatch {
    const FIELDS: &'static [Field] = SUBMISSION_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl SubmissionPatch {
    pub fn apply(self, row: &mut Submission, now: DateTime<Utc>) {
        if let Some(v) = self.assignment_id {
            row.assignment_id = v;
        }
        if let Some(v) = self.student_id {
            row.student_id = v;
        }
        if let Some(v) = self.submission_text {
            row.submission_text = v;
        }
        if let Some(v) = self.marks_obtained {
            row.marks_obtained = v;
        }
        if let Some(v) = self.feedback {
            row.feedback = v;
        }
        if let Some(v) = self.submitted_at {
            row.submitted_at = v;
        }
        if let Some(v) = self.graded_at {
            row.graded_at = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        row.updated_at = now;
    }
}
