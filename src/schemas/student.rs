use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Student, StudentMark};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MarkEntry {
    #[serde(alias = "subjectId")]
    pub(crate) subject_id: String,
    pub(crate) marks: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentCreate {
    pub(crate) name: String,
    #[serde(alias = "rollNumber")]
    pub(crate) roll_number: String,
    #[serde(alias = "classId")]
    pub(crate) class_id: String,
    #[serde(default)]
    #[serde(alias = "previousMarks")]
    pub(crate) previous_marks: Vec<MarkEntry>,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentUpdate {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[serde(alias = "rollNumber")]
    pub(crate) roll_number: Option<String>,
    #[serde(default)]
    #[serde(alias = "classId")]
    pub(crate) class_id: Option<String>,
    /// When present, replaces the full marks set (classifications are only
    /// refreshed by the rebuild endpoint).
    #[serde(default)]
    #[serde(alias = "previousMarks")]
    pub(crate) previous_marks: Option<Vec<MarkEntry>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkResponse {
    pub(crate) subject_id: String,
    pub(crate) marks: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) roll_number: String,
    pub(crate) class_id: String,
    pub(crate) previous_marks: Vec<MarkResponse>,
    pub(crate) created_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: Student, marks: Vec<StudentMark>) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            name: student.name,
            roll_number: student.roll_number,
            class_id: student.class_id,
            previous_marks: marks
                .into_iter()
                .map(|mark| MarkResponse { subject_id: mark.subject_id, marks: mark.marks })
                .collect(),
            created_at: format_primitive(student.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) roll_number: String,
}

impl StudentSummary {
    pub(crate) fn from_db(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
        }
    }
}

/// Band-keyed grouping returned by the teacher's student listing.
#[derive(Debug, Default, Serialize)]
pub(crate) struct GroupedStudents {
    #[serde(rename = "Weak")]
    pub(crate) weak: Vec<StudentSummary>,
    #[serde(rename = "Good")]
    pub(crate) good: Vec<StudentSummary>,
    #[serde(rename = "Brilliant")]
    pub(crate) brilliant: Vec<StudentSummary>,
}
