use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{SchoolClass, Subject, TeacherAssignment};

#[derive(Debug, Deserialize)]
pub(crate) struct NamedCreate {
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl ClassResponse {
    pub(crate) fn from_db(class: SchoolClass) -> Self {
        Self { id: class.id, name: class.name, created_at: format_primitive(class.created_at) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl SubjectResponse {
    pub(crate) fn from_db(subject: Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            created_at: format_primitive(subject.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentCreate {
    #[serde(alias = "teacherUserId")]
    pub(crate) teacher_user_id: String,
    #[serde(alias = "classId")]
    pub(crate) class_id: String,
    #[serde(alias = "subjectId")]
    pub(crate) subject_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) teacher_user_id: String,
    pub(crate) class_id: String,
    pub(crate) subject_id: String,
    pub(crate) created_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: TeacherAssignment) -> Self {
        Self {
            id: assignment.id,
            teacher_user_id: assignment.teacher_user_id,
            class_id: assignment.class_id,
            subject_id: assignment.subject_id,
            created_at: format_primitive(assignment.created_at),
        }
    }
}
