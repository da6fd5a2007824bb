use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Task;
use crate::db::types::{Category, CompletionStatus};
use crate::repositories::task_statuses::{StudentTaskRow, TeacherStatusRow};

#[derive(Debug, Deserialize)]
pub(crate) struct TaskCreate {
    pub(crate) description: String,
    #[serde(alias = "classId")]
    pub(crate) class_id: String,
    #[serde(alias = "subjectId")]
    pub(crate) subject_id: String,
    #[serde(alias = "targetCategory")]
    pub(crate) target_category: Category,
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskResponse {
    pub(crate) id: String,
    pub(crate) description: String,
    pub(crate) teacher_user_id: String,
    pub(crate) class_id: String,
    pub(crate) subject_id: String,
    pub(crate) target_category: Category,
    /// Snapshot of student ids captured at creation; never updated by later
    /// classification rebuilds.
    pub(crate) assigned_to: Vec<String>,
    pub(crate) status: &'static str,
    pub(crate) created_at: String,
}

impl TaskResponse {
    pub(crate) fn from_db(task: Task, assigned_to: Vec<String>) -> Self {
        Self {
            id: task.id,
            description: task.description,
            teacher_user_id: task.teacher_user_id,
            class_id: task.class_id,
            subject_id: task.subject_id,
            target_category: task.target_category,
            assigned_to,
            status: "assigned",
            created_at: format_primitive(task.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherStatusResponse {
    pub(crate) status_id: String,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) teacher_confirmed: bool,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) roll_number: String,
    pub(crate) task_id: String,
    pub(crate) task_description: String,
    pub(crate) class_name: String,
    pub(crate) subject_name: String,
}

impl TeacherStatusResponse {
    pub(crate) fn from_row(row: TeacherStatusRow) -> Self {
        Self {
            status_id: row.id,
            completion_status: row.completion_status,
            teacher_confirmed: row.teacher_confirmed,
            student_id: row.student_id,
            student_name: row.student_name,
            roll_number: row.roll_number,
            task_id: row.task_id,
            task_description: row.task_description,
            class_name: row.class_name,
            subject_name: row.subject_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentTaskResponse {
    pub(crate) status_id: String,
    pub(crate) task_id: String,
    pub(crate) description: String,
    pub(crate) target_category: Category,
    pub(crate) class_name: String,
    pub(crate) subject_name: String,
    pub(crate) teacher_name: String,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) teacher_confirmed: bool,
    pub(crate) assigned_at: String,
}

impl StudentTaskResponse {
    pub(crate) fn from_row(row: StudentTaskRow) -> Self {
        Self {
            status_id: row.status_id,
            task_id: row.task_id,
            description: row.description,
            target_category: row.target_category,
            class_name: row.class_name,
            subject_name: row.subject_name,
            teacher_name: row.teacher_name,
            completion_status: row.completion_status,
            teacher_confirmed: row.teacher_confirmed,
            assigned_at: format_primitive(row.assigned_at),
        }
    }
}
