use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Teacher;

#[derive(Debug, Deserialize)]
pub(crate) struct TeacherCreate {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeacherUpdate {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl TeacherResponse {
    pub(crate) fn from_db(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            user_id: teacher.user_id,
            name: teacher.name,
            created_at: format_primitive(teacher.created_at),
        }
    }
}
