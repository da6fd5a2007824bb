use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Teacher,
    Student,
}

/// Performance band derived from a numeric mark. Serialized capitalized
/// ("Weak"/"Good"/"Brilliant") to match the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "category", rename_all = "lowercase")]
pub(crate) enum Category {
    Weak,
    Good,
    Brilliant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "completionstatus", rename_all = "lowercase")]
pub(crate) enum CompletionStatus {
    Pending,
    Completed,
}
