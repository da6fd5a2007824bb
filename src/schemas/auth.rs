use serde::{Deserialize, Serialize};

use crate::db::types::UserRole;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterResponse {
    pub(crate) message: String,
    pub(crate) user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) token: String,
    pub(crate) role: UserRole,
}
