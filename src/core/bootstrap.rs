use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Seed or repair the default admin account from FIRST_ADMIN_* settings.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin creation");
        return Ok(());
    }

    let username = &admin.first_admin_username;
    let user = repositories::users::find_by_username(state.db(), username).await?;
    let now = primitive_now_utc();

    if let Some(user) = user {
        let verified = security::verify_password(&admin.first_admin_password, &user.hashed_password)
            .unwrap_or(false);

        if verified && user.role == UserRole::Admin {
            tracing::info!("Default admin already up to date");
            return Ok(());
        }

        let hashed_password = if verified {
            None
        } else {
            Some(security::hash_password(&admin.first_admin_password)?)
        };

        repositories::users::update(
            state.db(),
            &user.id,
            repositories::users::UpdateUser {
                username: None,
                email: None,
                role: Some(UserRole::Admin),
                hashed_password,
                updated_at: now,
            },
        )
        .await?;

        tracing::info!("Updated default admin {username}");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_admin_password)?;

    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            email: &admin.first_admin_email,
            hashed_password,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!("Created default admin {username}");
    Ok(())
}
