use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Make sure a usable admin profile exists so a fresh deployment can reach the
/// back-office at all.
pub(crate) async fn ensure_first_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin bootstrap");
        return Ok(());
    }

    let email = &admin.first_admin_email;
    let now = primitive_now_utc();

    if let Some(profile) = repositories::profiles::find_by_email(state.db(), email).await? {
        if profile.role == UserRole::Admin {
            tracing::info!("Bootstrap admin already present");
            return Ok(());
        }

        repositories::profiles::update(
            state.db(),
            &profile.id,
            repositories::profiles::UpdateProfile {
                display_name: None,
                role: Some(UserRole::Admin),
                updated_at: now,
            },
        )
        .await?;
        tracing::info!("Promoted bootstrap profile {email} to admin");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_admin_password)?;

    repositories::profiles::create(
        state.db(),
        repositories::profiles::CreateProfile {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password: &hashed_password,
            display_name: "Administrator",
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!("Created bootstrap admin {email}");
    Ok(())
}
