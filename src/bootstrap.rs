use chrono::Utc;

use crate::config::AppConfig;
use crate::models::{NewUser, RoleName};
use crate::repository::{RepositoryState, StoreError};

/// Runs the startup seeding: schema creation, the role catalog, and the
/// admin account from configured credentials. Idempotent -- rerunning
/// against an already-seeded store changes nothing.
pub async fn bootstrap(repo: &RepositoryState, config: &AppConfig) -> Result<(), StoreError> {
    repo.init_schema().await?;

    for name in RoleName::ALL {
        let role = repo.ensure_role(name).await?;
        tracing::debug!(role = %role.name, id = role.id, "role available");
    }

    if repo.find_user_by_login(&config.admin_login).await?.is_none() {
        let admin_role = repo.ensure_role(RoleName::Admin).await?;
        let admin = repo
            .insert_user(
                NewUser {
                    login: config.admin_login.clone(),
                    fio: Some("Portal Administrator".to_string()),
                    phone: None,
                    email: config.admin_email.clone(),
                    password: config.admin_password.clone(),
                    in_ban: false,
                    created: Utc::now(),
                },
                vec![admin_role],
            )
            .await?;
        tracing::info!(login = %admin.login, "admin account created");
    } else {
        tracing::debug!(login = %config.admin_login, "admin account already exists");
    }

    Ok(())
}
