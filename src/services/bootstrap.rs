//! Records every installation starts with.

use crate::auth::PasswordHasher;
use crate::config::AdminConfig;
use crate::database::models::{Permissions, Profile, User};
use crate::repository::{RepositoryError, Repositories};

use super::ServiceError;

const TRACING_TARGET_BOOTSTRAP: &str = "msaada_backend::services::bootstrap";

/// Ensures the `ROOT` profile and the configured administrator exist.
///
/// Existing records are left untouched, so a password the administrator
/// chose later survives a restart.
pub async fn create_defaults(
    repos: &Repositories,
    admin: &AdminConfig,
    hasher: &PasswordHasher,
) -> Result<User, ServiceError> {
    let profile = match repos.profiles.get_profile_by_name(Profile::ROOT).await {
        Ok(profile) => profile,
        Err(RepositoryError::NotFound) => {
            let root = Profile {
                name: Profile::ROOT.to_string(),
                permissions: Permissions::all(),
                ..Profile::default()
            };
            tracing::info!(target: TRACING_TARGET_BOOTSTRAP, "creating ROOT profile");
            repos.profiles.create_profile(&root).await?
        }
        Err(e) => return Err(e.into()),
    };

    match repos.users.get_user_by_mail(&admin.mail).await {
        Ok(user) => Ok(user),
        Err(RepositoryError::NotFound) => {
            let user = User {
                name: admin.name.clone(),
                mail: admin.mail.clone(),
                status: true,
                profile_id: profile.id,
                ..User::default()
            };
            tracing::info!(
                target: TRACING_TARGET_BOOTSTRAP,
                mail = %admin.mail,
                "creating administrator"
            );
            let user = repos.users.create_user(&user).await?;

            let hash = hasher.hash_password(&admin.password)?;
            let token = uuid::Uuid::new_v4().to_string();
            repos.users.set_user_password(&user, &token, &hash).await?;

            Ok(repos.users.get_user_by_id(user.id).await?)
        }
        Err(e) => Err(e.into()),
    }
}
