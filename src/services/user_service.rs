use std::sync::Arc;

use uuid::Uuid;

use super::ServiceError;
use crate::auth::PasswordHasher;
use crate::database::models::User;
use crate::dto::{ListItemsOutput, PasswordInput, UserInput, UserOutput};
use crate::filter::UserFilter;
use crate::repository::UserRepository;

const TRACING_TARGET_USERS: &str = "msaada_backend::services::users";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<ListItemsOutput<UserOutput>, ServiceError> {
        let count = self.users.count_users(filter).await?;
        let items = self.users.get_users(filter).await?;

        Ok(ListItemsOutput {
            items: items.iter().map(UserOutput::from).collect(),
            count,
        })
    }

    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        Ok(self.users.get_user_by_id(id).await?)
    }

    pub async fn get_by_mail(&self, mail: &str) -> Result<User, ServiceError> {
        Ok(self.users.get_user_by_mail(mail).await?)
    }

    pub async fn create(&self, input: &UserInput) -> Result<UserOutput, ServiceError> {
        let mut user = User::default();
        user.bind(input)?;

        let created = self.users.create_user(&user).await?;
        tracing::info!(target: TRACING_TARGET_USERS, user_id = created.id, "user created");
        Ok(UserOutput::from(&created))
    }

    pub async fn update(&self, user: &User, input: &UserInput) -> Result<UserOutput, ServiceError> {
        let mut user = user.clone();
        user.bind(input)?;

        let updated = self.users.update_user(&user).await?;
        Ok(UserOutput::from(&updated))
    }

    pub async fn delete(&self, user: &User) -> Result<(), ServiceError> {
        self.users.delete_user(user).await?;
        tracing::info!(target: TRACING_TARGET_USERS, user_id = user.id, "user deleted");
        Ok(())
    }

    /// Clears the password of a user who already chose one.
    pub async fn reset_password(&self, user: &User) -> Result<(), ServiceError> {
        if user.new {
            return Ok(());
        }
        self.users.reset_user_password(user).await?;
        tracing::info!(target: TRACING_TARGET_USERS, user_id = user.id, "password reset");
        Ok(())
    }

    /// Stores the first password of a new user and opens a fresh session token.
    pub async fn set_password(&self, user: &User, input: &PasswordInput) -> Result<(), ServiceError> {
        if !input.matches() {
            return Err(ServiceError::PasswordMismatch);
        }
        if !user.new {
            return Err(ServiceError::UserHasPassword);
        }

        let password = input.password.as_deref().unwrap_or_default();
        let hash = self.hasher.hash_password(password)?;
        let token = Uuid::new_v4().to_string();

        self.users.set_user_password(user, &token, &hash).await?;
        tracing::info!(target: TRACING_TARGET_USERS, user_id = user.id, "password set");
        Ok(())
    }
}
