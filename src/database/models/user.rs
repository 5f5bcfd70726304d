use chrono::{DateTime, Utc};
use validator::{Validate, ValidationErrors};

use super::Profile;
use crate::dto::UserInput;

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct User {
    pub id: i64,
    #[validate(length(min = 5, max = 90))]
    pub name: String,
    #[validate(email, length(max = 50))]
    pub mail: String,
    pub status: bool,
    /// Set until the user chooses a password.
    pub new: bool,
    #[validate(range(min = 1))]
    pub profile_id: i64,
    pub token: Option<String>,
    pub password: Option<String>,
    pub profile: Option<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const SORTABLE: &'static [&'static str] =
        &["id", "name", "mail", "status", "new", "profile_id", "created_at", "updated_at"];

    pub fn bind(&mut self, input: &UserInput) -> Result<(), ValidationErrors> {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(mail) = &input.mail {
            self.mail = mail.clone();
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(profile_id) = input.profile_id {
            self.profile_id = profile_id;
        }
        self.validate()
    }

    /// Whether the user may open a session.
    pub fn can_login(&self) -> bool {
        self.status && !self.new
    }
}
