use chrono::{DateTime, Utc};
use validator::{Validate, ValidationErrors};

use crate::dto::ProfileInput;
use crate::types::Module;

/// Module grants attached to a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Permissions {
    pub user_module: bool,
    pub profile_module: bool,
    pub product_module: bool,
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            user_module: true,
            profile_module: true,
            product_module: true,
        }
    }

    pub fn allows(&self, module: Module) -> bool {
        match module {
            Module::User => self.user_module,
            Module::Profile => self.profile_module,
            Module::Product => self.product_module,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    #[validate(length(min = 4, max = 100))]
    pub name: String,
    #[sqlx(flatten)]
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub const SORTABLE: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];
    pub const ROOT: &'static str = "ROOT";

    pub fn bind(&mut self, input: &ProfileInput) -> Result<(), ValidationErrors> {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(permissions) = &input.permissions {
            if let Some(v) = permissions.user_module {
                self.permissions.user_module = v;
            }
            if let Some(v) = permissions.profile_module {
                self.permissions.profile_module = v;
            }
            if let Some(v) = permissions.product_module {
                self.permissions.product_module = v;
            }
        }
        self.validate()
    }
}
