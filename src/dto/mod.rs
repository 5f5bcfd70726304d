//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::database::models::{Permissions, Product, Profile, User};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthInput {
    pub login: String,
    pub password: String,
    pub expire: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    #[serde(alias = "email")]
    pub mail: Option<String>,
    pub status: Option<bool>,
    pub profile_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsInput {
    pub user_module: Option<bool>,
    pub profile_module: Option<bool>,
    pub product_module: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub permissions: Option<PermissionsInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordInput {
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl PasswordInput {
    /// Both fields are present and non-empty.
    pub fn is_complete(&self) -> bool {
        matches!(
            (&self.password, &self.password_confirm),
            (Some(p), Some(c)) if !p.is_empty() && !c.is_empty()
        )
    }

    pub fn matches(&self) -> bool {
        self.is_complete() && self.password == self.password_confirm
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductOutput {
    pub id: i64,
    pub name: String,
}

impl From<&Product> for ProductOutput {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionsOutput {
    pub user_module: bool,
    pub profile_module: bool,
    pub product_module: bool,
}

impl From<&Permissions> for PermissionsOutput {
    fn from(permissions: &Permissions) -> Self {
        Self {
            user_module: permissions.user_module,
            profile_module: permissions.profile_module,
            product_module: permissions.product_module,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileOutput {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsOutput>,
}

impl ProfileOutput {
    pub fn summary(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            permissions: None,
        }
    }
}

impl From<&Profile> for ProfileOutput {
    fn from(profile: &Profile) -> Self {
        Self {
            permissions: Some(PermissionsOutput::from(&profile.permissions)),
            ..Self::summary(profile)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOutput {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileOutput>,
}

impl UserOutput {
    /// Includes the profile's permissions only when `with_permissions` is set.
    pub fn from_user(user: &User, with_permissions: bool) -> Self {
        let profile = user.profile.as_ref().map(|profile| {
            if with_permissions {
                ProfileOutput::from(profile)
            } else {
                ProfileOutput::summary(profile)
            }
        });

        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.mail.clone(),
            status: user.status,
            profile,
        }
    }
}

impl From<&User> for UserOutput {
    fn from(user: &User) -> Self {
        Self::from_user(user, false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserOutput>,
    pub accesstoken: String,
    pub refreshtoken: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItemsOutput<T: Serialize> {
    pub items: Vec<T>,
    /// Rows matching the search before pagination.
    pub count: i64,
}
