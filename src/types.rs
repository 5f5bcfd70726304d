/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource modules guarded by profile permissions.
/// Also selects the resource-specific error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    User,
    Profile,
    Product,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::User => "user",
            Module::Profile => "profile",
            Module::Product => "product",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
