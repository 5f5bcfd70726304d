use chrono::{DateTime, Utc};
use validator::{Validate, ValidationErrors};

use crate::dto::ProductInput;

#[derive(Debug, Clone, Default, PartialEq, Validate, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub const SORTABLE: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];

    /// Applies the fields present in `input`, then validates the result.
    pub fn bind(&mut self, input: &ProductInput) -> Result<(), ValidationErrors> {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_keeps_absent_fields() {
        let mut product = Product {
            id: 3,
            name: "Rice".to_string(),
            ..Product::default()
        };
        assert!(product.bind(&ProductInput { name: None }).is_ok());
        assert_eq!(product.name, "Rice");
    }

    #[test]
    fn name_needs_two_characters() {
        let mut product = Product::default();
        let err = product.bind(&ProductInput { name: Some("X".to_string()) }).unwrap_err();
        assert!(err.field_errors().contains_key("name"));
    }
}
