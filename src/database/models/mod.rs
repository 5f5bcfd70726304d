pub mod product;
pub mod profile;
pub mod user;

pub use product::Product;
pub use profile::{Permissions, Profile};
pub use user::User;

use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::FieldErrors;

/// Flattens validator output into one readable message per field, e.g.
/// `name does not meet the 'length[5]' requirement with value 'Bob'`.
pub fn describe_validation_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut described = FieldErrors::new();

    for (field, kind) in errors.errors() {
        let ValidationErrorsKind::Field(field_errors) = kind else {
            continue;
        };
        let Some(error) = field_errors.first() else {
            continue;
        };

        let param = ["min", "max"]
            .iter()
            .filter_map(|key| error.params.get(*key))
            .map(render_value)
            .collect::<Vec<_>>()
            .join(",");
        let value = error.params.get("value").map(render_value).unwrap_or_default();

        described.insert(
            field.to_string(),
            format!(
                "{} does not meet the '{}[{}]' requirement with value '{}'",
                field, error.code, param, value
            ),
        );
    }

    described
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
