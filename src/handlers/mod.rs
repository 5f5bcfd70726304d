// handlers/mod.rs - route handlers by access tier
//
// Public (no token) and protected (access token plus module permission).
// Failures are translated here into localized `ApiError`s.

pub mod protected;
pub mod public;

use crate::database::models::describe_validation_errors;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::repository::RepositoryError;
use crate::services::ServiceError;
use crate::types::Module;

const TRACING_TARGET_HANDLERS: &str = "msaada_backend::handlers";

/// What a handler was doing when a service failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

/// The module a record of `module` points at through its foreign key.
fn referenced(module: Module) -> Module {
    match module {
        Module::User => Module::Profile,
        other => other,
    }
}

pub fn service_error(err: ServiceError, module: Module, operation: Operation, locale: &Locale) -> ApiError {
    match err {
        ServiceError::Validation(errors) => ApiError::validation_error(
            locale.err_invalid_datas.clone(),
            Some(describe_validation_errors(&errors)),
        ),
        ServiceError::Repository(RepositoryError::DuplicatedKey(_)) => {
            ApiError::conflict(locale.registered(module).to_string())
        }
        ServiceError::Repository(RepositoryError::ForeignKeyViolated(_)) => match operation {
            Operation::Delete => ApiError::bad_request(locale.used(module).to_string()),
            _ => ApiError::bad_request(locale.not_found(referenced(module)).to_string()),
        },
        ServiceError::Repository(RepositoryError::UndefinedColumn(_)) => {
            ApiError::bad_request(locale.err_undefined_column.clone())
        }
        ServiceError::Repository(RepositoryError::NotFound) => {
            ApiError::not_found(locale.not_found(module).to_string())
        }
        ServiceError::PasswordMismatch => ApiError::bad_request(locale.err_pass_unmatch.clone()),
        ServiceError::UserHasPassword => ApiError::bad_request(locale.err_user_has_pass.clone()),
        other => {
            tracing::error!(
                target: TRACING_TARGET_HANDLERS,
                %module,
                ?operation,
                error = %other,
                "request failed"
            );
            ApiError::internal_server_error(locale.err_generic.clone())
        }
    }
}
