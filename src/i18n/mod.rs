//! Localized message tables.
//!
//! Every shipped language lives in `locales/<code>.yaml` and is embedded in the
//! binary. Only the default language and the languages enabled in
//! [`I18nConfig`] are loaded; a request asking for anything else is served in
//! the default language.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::config::I18nConfig;
use crate::types::Module;

const TRACING_TARGET_I18N: &str = "msaada_backend::i18n";

const BUNDLED: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.yaml")),
    ("pt", include_str!("../../locales/pt.yaml")),
    ("sw", include_str!("../../locales/sw.yaml")),
];

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Invalid translation table '{language}': {source}")]
    InvalidTable {
        language: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Default language '{0}' is not available")]
    MissingDefault(String),
}

/// One language's message table.
#[derive(Debug, Clone, Deserialize)]
pub struct Translation {
    pub err_generic: String,
    pub err_invalid_id: String,
    pub err_invalid_datas: String,
    pub err_many_request: String,
    pub err_nonexistent_route: String,
    pub err_undefined_column: String,
    pub err_expired_token: String,
    pub err_invalid_token: String,
    pub err_disabled_user: String,
    pub err_incorrect_password: String,
    pub err_pass_unmatch: String,
    pub err_user_has_pass: String,
    pub err_invalid_ip_association: String,
    pub err_permission_denied: String,
    pub err_product_used: String,
    pub err_product_not_found: String,
    pub err_product_registered: String,
    pub err_profile_used: String,
    pub err_profile_not_found: String,
    pub err_profile_registered: String,
    pub err_user_used: String,
    pub err_user_not_found: String,
    pub err_user_registered: String,
}

impl Translation {
    pub fn not_found(&self, module: Module) -> &str {
        match module {
            Module::User => &self.err_user_not_found,
            Module::Profile => &self.err_profile_not_found,
            Module::Product => &self.err_product_not_found,
        }
    }

    pub fn registered(&self, module: Module) -> &str {
        match module {
            Module::User => &self.err_user_registered,
            Module::Profile => &self.err_profile_registered,
            Module::Product => &self.err_product_registered,
        }
    }

    pub fn used(&self, module: Module) -> &str {
        match module {
            Module::User => &self.err_user_used,
            Module::Profile => &self.err_profile_used,
            Module::Product => &self.err_product_used,
        }
    }
}

/// The translation selected for the current request.
#[derive(Debug, Clone)]
pub struct Locale(pub Arc<Translation>);

impl Deref for Locale {
    type Target = Translation;

    fn deref(&self) -> &Translation {
        &self.0
    }
}

#[derive(Debug)]
pub struct Translations {
    default_language: String,
    default: Arc<Translation>,
    tables: HashMap<String, Arc<Translation>>,
}

impl Translations {
    pub fn load(config: &I18nConfig) -> Result<Self, I18nError> {
        let mut tables = HashMap::new();

        let wanted = std::iter::once(&config.default_language).chain(&config.languages);
        for language in wanted {
            if tables.contains_key(language.as_str()) {
                continue;
            }
            let Some((code, source)) = BUNDLED.iter().find(|(code, _)| *code == language.as_str()) else {
                tracing::warn!(
                    target: TRACING_TARGET_I18N,
                    "No translation table shipped for language '{}', skipping",
                    language
                );
                continue;
            };

            let table: Translation =
                serde_yaml::from_str(source).map_err(|source| I18nError::InvalidTable {
                    language: code.to_string(),
                    source,
                })?;
            tables.insert(code.to_string(), Arc::new(table));
        }

        let default = tables
            .get(&config.default_language)
            .cloned()
            .ok_or_else(|| I18nError::MissingDefault(config.default_language.clone()))?;

        tracing::debug!(target: TRACING_TARGET_I18N, "Loaded {} translation tables", tables.len());

        Ok(Self {
            default_language: config.default_language.clone(),
            default,
            tables,
        })
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn default_locale(&self) -> Locale {
        Locale(self.default.clone())
    }

    /// Picks the table for a `lang` value: its first two characters,
    /// lower-cased, falling back to the default language.
    pub fn resolve(&self, requested: Option<&str>) -> Locale {
        let code: String = requested
            .unwrap_or(&self.default_language)
            .trim()
            .chars()
            .take(2)
            .collect::<String>()
            .to_lowercase();

        self.locale(&code)
    }

    fn locale(&self, code: &str) -> Locale {
        Locale(self.tables.get(code).cloned().unwrap_or_else(|| self.default.clone()))
    }
}
