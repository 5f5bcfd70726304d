use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub i18n: I18nConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub max_limit: Option<i64>,
    pub debug_logging: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it wins over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    /// Base64 encoded PEM key material.
    pub access_token_private: String,
    pub access_token_public: String,
    pub refresh_token_private: String,
    pub refresh_token_public: String,
    pub access_token_expire: String,
    pub refresh_token_expire: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub languages: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub mail: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("API_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("API_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SYS_VERSION") {
            self.server.version = v;
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().ok();
        }
        if let Ok(v) = env::var("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = v.parse().unwrap_or(self.filter.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("POSTGRES_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("POSTGRES_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("POSTGRES_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("POSTGRES_PASS") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("POSTGRES_BASE") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_LOGGER") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_PRIVAT") {
            self.security.access_token_private = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_PUBLIC") {
            self.security.access_token_public = v;
        }
        if let Ok(v) = env::var("RFRESH_TOKEN_PRIVAT") {
            self.security.refresh_token_private = v;
        }
        if let Ok(v) = env::var("RFRESH_TOKEN_PUBLIC") {
            self.security.refresh_token_public = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRE") {
            self.security.access_token_expire = v;
        }
        if let Ok(v) = env::var("RFRESH_TOKEN_EXPIRE") {
            self.security.refresh_token_expire = v;
        }

        // Localization overrides
        if let Ok(v) = env::var("SYS_LANGUAGE") {
            self.i18n.default_language = v.trim().to_lowercase();
        }
        if let Ok(v) = env::var("SYS_LANGUAGES") {
            self.i18n.languages = split_list(&v).into_iter().map(|l| l.to_lowercase()).collect();
        }

        // Default administrator
        if let Ok(v) = env::var("ADM_NAME") {
            self.admin.name = v;
        }
        if let Ok(v) = env::var("ADM_MAIL") {
            self.admin.mail = v;
        }
        if let Ok(v) = env::var("ADM_PASS") {
            self.admin.password = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            filter: FilterConfig {
                max_limit: Some(1000),
                debug_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 200,
                rate_limit_window_secs: 60,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                ..SecurityConfig::default()
            },
            i18n: I18nConfig::default(),
            admin: AdminConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig::default(),
            filter: FilterConfig {
                max_limit: Some(500),
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 200,
                rate_limit_window_secs: 60,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                ..SecurityConfig::default()
            },
            i18n: I18nConfig::default(),
            admin: AdminConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::default(),
            filter: FilterConfig {
                max_limit: Some(100),
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 200,
                rate_limit_window_secs: 60,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                ..SecurityConfig::default()
            },
            i18n: I18nConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "msaada".to_string(),
            max_connections: 10,
            connection_timeout: 30,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            access_token_private: String::new(),
            access_token_public: String::new(),
            refresh_token_private: String::new(),
            refresh_token_public: String::new(),
            access_token_expire: "15".to_string(),
            refresh_token_expire: "1440".to_string(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            languages: vec!["en".to_string(), "pt".to_string(), "sw".to_string()],
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: "Administrator".to_string(),
            mail: String::new(),
            password: String::new(),
        }
    }
}

// Key material and passwords stay out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("cors_origins", &self.cors_origins)
            .field("access_token_private", &"<redacted>")
            .field("access_token_public", &"<redacted>")
            .field("refresh_token_private", &"<redacted>")
            .field("refresh_token_public", &"<redacted>")
            .field("access_token_expire", &self.access_token_expire)
            .field("refresh_token_expire", &self.refresh_token_expire)
            .finish()
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("name", &self.name)
            .field("mail", &self.mail)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.filter.max_limit, Some(1000));
        assert!(config.api.enable_rate_limiting);
        assert_eq!(config.api.rate_limit_requests, 200);
        assert_eq!(config.i18n.default_language, "en");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.filter.max_limit, Some(100));
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.access_token_expire, "15");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::development();
        config.security.access_token_private = "c2VjcmV0LWtleQ==".to_string();
        config.admin.password = "hunter22".to_string();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("c2VjcmV0LWtleQ=="));
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn split_list_trims_and_skips_blanks() {
        assert_eq!(split_list(" en, pt ,,sw "), vec!["en", "pt", "sw"]);
    }
}
