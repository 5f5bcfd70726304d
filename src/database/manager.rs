use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::DatabaseConfig;

/// SQLSTATE raised by `CREATE DATABASE` for an existing database.
const DUPLICATE_DATABASE: &str = "42P04";

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connects to, creates and migrates the application database.
pub struct DatabaseManager {
    config: DatabaseConfig,
}

impl DatabaseManager {
    /// Maintenance database used for administrative statements.
    const ADMIN_DB_NAME: &'static str = "postgres";

    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Target database: the path of `DATABASE_URL`, else the configured name.
    pub fn database_name(&self) -> String {
        self.config
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .map(|u| u.path().trim_start_matches('/').to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.name.clone())
    }

    fn base_url(&self) -> Result<Url, DatabaseError> {
        if let Some(url) = &self.config.url {
            return Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl);
        }

        let mut url = Url::parse(&format!("postgres://{}:{}", self.config.host, self.config.port))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(&self.config.user)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !self.config.password.is_empty() {
            url.set_password(Some(&self.config.password))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url)
    }

    /// Connection string for `database_name`, keeping credentials and query options.
    pub fn connection_string(&self, database_name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_db_name(database_name) {
            return Err(DatabaseError::InvalidDatabaseName(database_name.to_string()));
        }
        let mut url = self.base_url()?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    async fn pool(&self, database_name: &str) -> Result<PgPool, DatabaseError> {
        let connection_string = self.connection_string(database_name)?;
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.connection_timeout))
            .connect(&connection_string)
            .await?;
        Ok(pool)
    }

    /// Creates the target database when missing.
    pub async fn ensure_database(&self) -> Result<(), DatabaseError> {
        let name = self.database_name();
        let admin_pool = self.pool(Self::ADMIN_DB_NAME).await?;

        let query = format!("CREATE DATABASE {}", Self::quote_identifier(&name));
        let result = sqlx::query(&query).execute(&admin_pool).await;
        admin_pool.close().await;

        match result {
            Ok(_) => {
                info!("Created database {}", name);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(DUPLICATE_DATABASE) => {
                info!("Database {} already exists", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the database if needed, connects, installs extensions and migrates.
    pub async fn bootstrap(&self) -> Result<PgPool, DatabaseError> {
        self.ensure_database().await?;
        let pool = self.pool(&self.database_name()).await?;
        Self::migrate(&pool).await?;
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS unaccent")
            .execute(pool)
            .await?;
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn is_valid_db_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 63
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
