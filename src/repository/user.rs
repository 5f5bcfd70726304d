use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use super::{RepositoryError, UserRepository};
use crate::database::models::{Permissions, Profile, User};
use crate::database::query_builder::{fetch_all_as, fetch_count};
use crate::filter::{FilterColumns, FilterQuery, UserFilter};

const TABLE: &str = "users";
const JOIN_PROFILES: &str = "JOIN \"profiles\" ON \"profiles\".\"id\" = \"users\".\"profile_id\"";
const JOIN_PERMISSIONS: &str =
    "LEFT JOIN \"permissions\" ON \"permissions\".\"profile_id\" = \"profiles\".\"id\"";
const SELECT: &str = "\"users\".\"id\", \"users\".\"name\", \"users\".\"mail\", \
    \"users\".\"status\", \"users\".\"new\", \"users\".\"profile_id\", \
    \"users\".\"token\", \"users\".\"password\", \
    \"users\".\"created_at\", \"users\".\"updated_at\", \
    \"profiles\".\"name\" AS profile_name, \
    \"profiles\".\"created_at\" AS profile_created_at, \
    \"profiles\".\"updated_at\" AS profile_updated_at, \
    COALESCE(\"permissions\".\"user_module\", FALSE) AS user_module, \
    COALESCE(\"permissions\".\"profile_module\", FALSE) AS profile_module, \
    COALESCE(\"permissions\".\"product_module\", FALSE) AS product_module";
const COLUMNS: FilterColumns = FilterColumns {
    search: &["users.name", "users.mail", "profiles.name"],
    sortable: User::SORTABLE,
};

/// A user joined with its profile and permissions.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    mail: String,
    status: bool,
    new: bool,
    profile_id: i64,
    token: Option<String>,
    password: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    profile_name: String,
    profile_created_at: DateTime<Utc>,
    profile_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    permissions: Permissions,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            mail: row.mail,
            status: row.status,
            new: row.new,
            profile_id: row.profile_id,
            token: row.token,
            password: row.password,
            profile: Some(Profile {
                id: row.profile_id,
                name: row.profile_name,
                permissions: row.permissions,
                created_at: row.profile_created_at,
                updated_at: row.profile_updated_at,
            }),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn list_query(filter: &UserFilter) -> Result<FilterQuery, RepositoryError> {
        let mut query = FilterQuery::new(TABLE)?
            .join(JOIN_PROFILES)
            .join(JOIN_PERMISSIONS);
        if let Some(profile_id) = filter.profile_id() {
            query = query.where_eq("users.profile_id", json!(profile_id))?;
        }
        Ok(query.assign(&filter.filter, &COLUMNS)?)
    }

    async fn find_one(&self, column: &str, value: Value) -> Result<User, RepositoryError> {
        let query = FilterQuery::new(TABLE)?
            .join(JOIN_PROFILES)
            .join(JOIN_PERMISSIONS)
            .where_eq(column, value)?;
        fetch_all_as::<UserRow>(&self.pool, &query.to_sql(SELECT))
            .await?
            .into_iter()
            .next()
            .map(User::from)
            .ok_or(RepositoryError::NotFound)
    }

    /// Runs a statement that must touch the user's row.
    async fn execute_for(&self, query: Query<'_, Postgres, PgArguments>) -> Result<(), RepositoryError> {
        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn count_users(&self, filter: &UserFilter) -> Result<i64, RepositoryError> {
        let query = Self::list_query(filter)?;
        Ok(fetch_count(&self.pool, &query.to_count_sql()).await?)
    }

    async fn get_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let query = Self::list_query(filter)?;
        let rows = fetch_all_as::<UserRow>(&self.pool, &query.to_sql(SELECT)).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        self.find_one("users.id", json!(id)).await
    }

    async fn get_user_by_mail(&self, mail: &str) -> Result<User, RepositoryError> {
        self.find_one("users.mail", json!(mail)).await
    }

    async fn get_user_by_token(&self, token: &str) -> Result<User, RepositoryError> {
        self.find_one("users.token", json!(token)).await
    }

    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, mail, status, new, profile_id) \
             VALUES ($1, $2, $3, TRUE, $4) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.mail)
        .bind(user.status)
        .bind(user.profile_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_user_by_id(id).await
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        self.execute_for(
            sqlx::query(
                "UPDATE users SET name = $1, mail = $2, status = $3, profile_id = $4, \
                 updated_at = NOW() WHERE id = $5",
            )
            .bind(&user.name)
            .bind(&user.mail)
            .bind(user.status)
            .bind(user.profile_id)
            .bind(user.id),
        )
        .await?;

        self.get_user_by_id(user.id).await
    }

    async fn delete_user(&self, user: &User) -> Result<(), RepositoryError> {
        self.execute_for(sqlx::query("DELETE FROM users WHERE id = $1").bind(user.id))
            .await
    }

    async fn reset_user_password(&self, user: &User) -> Result<(), RepositoryError> {
        self.execute_for(
            sqlx::query(
                "UPDATE users SET password = NULL, token = NULL, new = TRUE, \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(user.id),
        )
        .await
    }

    async fn set_user_password(&self, user: &User, token: &str, hash: &str) -> Result<(), RepositoryError> {
        self.execute_for(
            sqlx::query(
                "UPDATE users SET password = $1, token = $2, new = FALSE, \
                 updated_at = NOW() WHERE id = $3",
            )
            .bind(hash)
            .bind(token)
            .bind(user.id),
        )
        .await
    }
}
