use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use super::{ProfileRepository, RepositoryError};
use crate::database::models::Profile;
use crate::database::query_builder::{fetch_all_as, fetch_count};
use crate::filter::{Filter, FilterColumns, FilterQuery};

const TABLE: &str = "profiles";
const JOIN_PERMISSIONS: &str =
    "LEFT JOIN \"permissions\" ON \"permissions\".\"profile_id\" = \"profiles\".\"id\"";
const SELECT: &str = "\"profiles\".\"id\", \"profiles\".\"name\", \
    \"profiles\".\"created_at\", \"profiles\".\"updated_at\", \
    COALESCE(\"permissions\".\"user_module\", FALSE) AS user_module, \
    COALESCE(\"permissions\".\"profile_module\", FALSE) AS profile_module, \
    COALESCE(\"permissions\".\"product_module\", FALSE) AS product_module";
const COLUMNS: FilterColumns = FilterColumns {
    search: &["profiles.name"],
    sortable: Profile::SORTABLE,
};

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: serde_json::Value) -> Result<Profile, RepositoryError> {
        let query = FilterQuery::new(TABLE)?
            .join(JOIN_PERMISSIONS)
            .where_eq(column, value)?;
        fetch_all_as(&self.pool, &query.to_sql(SELECT))
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_permissions(
        tx: &mut Transaction<'_, Postgres>,
        profile_id: i64,
        profile: &Profile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO permissions (profile_id, user_module, profile_module, product_module) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (profile_id) DO UPDATE SET \
             user_module = EXCLUDED.user_module, \
             profile_module = EXCLUDED.profile_module, \
             product_module = EXCLUDED.product_module",
        )
        .bind(profile_id)
        .bind(profile.permissions.user_module)
        .bind(profile.permissions.profile_module)
        .bind(profile.permissions.product_module)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn count_profiles(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        let query = FilterQuery::new(TABLE)?.assign(filter, &COLUMNS)?;
        Ok(fetch_count(&self.pool, &query.to_count_sql()).await?)
    }

    async fn get_profiles(&self, filter: &Filter) -> Result<Vec<Profile>, RepositoryError> {
        let query = FilterQuery::new(TABLE)?
            .join(JOIN_PERMISSIONS)
            .assign(filter, &COLUMNS)?;
        Ok(fetch_all_as(&self.pool, &query.to_sql(SELECT)).await?)
    }

    async fn get_profile_by_id(&self, id: i64) -> Result<Profile, RepositoryError> {
        self.find_one("profiles.id", json!(id)).await
    }

    async fn get_profile_by_name(&self, name: &str) -> Result<Profile, RepositoryError> {
        self.find_one("profiles.name", json!(name)).await
    }

    async fn create_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar("INSERT INTO profiles (name) VALUES ($1) RETURNING id")
            .bind(&profile.name)
            .fetch_one(&mut *tx)
            .await?;
        Self::save_permissions(&mut tx, id, profile).await?;

        tx.commit().await?;
        self.get_profile_by_id(id).await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE profiles SET name = $1, updated_at = NOW() WHERE id = $2")
            .bind(&profile.name)
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Self::save_permissions(&mut tx, profile.id, profile).await?;

        tx.commit().await?;
        self.get_profile_by_id(profile.id).await
    }

    async fn delete_profile(&self, profile: &Profile) -> Result<(), RepositoryError> {
        // permissions follow through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
