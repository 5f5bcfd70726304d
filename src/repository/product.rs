use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use super::{ProductRepository, RepositoryError};
use crate::database::models::Product;
use crate::database::query_builder::{fetch_all_as, fetch_count};
use crate::filter::{Filter, FilterColumns, FilterQuery};

const TABLE: &str = "product";
const SELECT: &str = "\"product\".\"id\", \"product\".\"name\", \"product\".\"created_at\", \"product\".\"updated_at\"";
const COLUMNS: FilterColumns = FilterColumns {
    search: &["product.name"],
    sortable: Product::SORTABLE,
};

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn count_products(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        let query = FilterQuery::new(TABLE)?.assign(filter, &COLUMNS)?;
        Ok(fetch_count(&self.pool, &query.to_count_sql()).await?)
    }

    async fn get_products(&self, filter: &Filter) -> Result<Vec<Product>, RepositoryError> {
        let query = FilterQuery::new(TABLE)?.assign(filter, &COLUMNS)?;
        Ok(fetch_all_as(&self.pool, &query.to_sql(SELECT)).await?)
    }

    async fn get_product_by_id(&self, id: i64) -> Result<Product, RepositoryError> {
        let query = FilterQuery::new(TABLE)?.where_eq("product.id", json!(id))?;
        fetch_all_as(&self.pool, &query.to_sql(SELECT))
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(
            "INSERT INTO product (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
        )
        .bind(&product.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let updated = sqlx::query_as::<_, Product>(
            "UPDATE product SET name = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(&product.name)
        .bind(product.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(product.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
