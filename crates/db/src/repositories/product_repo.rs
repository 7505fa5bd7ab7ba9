//! Repository for the `products` table.

use depot_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::document::ProductRow;

const COLUMNS: &str = "id, name, stock_qty, created_at, updated_at";

pub struct ProductRepo;

impl ProductRepo {
    pub async fn create(pool: &PgPool, name: &str, stock_qty: i64) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, stock_qty) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(name)
            .bind(stock_qty)
            .fetch_one(pool)
            .await
    }

    pub async fn find_stock<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT stock_qty FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(|r| r.0))
    }

    /// Add `delta` to the product's stock unless that would go negative.
    ///
    /// Returns the new quantity, or `None` if the product is missing or the
    /// guard refused the change.
    pub async fn apply_delta<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        delta: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE products
             SET stock_qty = stock_qty + $2, updated_at = now()
             WHERE id = $1 AND stock_qty + $2 >= 0
             RETURNING stock_qty",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|r| r.0))
    }
}
