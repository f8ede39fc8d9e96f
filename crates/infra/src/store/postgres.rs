//! Postgres-backed catalog store.
//!
//! Entity graphs are kept as JSONB documents next to the columns the export
//! queries filter and sort on:
//!
//! | table | columns |
//! |---|---|
//! | `export_products` | `id uuid pk`, `auto_increment bigint unique`, `parent_id uuid null`, `document jsonb` |
//! | `export_orders` | `id uuid pk`, `auto_increment bigint unique`, `document jsonb` |
//!
//! Documents are the serde form of [`Product`] / [`Order`] with every
//! association the exporters read already embedded.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;

use catalog_export_core::EntityId;
use catalog_export_products::Product;
use catalog_export_sales::Order;

use super::snapshot::CatalogSnapshot;
use super::r#trait::{OrderRepository, ProductRepository, StoreError};

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS export_products (
    id UUID PRIMARY KEY,
    auto_increment BIGINT NOT NULL UNIQUE,
    parent_id UUID NULL,
    document JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS export_orders (
    id UUID PRIMARY KEY,
    auto_increment BIGINT NOT NULL UNIQUE,
    document JSONB NOT NULL
);
"#;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the document tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    /// Insert or replace a product and index its embedded variants.
    ///
    /// Variants only take free slots: an existing row with the same id or
    /// cursor wins, like in [`InMemoryCatalogStore`](super::InMemoryCatalogStore).
    pub async fn upsert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("upsert_product", e))?;

        for variant in product.variants() {
            write_product(&mut *tx, INSERT_VARIANT, &variant).await?;
        }
        write_product(&mut *tx, UPSERT_PRODUCT, product).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("upsert_product", e))?;
        Ok(())
    }

    pub async fn upsert_order(&self, order: &Order) -> Result<(), StoreError> {
        let document = serde_json::to_value(order).map_err(|e| StoreError::Decode {
            entity: "order",
            message: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO export_orders (id, auto_increment, document)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                auto_increment = EXCLUDED.auto_increment,
                document = EXCLUDED.document
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(to_db_cursor("upsert_order", order.auto_increment)?)
        .bind(document)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_order", e))?;
        Ok(())
    }

    /// Seed the tables from a catalog snapshot.
    pub async fn import(&self, snapshot: &CatalogSnapshot) -> Result<(), StoreError> {
        for product in &snapshot.products {
            self.upsert_product(product).await?;
        }
        for order in &snapshot.orders {
            self.upsert_order(order).await?;
        }
        tracing::info!(
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            "imported catalog snapshot into postgres"
        );
        Ok(())
    }
}

const UPSERT_PRODUCT: &str = r#"
INSERT INTO export_products (id, auto_increment, parent_id, document)
VALUES ($1, $2, $3, $4)
ON CONFLICT (id) DO UPDATE SET
    auto_increment = EXCLUDED.auto_increment,
    parent_id = EXCLUDED.parent_id,
    document = EXCLUDED.document
"#;

const INSERT_VARIANT: &str = r#"
INSERT INTO export_products (id, auto_increment, parent_id, document)
VALUES ($1, $2, $3, $4)
ON CONFLICT DO NOTHING
"#;

async fn write_product(
    conn: &mut PgConnection,
    sql: &'static str,
    product: &Product,
) -> Result<(), StoreError> {
    let document = serde_json::to_value(product).map_err(|e| StoreError::Decode {
        entity: "product",
        message: e.to_string(),
    })?;

    sqlx::query(sql)
        .bind(product.id.as_uuid())
        .bind(to_db_cursor("upsert_product", product.auto_increment)?)
        .bind(product.parent_id.map(|id| *id.as_uuid()))
        .bind(document)
        .execute(conn)
        .await
        .map_err(|e| map_sqlx_error("upsert_product", e))?;
    Ok(())
}

#[async_trait]
impl ProductRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn products_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Product>, StoreError> {
        // No stored cursor lies above i64::MAX.
        let Ok(from_cursor) = i64::try_from(from_cursor) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT document
            FROM export_products
            WHERE auto_increment >= $1
            ORDER BY auto_increment ASC
            LIMIT $2
            "#,
        )
        .bind(from_cursor)
        .bind(to_db_limit(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("products_from", e))?;

        rows.iter().map(|row| decode_document(row, "product")).collect()
    }

    #[instrument(skip(self), err)]
    async fn product_by_id(&self, id: EntityId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT document FROM export_products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_by_id", e))?;

        row.as_ref()
            .map(|row| decode_document(row, "product"))
            .transpose()
    }
}

#[async_trait]
impl OrderRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn orders_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Order>, StoreError> {
        // No stored cursor lies above i64::MAX.
        let Ok(from_cursor) = i64::try_from(from_cursor) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT document
            FROM export_orders
            WHERE auto_increment >= $1
            ORDER BY auto_increment ASC
            LIMIT $2
            "#,
        )
        .bind(from_cursor)
        .bind(to_db_limit(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("orders_from", e))?;

        rows.iter().map(|row| decode_document(row, "order")).collect()
    }
}

fn decode_document<T: serde::de::DeserializeOwned>(
    row: &sqlx::postgres::PgRow,
    entity: &'static str,
) -> Result<T, StoreError> {
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| map_sqlx_error("decode_document", e))?;
    serde_json::from_value(document).map_err(|e| StoreError::Decode {
        entity,
        message: e.to_string(),
    })
}

/// Cursor as stored in the BIGINT column.
fn to_db_cursor(operation: &'static str, cursor: u64) -> Result<i64, StoreError> {
    i64::try_from(cursor).map_err(|_| StoreError::Backend {
        operation,
        message: format!("cursor {cursor} exceeds the BIGINT range"),
    })
}

fn to_db_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    let message = match &err {
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("database error {code}: {}", db_err.message()),
            None => db_err.message().to_string(),
        },
        other => other.to_string(),
    };
    StoreError::Backend { operation, message }
}
