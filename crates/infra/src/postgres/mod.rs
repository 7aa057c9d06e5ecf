//! Postgres-backed store implementation.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Duplicate` | Name, SKU or mobile already taken |
//! | Database (foreign key violation) | `23503` | `MissingReference` | Reference id does not resolve |
//! | Anything else | N/A | `Backend` | Network errors, decoding, closed pool |
//!
//! The offending field is recovered from the constraint name, which follows
//! the Postgres default `<table>_<column>_key` / `<table>_<column>_fkey`
//! convention (see `migrations/0001_catalog.sql`).
//!
//! ## Cascades
//!
//! Deletes are single statements; dependent rows are removed (or detached,
//! for child categories) by the `ON DELETE` clauses of the foreign keys.

mod records;
mod users;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tracing::{info, instrument};
use uuid::Uuid;

use catalog_core::{StoreError, StoreResult};
use catalog_products::CatalogEntity;

use crate::Repository;

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

pub(crate) type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Row mapping for a catalog entity.
pub trait PgRecord: CatalogEntity + Unpin {
    const TABLE: &'static str;

    /// Every column, `id` first. [`PgRecord::bind_columns`] binds values in
    /// this order.
    const COLUMNS: &'static [&'static str];

    fn key(id: &Self::Id) -> Uuid;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply the schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::backend(format!("failed to connect to postgres: {e}")))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create missing tables. Safe to run on every startup.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", "schema", "", e))?;
        info!("database schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn select_sql<E: PgRecord>() -> String {
    format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn insert_sql<E: PgRecord>() -> String {
    let placeholders: Vec<String> = (1..=E::COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql<E: PgRecord>() -> String {
    let assignments: Vec<String> = E::COLUMNS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect();
    format!("UPDATE {} SET {} WHERE id = $1", E::TABLE, assignments.join(", "))
}

/// Wire name of the field behind a constraint, e.g. `variants_sku_key` →
/// `SKU`, `brands_manufacturer_id_fkey` → `manufacturer`.
pub(crate) fn constraint_field(table: &str, constraint: &str) -> String {
    let column = constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix("_fkey").or_else(|| rest.strip_suffix("_key")))
        .unwrap_or(constraint);

    match column {
        "sku" => "SKU".to_string(),
        other => other.strip_suffix("_id").unwrap_or(other).to_string(),
    }
}

pub(crate) fn map_sqlx_error(operation: &str, entity: &'static str, table: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        let field = || constraint_field(table, db_err.constraint().unwrap_or_default());
        if db_err.is_unique_violation() {
            return StoreError::duplicate(entity, field());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::missing_reference(field());
        }
    }
    StoreError::backend(format!("{operation} failed: {err}"))
}

#[async_trait]
impl<E: PgRecord> Repository<E> for PostgresStore {
    #[instrument(skip_all, fields(table = E::TABLE, count = records.len()), err)]
    async fn insert(&self, records: Vec<E>) -> StoreResult<Vec<E>> {
        let sql = insert_sql::<E>();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", E::NAME, E::TABLE, e))?;

        for record in &records {
            record
                .bind_columns(sqlx::query(&sql))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert", E::NAME, E::TABLE, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", E::NAME, E::TABLE, e))?;
        Ok(records)
    }

    #[instrument(skip_all, fields(table = E::TABLE, id = %record.id()), err)]
    async fn update(&self, record: E) -> StoreResult<E> {
        let sql = update_sql::<E>();
        let result = record
            .bind_columns(sqlx::query(&sql))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", E::NAME, E::TABLE, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(record)
    }

    async fn get(&self, id: E::Id) -> StoreResult<Option<E>> {
        let sql = format!("{} WHERE id = $1", select_sql::<E>());
        let row = sqlx::query(&sql)
            .bind(E::key(&id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", E::NAME, E::TABLE, e))?;

        row.as_ref()
            .map(E::from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("decode", E::NAME, E::TABLE, e))
    }

    async fn list(&self) -> StoreResult<Vec<E>> {
        let sql = format!("{} ORDER BY date_added, id", select_sql::<E>());
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", E::NAME, E::TABLE, e))?;

        rows.iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode", E::NAME, E::TABLE, e))
    }

    #[instrument(skip(self), fields(table = E::TABLE), err)]
    async fn delete(&self, id: E::Id) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql)
            .bind(E::key(&id))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", E::NAME, E::TABLE, e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests;
