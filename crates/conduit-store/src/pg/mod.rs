//! Postgres-backed `ConnectionStore`, additive to the required in-memory
//! backend (feature `pg`). Grounded in the same pool/provider/migration
//! shape the in-memory store's sibling crate used for its event log, but
//! scoped down to plain CRUD over one table — there is no event sourcing
//! here, just connection rows.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conduit_domain::Connection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use serde_json::Value;

use crate::error::StoreError;
use crate::migrations::run_pending_migrations;
use crate::schema::connections;
use crate::store::{ConnectionStore, Page, Pagination};

pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, StoreError>;
}

pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, StoreError> {
        self.pool.get().map_err(|e| StoreError::TransientIo(format!("pool error: {e}")))
    }
}

#[derive(Queryable, Debug)]
struct ConnectionRow {
    id: String,
    external_id: String,
    integration_id: String,
    connector_id: String,
    config: Value,
    sync_interval_minutes: i32,
    active_syncs: Value,
    metadata: Value,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = connections)]
struct NewConnectionRow<'a> {
    id: &'a str,
    external_id: &'a str,
    integration_id: &'a str,
    connector_id: &'a str,
    config: &'a Value,
    sync_interval_minutes: i32,
    active_syncs: Value,
    metadata: Value,
}

fn to_row(connection: &Connection) -> (NewConnectionRow<'_>, Value, Value) {
    let active_syncs = serde_json::to_value(&connection.active_syncs).expect("serialize active_syncs");
    let metadata = serde_json::to_value(&connection.metadata).expect("serialize metadata");
    let row = NewConnectionRow {
        id: &connection.id,
        external_id: &connection.external_id,
        integration_id: &connection.integration_id,
        connector_id: &connection.connector_id,
        config: &connection.config,
        sync_interval_minutes: connection.sync_interval_minutes as i32,
        active_syncs: active_syncs.clone(),
        metadata: metadata.clone(),
    };
    (row, active_syncs, metadata)
}

fn from_row(row: ConnectionRow) -> Result<Connection, StoreError> {
    let active_syncs: HashSet<String> = serde_json::from_value(row.active_syncs).map_err(|e| StoreError::Unknown(format!("active_syncs decode: {e}")))?;
    let metadata: HashMap<String, conduit_domain::SyncRecord> =
        serde_json::from_value(row.metadata).map_err(|e| StoreError::Unknown(format!("metadata decode: {e}")))?;
    Ok(Connection {
        id: row.id,
        external_id: row.external_id,
        integration_id: row.integration_id,
        connector_id: row.connector_id,
        config: row.config,
        sync_interval_minutes: row.sync_interval_minutes as u32,
        active_syncs,
        metadata,
    })
}

pub struct PgConnectionStore<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> PgConnectionStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: ConnectionProvider> ConnectionStore for PgConnectionStore<P> {
    async fn create(&self, connection: Connection) -> Result<Connection, StoreError> {
        let mut conn = self.provider.connection()?;
        let (row, _, _) = to_row(&connection);
        diesel::insert_into(connections::table).values(&row).execute(&mut conn)?;
        Ok(connection)
    }

    async fn read(&self, id: &str) -> Result<Connection, StoreError> {
        let mut conn = self.provider.connection()?;
        let row: ConnectionRow = connections::table.find(id).first(&mut conn).map_err(|e| match e {
            diesel::result::Error::NotFound => StoreError::NotFound(id.to_string()),
            other => StoreError::from(other),
        })?;
        from_row(row)
    }

    async fn read_all(&self, page: Pagination) -> Result<Page<Connection>, StoreError> {
        let mut conn = self.provider.connection()?;
        let total: i64 = connections::table.count().get_result(&mut conn)?;
        let rows: Vec<ConnectionRow> = connections::table
            .order(connections::created_at.asc())
            .offset(page.offset() as i64)
            .limit(page.limit as i64)
            .load(&mut conn)?;
        let items = rows.into_iter().map(from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn update(&self, connection: Connection) -> Result<Connection, StoreError> {
        let mut conn = self.provider.connection()?;
        let (row, _, _) = to_row(&connection);
        let affected = diesel::update(connections::table.find(&connection.id)).set(&row).execute(&mut conn)?;
        if affected == 0 {
            return Err(StoreError::NotFound(connection.id));
        }
        Ok(connection)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut conn = self.provider.connection()?;
        let affected = diesel::delete(connections::table.find(id)).execute(&mut conn)?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, StoreError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1).max(validated_min);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .min_idle(Some(validated_min))
        .max_size(validated_max)
        .build(manager)
        .map_err(|e| StoreError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get().map_err(|e| StoreError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

pub fn build_dev_pool_from_env() -> Result<PgPool, StoreError> {
    crate::config::init_dotenv();
    let cfg = crate::config::StoreConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
