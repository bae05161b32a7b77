//! # Sequential ID Generation
//!
//! The stateful half of the sequential id generator: per-prefix counters
//! behind a swappable store abstraction.
//!
//! ## Store Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SequenceStore Seam                                 │
//! │                                                                         │
//! │            ┌──────────────────────┐                                     │
//! │            │  trait SequenceStore │                                     │
//! │            │  current / next_value│                                     │
//! │            └──────────┬───────────┘                                     │
//! │                       │                                                 │
//! │        ┌──────────────┴──────────────┐                                  │
//! │        ▼                             ▼                                  │
//! │  SqlSequenceStore             MemorySequenceStore                       │
//! │  ──────────────────           ───────────────────                       │
//! │  sequence_counters row        mutex-guarded HashMap                     │
//! │  atomic upsert+RETURNING      resets at process start                   │
//! │  retried on transient         NOT safe across restarts                  │
//! │  failures                     or multiple instances;                    │
//! │                               isolated harnesses only                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The persisted store increments in a single `INSERT .. ON CONFLICT ..
//! RETURNING` statement, so concurrent callers can never observe the same
//! value: the database serializes the increments. A failed increment is
//! fatal for the enclosing create operation - callers never commit a
//! partial order or return with a missing id.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use suds_core::sequence::format_sequential_id;

use crate::error::{DbError, DbResult};
use crate::retry::RetryPolicy;

// =============================================================================
// Store Trait
// =============================================================================

/// Per-prefix monotonic counter storage.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Returns the last issued value for a prefix, if any was ever issued.
    async fn current(&self, prefix: &str) -> DbResult<Option<i64>>;

    /// Atomically increments the counter for a prefix and returns the new
    /// value. The first call for a prefix returns 1.
    async fn next_value(&self, prefix: &str) -> DbResult<i64>;
}

// =============================================================================
// SQL Store
// =============================================================================

/// Sequence store backed by the `sequence_counters` table.
#[derive(Debug, Clone)]
pub struct SqlSequenceStore {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl SqlSequenceStore {
    /// Creates a new store over the given pool.
    ///
    /// Increments are idempotent at the statement level, so transient
    /// contention failures are retried under `retry`.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        SqlSequenceStore { pool, retry }
    }
}

#[async_trait]
impl SequenceStore for SqlSequenceStore {
    async fn current(&self, prefix: &str) -> DbResult<Option<i64>> {
        let pool = &self.pool;
        self.retry
            .run(
                || async move {
                    let value: Option<i64> = sqlx::query_scalar(
                        "SELECT counter_value FROM sequence_counters WHERE prefix = ?1",
                    )
                    .bind(prefix)
                    .fetch_optional(pool)
                    .await
                    .map_err(DbError::from)?;
                    Ok(value)
                },
                DbError::is_transient,
            )
            .await
    }

    async fn next_value(&self, prefix: &str) -> DbResult<i64> {
        let pool = &self.pool;
        let value = self
            .retry
            .run(
                || async move {
                    // Single-statement read-increment-write: the database
                    // serializes concurrent increments, so no two callers
                    // see the same value.
                    sqlx::query_scalar::<_, i64>(
                        r#"
                        INSERT INTO sequence_counters (prefix, counter_value)
                        VALUES (?1, 1)
                        ON CONFLICT(prefix)
                        DO UPDATE SET counter_value = counter_value + 1
                        RETURNING counter_value
                        "#,
                    )
                    .bind(prefix)
                    .fetch_one(pool)
                    .await
                    .map_err(DbError::from)
                },
                DbError::is_transient,
            )
            .await?;

        debug!(prefix = %prefix, value = %value, "Issued sequence value");
        Ok(value)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-process sequence store for isolated test harnesses.
///
/// Counters start at 0 on every process start and are shared by nothing:
/// ids from this store are NOT unique across restarts or across multiple
/// instances. The mutex only makes concurrent access within one process
/// coherent.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    counters: Mutex<HashMap<String, i64>>,
}

impl MemorySequenceStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn current(&self, prefix: &str) -> DbResult<Option<i64>> {
        let counters = self.counters.lock().await;
        Ok(counters.get(prefix).copied())
    }

    async fn next_value(&self, prefix: &str) -> DbResult<i64> {
        let mut counters = self.counters.lock().await;
        let value = counters.entry(prefix.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

// =============================================================================
// Id Generator
// =============================================================================

/// Mints prefixed, zero-padded sequential ids from a counter store.
///
/// ## Example
/// ```rust,ignore
/// let ids = IdGenerator::sql(pool, retry);
/// let order_id = ids.next_id("TRX", 6).await?; // "TRX000124"
/// ```
#[derive(Clone)]
pub struct IdGenerator {
    store: Arc<dyn SequenceStore>,
}

impl IdGenerator {
    /// Creates a generator over any store implementation.
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        IdGenerator { store }
    }

    /// Generator backed by the persisted `sequence_counters` table.
    pub fn sql(pool: SqlitePool, retry: RetryPolicy) -> Self {
        IdGenerator::new(Arc::new(SqlSequenceStore::new(pool, retry)))
    }

    /// Generator backed by in-process counters (test harnesses only).
    pub fn in_memory() -> Self {
        IdGenerator::new(Arc::new(MemorySequenceStore::new()))
    }

    /// Mints the next id for a prefix, zero-padded to `digit_width`.
    ///
    /// A store failure here is fatal to the enclosing create operation:
    /// nothing may be persisted under a missing id.
    pub async fn next_id(&self, prefix: &str, digit_width: usize) -> DbResult<String> {
        let value = self.store.next_value(prefix).await?;
        Ok(format_sequential_id(prefix, value, digit_width))
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
