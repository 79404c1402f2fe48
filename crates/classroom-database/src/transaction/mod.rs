//! Per-request transactions.
//!
//! A [`RequestTransaction`] is opened once per inbound request and settled
//! exactly once. `commit` and `rollback` consume the handle, so a second
//! settle does not compile; a handle dropped without being settled rolls
//! back in `Drop`. [`TransactionStats`] counts every transition so the
//! invariant can be observed from the outside.

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use classroom_core::config::{DatabaseBackend, DatabaseConfig};
use classroom_core::error::{AppError, ErrorKind};

pub use self::memory::{MemoryDatabase, MemoryTransaction};

/// Failures while opening or settling a request transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The backing store could not open a transaction.
    #[error("failed to open transaction: {0}")]
    Open(#[source] sqlx::Error),
    /// Commit failed; the transaction was aborted.
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),
    /// Rollback failed; the connection was discarded.
    #[error("failed to roll back transaction: {0}")]
    Rollback(#[source] sqlx::Error),
    /// A staged write no longer fits the committed state.
    #[error("write conflict on commit: {0}")]
    Conflict(String),
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Conflict(detail) => {
                AppError::conflict(detail).with_reason("write_conflict")
            }
            TransactionError::Open(_) => {
                let message = err.to_string();
                AppError::with_source(ErrorKind::Transaction, message, err)
                    .with_reason("transaction_open")
            }
            TransactionError::Commit(_) | TransactionError::Rollback(_) => {
                let message = err.to_string();
                AppError::with_source(ErrorKind::Transaction, message, err)
                    .with_reason("transaction_close")
            }
        }
    }
}

/// Counters for every transaction opened by one [`Database`].
#[derive(Debug, Default)]
pub struct TransactionStats {
    opened: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

/// A point-in-time copy of [`TransactionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub opened: u64,
    pub committed: u64,
    pub rolled_back: u64,
}

impl StatsSnapshot {
    /// Transactions opened but not yet settled.
    pub fn open(&self) -> u64 {
        self.opened
            .saturating_sub(self.committed)
            .saturating_sub(self.rolled_back)
    }
}

impl TransactionStats {
    /// Read all three counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        // Settled counters first so `open()` never underflows mid-update.
        let committed = self.committed.load(Ordering::Acquire);
        let rolled_back = self.rolled_back.load(Ordering::Acquire);
        let opened = self.opened.load(Ordering::Acquire);
        StatsSnapshot {
            opened,
            committed,
            rolled_back,
        }
    }

    fn record_open(&self) -> u64 {
        self.opened.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::AcqRel);
    }

    fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone)]
enum Store {
    Postgres(PgPool),
    Memory(MemoryDatabase),
}

/// Entry point for opening request transactions.
#[derive(Debug, Clone)]
pub struct Database {
    store: Store,
    stats: Arc<TransactionStats>,
}

impl Database {
    /// Wrap an existing PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            store: Store::Postgres(pool),
            stats: Arc::default(),
        }
    }

    /// Create an empty process-local store.
    pub fn memory() -> Self {
        Self {
            store: Store::Memory(MemoryDatabase::default()),
            stats: Arc::default(),
        }
    }

    /// Build the backend selected in configuration, running migrations
    /// against PostgreSQL when enabled.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let pool = crate::connection::connect_pool(config).await?;
                if config.run_migrations {
                    crate::migration::run_migrations(&pool).await?;
                }
                Ok(Self::postgres(pool))
            }
            DatabaseBackend::Memory => {
                warn!("Using the in-memory store; all data is lost on shutdown");
                Ok(Self::memory())
            }
        }
    }

    /// Open a transaction that may stay open for at most `deadline`.
    pub async fn begin(&self, deadline: Duration) -> Result<RequestTransaction, TransactionError> {
        let backend = match &self.store {
            Store::Postgres(pool) => TxBackend::Postgres(postgres::begin(pool, deadline).await?),
            Store::Memory(db) => TxBackend::Memory(db.begin()),
        };
        let id = self.stats.record_open();
        debug!(tx_id = id, "Transaction opened");
        Ok(RequestTransaction {
            id,
            backend: Some(backend),
            stats: Arc::clone(&self.stats),
        })
    }

    /// Shared counters for this database.
    pub fn stats(&self) -> Arc<TransactionStats> {
        Arc::clone(&self.stats)
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        match self.store {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    /// Close the underlying pool, if any.
    pub async fn close(&self) {
        if let Store::Postgres(pool) = &self.store {
            pool.close().await;
            debug!("Database pool closed");
        }
    }
}

/// Backend-specific transaction state.
pub(crate) enum TxBackend {
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
    Memory(MemoryTransaction),
}

/// A transaction bound to one request.
///
/// Every repository call takes `&mut RequestTransaction`, so no persistent
/// read or write can bypass it.
pub struct RequestTransaction {
    id: u64,
    backend: Option<TxBackend>,
    stats: Arc<TransactionStats>,
}

impl std::fmt::Debug for RequestTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTransaction")
            .field("id", &self.id)
            .field("open", &self.backend.is_some())
            .finish()
    }
}

impl RequestTransaction {
    /// Sequence number of this transaction within its [`Database`].
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Make every write durable.
    ///
    /// On failure the transaction is aborted and still counted as settled.
    pub async fn commit(mut self) -> Result<(), TransactionError> {
        let Some(backend) = self.backend.take() else {
            return Ok(());
        };
        let result = match backend {
            TxBackend::Postgres(tx) => tx.commit().await.map_err(TransactionError::Commit),
            TxBackend::Memory(tx) => tx.commit().await,
        };
        match &result {
            Ok(()) => {
                self.stats.record_commit();
                debug!(tx_id = self.id, "Transaction committed");
            }
            Err(e) => {
                self.stats.record_rollback();
                warn!(tx_id = self.id, error = %e, "Commit failed, transaction aborted");
            }
        }
        result
    }

    /// Discard every write.
    pub async fn rollback(mut self) -> Result<(), TransactionError> {
        let Some(backend) = self.backend.take() else {
            return Ok(());
        };
        let result = match backend {
            TxBackend::Postgres(tx) => tx.rollback().await.map_err(TransactionError::Rollback),
            TxBackend::Memory(tx) => {
                tx.discard();
                Ok(())
            }
        };
        self.stats.record_rollback();
        debug!(tx_id = self.id, "Transaction rolled back");
        result
    }

    /// Round-trip to the store.
    pub async fn ping(&mut self) -> Result<(), AppError> {
        match self.backend_mut()? {
            TxBackend::Postgres(tx) => sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&mut **tx)
                .await
                .map(|_| ())
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Ping failed", e)),
            TxBackend::Memory(_) => Ok(()),
        }
    }

    pub(crate) fn backend_mut(&mut self) -> Result<&mut TxBackend, AppError> {
        self.backend
            .as_mut()
            .ok_or_else(|| AppError::transaction("Transaction already settled"))
    }
}

impl Drop for RequestTransaction {
    fn drop(&mut self) {
        if let Some(backend) = self.backend.take() {
            // sqlx queues a ROLLBACK when an open transaction is dropped.
            match backend {
                TxBackend::Postgres(tx) => drop(tx),
                TxBackend::Memory(tx) => tx.discard(),
            }
            self.stats.record_rollback();
            warn!(tx_id = self.id, "Transaction dropped unsettled, rolled back");
        }
    }
}
