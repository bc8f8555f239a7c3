//! Account persistence boundary.
//!
//! Handlers only ever see the [`Store`] trait. Two implementations exist:
//! - [`PgStore`]: PostgreSQL via sqlx, used by the running service
//! - [`InMemoryStore`]: DashMap-backed double with call counters and fault
//!   injection, used by the API tests

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, ListAccountsParams, NewAccount};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Failure kinds a store can report.
///
/// `NoRows` is the only kind callers treat as "absent"; every other kind is
/// an infrastructure failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no rows in result set")]
    NoRows,

    #[error("store operation timed out")]
    Timeout,

    #[error("connection is already closed")]
    ConnectionClosed,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::NoRows)
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NoRows => "no_rows",
            StoreError::Timeout => "timeout",
            StoreError::ConnectionClosed => "connection_closed",
            StoreError::Database(_) => "database",
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NoRows,
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::PoolClosed => StoreError::ConnectionClosed,
            other => StoreError::Database(other),
        }
    }
}

/// Account storage capability injected into the HTTP layer.
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one account by primary key. Returns [`StoreError::NoRows`] when
    /// no account has that id.
    async fn get_account(&self, id: i64) -> Result<Account, StoreError>;

    /// Accounts ordered by id, windowed by `params`
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError>;

    /// Insert an account and return it with its assigned id
    async fn create_account(&self, new_account: NewAccount) -> Result<Account, StoreError>;

    /// Cheap liveness probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}
