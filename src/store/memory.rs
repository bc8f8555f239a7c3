//! In-memory [`Store`] used as a test double.
//!
//! Besides holding accounts, it counts calls per operation, remembers which
//! ids were requested, and can simulate a closed connection or a slow
//! backend so the HTTP layer's error classification can be exercised.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::{Store, StoreError};
use crate::models::{Account, ListAccountsParams, NewAccount};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: DashMap<i64, Account>,
    last_id: AtomicI64,
    get_calls: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    requested_ids: Mutex<Vec<i64>>,
    connection_closed: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.insert(account);
        }
        store
    }

    /// Seed an account as-is, keeping its id
    pub fn insert(&self, account: Account) {
        self.last_id.fetch_max(account.id, Ordering::SeqCst);
        self.accounts.insert(account.id, account);
    }

    /// Every subsequent call fails with [`StoreError::ConnectionClosed`]
    pub fn close_connection(&self) {
        self.connection_closed.store(true, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    pub fn get_account_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn list_accounts_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_account_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to `get_account`, in call order
    pub async fn requested_ids(&self) -> Vec<i64> {
        self.requested_ids.lock().await.clone()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    async fn simulate_backend(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.connection_closed.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_ids.lock().await.push(id);
        self.simulate_backend().await?;

        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NoRows)
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_backend().await?;

        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);

        let offset = usize::try_from(params.offset).unwrap_or(0);
        let limit = usize::try_from(params.limit).unwrap_or(0);
        Ok(accounts.into_iter().skip(offset).take(limit).collect())
    }

    async fn create_account(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_backend().await?;

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let account = Account {
            id,
            owner: new_account.owner,
            balance: new_account.balance,
            currency: new_account.currency,
        };
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.simulate_backend().await
    }
}
