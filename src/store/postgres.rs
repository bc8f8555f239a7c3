//! PostgreSQL-backed [`Store`].
//!
//! Expects an `accounts` table:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id       BIGSERIAL PRIMARY KEY,
//!     owner    TEXT      NOT NULL,
//!     balance  BIGINT    NOT NULL,
//!     currency TEXT      NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{Store, StoreError};
use crate::models::{Account, ListAccountsParams, NewAccount};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        debug!(account_id = id, "Fetching account");

        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency
            FROM accounts
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency
            FROM accounts
            ORDER BY id
            LIMIT $1
            OFFSET $2
            "#,
        )
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn create_account(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (owner, balance, currency)
            VALUES ($1, $2, $3)
            RETURNING id, owner, balance, currency
            "#,
        )
        .bind(&new_account.owner)
        .bind(new_account.balance)
        .bind(&new_account.currency)
        .fetch_one(&self.pool)
        .await?;

        debug!(account_id = account.id, "Account created");
        Ok(account)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
