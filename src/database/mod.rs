use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;

pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let database_url = config.database_url.as_str();

    if !(database_url.contains("sslmode=require")
        || database_url.contains("sslmode=verify-ca")
        || database_url.contains("sslmode=verify-full"))
    {
        if config.is_production() {
            warn!("Database connection does not enforce SSL. Consider adding sslmode=require to connection string");
        } else {
            info!("Database SSL not enforced");
        }
    }

    let statement_timeout_ms = config.store_timeout_ms;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(180))
        .max_lifetime(Duration::from_secs(900))
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET timezone = 'UTC'").execute(&mut *conn).await?;
                // Server-side backstop for the per-call deadline
                let statement_timeout =
                    format!("SET statement_timeout = '{}ms'", statement_timeout_ms);
                sqlx::query(&statement_timeout).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    let start_time = Instant::now();
    sqlx::query("SELECT 1").execute(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        statement_timeout_ms,
        "Database connection established in {:?}",
        start_time.elapsed()
    );

    Ok(pool)
}
