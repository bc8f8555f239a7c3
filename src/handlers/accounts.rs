//! Account handlers
//!
//! `GET /accounts/{account_id}`, `GET /accounts`, `POST /accounts`

use std::future::Future;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use tracing::{debug, info};
use validator::Validate;

use crate::error::Result;
use crate::handlers::extractors::AccountId;
use crate::handlers::response::Created;
use crate::middleware::metrics::track_store_operation;
use crate::models::{Account, CreateAccountRequest, ListAccountsQuery, NewAccount};
use crate::store::StoreError;
use crate::AppState;

/// Run one store call under the configured deadline.
///
/// An expired deadline drops the in-flight call and reports
/// [`StoreError::Timeout`].
async fn call_store<T, F>(
    state: &AppState,
    operation: &'static str,
    call: F,
) -> std::result::Result<T, StoreError>
where
    F: Future<Output = std::result::Result<T, StoreError>>,
{
    let outcome = match tokio::time::timeout(state.config.store_timeout(), call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    };

    track_store_operation(
        operation,
        match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        },
    );

    outcome
}

/// Get a single account by id
/// GET /accounts/{account_id}
#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i64, Path, description = "Positive account id")
    ),
    responses(
        (status = 200, description = "Account found", body = Account),
        (status = 400, description = "Account id is not a positive integer"),
        (status = 404, description = "No account with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    AccountId(id): AccountId,
) -> Result<Json<Account>> {
    let account = call_store(&state, "get_account", state.store.get_account(id)).await?;

    debug!(account_id = account.id, "Account fetched");
    Ok(Json(account))
}

/// List accounts, one page at a time
/// GET /accounts?page_id=1&page_size=5
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "accounts",
    params(ListAccountsQuery),
    responses(
        (status = 200, description = "Page of accounts ordered by id", body = Vec<Account>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListAccountsQuery>, QueryRejection>,
) -> Result<Json<Vec<Account>>> {
    let Query(query) = query?;
    query.validate()?;

    let accounts = call_store(
        &state,
        "list_accounts",
        state.store.list_accounts(query.to_params()),
    )
    .await?;

    debug!(
        page_id = query.page_id,
        page_size = query.page_size,
        count = accounts.len(),
        "Accounts listed"
    );
    Ok(Json(accounts))
}

/// Open a new account with a zero balance
/// POST /accounts
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Missing owner or currency"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Created<Account>> {
    let Json(request) = payload?;
    request.validate()?;

    let new_account = NewAccount::from(request);
    let account = call_store(
        &state,
        "create_account",
        state.store.create_account(new_account),
    )
    .await?;

    info!(
        account_id = account.id,
        currency = %account.currency,
        "Account created"
    );
    Ok(Created(account))
}
