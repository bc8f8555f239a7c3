use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A bank account as stored and as sent over the wire.
///
/// The JSON field names are part of the public API and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

/// Insert payload handed to the store when opening an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

/// Limit/offset window for paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListAccountsParams {
    pub limit: i64,
    pub offset: i64,
}

/// Request to open a new account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    /// Display name of the account holder
    #[validate(length(min = 1, message = "owner is required"))]
    pub owner: String,

    /// Currency code, e.g. "USD"
    #[validate(length(min = 1, message = "currency is required"))]
    pub currency: String,
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        Self {
            owner: req.owner,
            balance: 0,
            currency: req.currency,
        }
    }
}

/// Query string for `GET /accounts`
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAccountsQuery {
    /// 1-based page number
    #[validate(range(min = 1, message = "page_id must be at least 1"))]
    pub page_id: i32,

    /// Accounts per page
    #[validate(range(min = 5, max = 10, message = "page_size must be between 5 and 10"))]
    pub page_size: i32,
}

impl ListAccountsQuery {
    pub fn to_params(&self) -> ListAccountsParams {
        let limit = i64::from(self.page_size);
        ListAccountsParams {
            limit,
            offset: (i64::from(self.page_id) - 1) * limit,
        }
    }
}
