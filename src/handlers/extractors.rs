//! Path parameter extraction and validation.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// Validated account id helper
///
/// Parses the raw `accountId` path segment. Only strictly positive 64-bit
/// integers are valid lookup keys.
///
/// # Example
/// ```ignore
/// let id = ValidatedAccountId::parse("7")?;
/// ```
pub struct ValidatedAccountId;

impl ValidatedAccountId {
    pub fn parse(raw: &str) -> Result<i64, ApiError> {
        let id: i64 = raw.parse().map_err(|_| {
            ApiError::validation_field("account_id", format!("Invalid account id: {}", raw))
        })?;

        if id <= 0 {
            return Err(ApiError::validation_field(
                "account_id",
                "Account id must be a positive integer",
            ));
        }

        Ok(id)
    }
}

/// Extractor for the `{account_id}` path segment.
///
/// Rejects with a 400 [`ApiError`] before the handler body runs, so an
/// invalid id never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub i64);

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        ValidatedAccountId::parse(&raw).map(AccountId)
    }
}
