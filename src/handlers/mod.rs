pub mod accounts;
pub mod extractors;
pub mod health;
pub mod metrics;
pub mod response;

// Re-export commonly used types
pub use extractors::{AccountId, ValidatedAccountId};
pub use response::Created;
