// Data models and DTOs
// Database rows, API request/response models

pub mod account;

pub use account::{Account, CreateAccountRequest, ListAccountsParams, ListAccountsQuery, NewAccount};
