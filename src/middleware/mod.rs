// Middleware module - logging and metrics

pub mod metrics;
pub mod request_logger;

pub use self::metrics::metrics_middleware;
pub use self::request_logger::{current_request_id, request_logger_middleware};
