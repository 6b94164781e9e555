//! Shared helpers: date-time parsing, logging and test fixtures.

pub mod date;
pub mod logging;
pub mod test;

pub use date::parse_date_time;
pub use logging::{log_operation_complete, log_operation_start, log_warning};
