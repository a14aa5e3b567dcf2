//! Command implementations.

pub mod config;
pub mod extract;
pub mod fields;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::fields::execute_fields;
