//! This crate is intended to contain code that is required to provide or
//! improve the observability of the command line tools. That includes the
//! initialization logic for logging and the panic hook.
pub mod config;
pub mod tracing;

pub use config::Config;
