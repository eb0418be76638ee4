pub mod arguments;
pub mod chain;
pub mod deploy;
pub mod environment;
mod error;
pub mod interact;
pub mod record;
pub mod run;
pub mod store;

pub use error::Error;
