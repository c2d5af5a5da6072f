pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod process;
pub mod resolve;
pub mod schema;
pub mod session;
pub mod snapshot;
