pub mod billing;
pub mod cache;
pub mod commands;
pub mod config;
pub mod costs;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod test_utils;

pub use config::Config;
pub use server::Server;
