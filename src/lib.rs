pub mod config;
pub mod events;
pub mod schedule;
pub mod session;
pub mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
