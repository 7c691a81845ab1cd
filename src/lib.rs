pub mod config;
pub mod logger;
pub mod monitor;
pub mod probe;
pub mod status;
pub mod subscribers;
pub mod telegram;
