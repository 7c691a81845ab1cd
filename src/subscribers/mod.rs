//! Subscriber persistence
//!
//! SQLite-backed table of Telegram subscribers with their notification
//! preference and the last verdict each one was told about. The store handle
//! is constructed once at startup and shared by the monitor task and the
//! command path.

pub mod db;

pub use db::{Subscriber, SubscriberDb};
