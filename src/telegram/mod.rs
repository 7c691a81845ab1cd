//! Telegram integration
//!
//! Bot wrapper, command handlers, and the update polling loop. Outbound
//! delivery goes through the `MessageSender` trait so the notifier can be
//! exercised without a live bot.

pub mod bot;
pub mod commands;
pub mod polling;

pub use bot::{MessageSender, TelegramBot};
pub use commands::{Command, CommandContext};
