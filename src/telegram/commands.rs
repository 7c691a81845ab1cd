//! Bot command handlers
//!
//! One handler per command, each returning the reply text. Internal failures
//! never leak raw errors to the chat - the user always gets a readable
//! message.

use crate::logger::{self, LogTag};
use crate::probe::{Endpoint, EndpointProber};
use crate::status::{self, formatters};
use crate::subscribers::SubscriberDb;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;

/// Generic reply for internal failures
const GENERIC_FAILURE: &str =
    "❌ Something went wrong on our side. Please try again in a moment.";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Register and show the welcome message
    Start,
    /// Check endpoint reachability right now
    Status,
    /// Enable automatic change notifications
    Notify,
    /// Disable automatic change notifications
    Mute,
    /// Unsubscribe and delete stored data
    Stop,
    /// Show available commands
    Help,
}

/// Shared state handed to every command handler
pub struct CommandContext {
    pub db: Arc<SubscriberDb>,
    pub prober: Arc<EndpointProber>,
    pub endpoints: Vec<Endpoint>,
}

/// Route a parsed command to its handler
pub async fn dispatch(command: Command, ctx: &CommandContext, chat_id: i64) -> String {
    match command {
        Command::Start => handle_start(&ctx.db, chat_id).await,
        Command::Status => handle_status(&ctx.prober, &ctx.endpoints).await,
        Command::Notify => handle_notify(&ctx.db, chat_id).await,
        Command::Mute => handle_mute(&ctx.db, chat_id).await,
        Command::Stop => handle_stop(&ctx.db, chat_id).await,
        Command::Help => handle_help(),
    }
}

/// Handle /start - idempotent registration
pub async fn handle_start(db: &SubscriberDb, chat_id: i64) -> String {
    match db.upsert(chat_id) {
        Ok(()) => {
            logger::info(LogTag::Telegram, &format!("Registered chat {}", chat_id));
            "👋 <b>Welcome to Callwatch!</b>\n\n\
             I keep an eye on the calling service's infrastructure.\n\n\
             Use /status for an on-demand check.\n\
             Use /notify to get a message whenever the service health changes.\n\
             Type /help for all commands."
                .to_string()
        }
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to register chat {}: {:#}", chat_id, e),
            );
            GENERIC_FAILURE.to_string()
        }
    }
}

/// Handle /status - run a probe cycle now and report it
pub async fn handle_status(prober: &EndpointProber, endpoints: &[Endpoint]) -> String {
    let snapshot = status::check_now(prober, endpoints).await;
    formatters::format_report(&snapshot)
}

/// Handle /notify - enable auto notifications
pub async fn handle_notify(db: &SubscriberDb, chat_id: i64) -> String {
    match db.set_auto_notify(chat_id, true) {
        Ok(true) => "🔔 <b>Notifications enabled</b>\n\n\
                     You will get a message whenever the service health changes."
            .to_string(),
        Ok(false) => "You are not registered yet. Send /start first.".to_string(),
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to enable notifications for {}: {:#}", chat_id, e),
            );
            GENERIC_FAILURE.to_string()
        }
    }
}

/// Handle /mute - disable auto notifications
pub async fn handle_mute(db: &SubscriberDb, chat_id: i64) -> String {
    match db.set_auto_notify(chat_id, false) {
        Ok(true) => "🔕 <b>Notifications disabled</b>\n\n\
                     You can still check the service with /status."
            .to_string(),
        Ok(false) => "You are not registered yet. Send /start first.".to_string(),
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to disable notifications for {}: {:#}", chat_id, e),
            );
            GENERIC_FAILURE.to_string()
        }
    }
}

/// Handle /stop - delete the subscriber row
pub async fn handle_stop(db: &SubscriberDb, chat_id: i64) -> String {
    match db.delete(chat_id) {
        Ok(true) => {
            logger::info(LogTag::Telegram, &format!("Unsubscribed chat {}", chat_id));
            "👋 <b>Unsubscribed</b>\n\n\
             Your data has been deleted. Send /start to come back any time."
                .to_string()
        }
        Ok(false) => "You were not registered.".to_string(),
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to unsubscribe chat {}: {:#}", chat_id, e),
            );
            GENERIC_FAILURE.to_string()
        }
    }
}

/// Handle /help
pub fn handle_help() -> String {
    "📟 <b>Callwatch Commands</b>\n\n\
     /start - register\n\
     /status - check endpoint reachability now\n\
     /notify - enable change notifications\n\
     /mute - disable change notifications\n\
     /stop - unsubscribe and delete stored data\n\
     /help - show this message"
        .to_string()
}
