//! Update polling loop
//!
//! Long-polls getUpdates, parses commands, dispatches them to the handlers,
//! and sends the reply back to the originating chat.

use crate::logger::{self, LogTag};
use crate::telegram::bot::{MessageSender, TelegramBot};
use crate::telegram::commands::{self, Command, CommandContext};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::UpdateKind;
use teloxide::utils::command::BotCommands;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

/// Poll window passed to getUpdates, in seconds
const POLL_TIMEOUT_SECS: u32 = 10;

/// Backoff after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run the command-handling loop until shutdown is signalled.
pub async fn run(
    bot: Arc<TelegramBot>,
    bot_username: String,
    ctx: CommandContext,
    shutdown: Arc<Notify>,
) {
    logger::info(LogTag::Telegram, "Command polling started");

    let mut offset: i32 = 0;

    // Pinned outside the loop so a signal arriving mid-poll still lands
    let shutdown = shutdown.notified();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                logger::info(LogTag::Telegram, "Command polling shutting down");
                break;
            }
            _ = poll_once(&bot, &bot_username, &ctx, &mut offset) => {}
        }
    }
}

async fn poll_once(
    bot: &TelegramBot,
    bot_username: &str,
    ctx: &CommandContext,
    offset: &mut i32,
) {
    let mut request = bot.bot().get_updates().timeout(POLL_TIMEOUT_SECS);
    if *offset > 0 {
        request = request.offset(*offset);
    }

    let updates = match request.await {
        Ok(updates) => updates,
        Err(e) => {
            logger::warning(LogTag::Telegram, &format!("getUpdates failed: {}", e));
            sleep(POLL_RETRY_DELAY).await;
            return;
        }
    };

    for update in updates {
        // Advance past this update so it is never reprocessed
        *offset = update.id.0 as i32 + 1;

        let message = match update.kind {
            UpdateKind::Message(message) => message,
            _ => continue,
        };

        let chat_id = message.chat.id.0;
        let text = match message.text() {
            Some(text) => text,
            None => continue,
        };

        let reply = match Command::parse(text, bot_username) {
            Ok(command) => {
                logger::debug(
                    LogTag::Telegram,
                    &format!("Dispatching {:?} for chat {}", command, chat_id),
                );
                commands::dispatch(command, ctx, chat_id).await
            }
            // Anything unparseable gets the help hint
            Err(_) => "Unknown command. Type /help for the list of commands.".to_string(),
        };

        if let Err(e) = bot.send(chat_id, &reply).await {
            logger::warning(
                LogTag::Telegram,
                &format!("Failed to reply to chat {}: {}", chat_id, e),
            );
        }
    }
}
