//! Telegram bot instance management

use crate::logger::{self, LogTag};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Outbound delivery capability consumed by the change notifier and the
/// polling loop. Implemented by `TelegramBot`; tests substitute a mock.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), String>;
}

/// Thin wrapper around the teloxide Bot
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    pub fn new(token: &str) -> Result<Self, String> {
        if token.is_empty() {
            return Err("Bot token is empty".to_string());
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Validate the token by calling getMe. Returns the bot username.
    pub async fn validate(&self) -> Result<String, String> {
        match self.bot.get_me().await {
            Ok(me) => {
                let username = me.username.clone().unwrap_or_else(|| "unknown".to_string());
                logger::info(
                    LogTag::Telegram,
                    &format!("Bot initialized: @{} (ID: {})", username, me.id),
                );
                Ok(username)
            }
            Err(e) => Err(format!("Invalid bot token: {}", e)),
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl MessageSender for TelegramBot {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), String> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        logger::debug(
            LogTag::Telegram,
            &format!("Sent message to chat {} (length={})", chat_id, text.len()),
        );

        Ok(())
    }
}
