//! Telegram client using teloxide.

use std::future::Future;
use std::path::Path;

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, FileId, InlineKeyboardMarkup, InputFile, MessageId};
use tracing::{info, warn};

/// A downloaded voice message.
#[derive(Debug, Clone)]
pub struct VoiceFile {
    pub data: Vec<u8>,
    /// Path of the file on Telegram's side, e.g. `voice/file_12.oga`.
    pub remote_path: String,
}

/// The Telegram calls the handlers make.
pub trait ChatApi: Send + Sync {
    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> impl Future<Output = Result<MessageId, String>> + Send;

    /// Stop the client-side spinner on a pressed inline button.
    fn answer_callback(&self, query_id: CallbackQueryId) -> impl Future<Output = Result<(), String>> + Send;

    fn download_voice(&self, file_id: FileId) -> impl Future<Output = Result<VoiceFile, String>> + Send;

    /// Send a local audio file back as a voice message.
    fn send_voice_file(&self, chat_id: ChatId, path: &Path) -> impl Future<Output = Result<MessageId, String>> + Send;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChatApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId, String> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }

        request.await.map(|msg| msg.id).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn answer_callback(&self, query_id: CallbackQueryId) -> Result<(), String> {
        self.bot
            .answer_callback_query(query_id)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to answer callback: {e}");
                warn!("{}", msg);
                msg
            })
    }

    async fn download_voice(&self, file_id: FileId) -> Result<VoiceFile, String> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("📥 Downloaded voice ({} bytes, {})", data.len(), file.path);
        Ok(VoiceFile {
            data,
            remote_path: file.path,
        })
    }

    async fn send_voice_file(&self, chat_id: ChatId, path: &Path) -> Result<MessageId, String> {
        info!("🔊 Sending {:?} to chat {}", path, chat_id);

        self.bot
            .send_voice(chat_id, InputFile::file(path))
            .await
            .map(|msg| msg.id)
            .map_err(|e| {
                let msg = format!("Failed to send voice: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
