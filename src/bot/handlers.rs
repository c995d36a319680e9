//! Update handlers.
//!
//! Nothing here keeps conversation state: a pending prompt is a registry
//! record without audio.

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, FileId};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use crate::bot::keyboards::{PROMPT_CALLBACK, primary_menu, repeat_menu};
use crate::bot::replies;
use crate::bot::telegram::ChatApi;
use crate::bot::{BotState, Command};
use crate::collector::{self, IntakeOutcome, PromptSource, Transcoder, VoiceUpload};
use crate::config::MenuLabels;

/// Dispatch tree for all updates the bot reacts to.
pub fn handler_tree() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
                .branch(Message::filter_voice().endpoint(handle_voice)),
        )
        .branch(
            Update::filter_callback_query()
                .filter(|q: CallbackQuery| q.data.as_deref() == Some(PROMPT_CALLBACK))
                .endpoint(handle_prompt_request),
        )
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    info!("👋 {:?} from chat {}", cmd, msg.chat.id);
    state.controller().command(msg.chat.id, cmd).await;
    Ok(())
}

async fn handle_prompt_request(q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| q.from.id.into());
    let user_id = q.from.id.0 as i64;
    state.controller().prompt_request(q.id, chat_id, user_id).await;
    Ok(())
}

async fn handle_voice(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let (Some(user), Some(voice)) = (msg.from.as_ref(), msg.voice()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    info!("🎤 Voice message {} from user {}", msg.id.0, user_id);
    state
        .controller()
        .voice(msg.chat.id, user_id, msg.id.0, voice.file.id.clone())
        .await;
    Ok(())
}

/// Replies to each kind of update, independent of how updates arrive.
///
/// Send failures are logged by the client and otherwise ignored.
pub struct Controller<'a, C, P, T> {
    pub chat: &'a C,
    pub collector: &'a collector::Collector<P, T>,
    pub menu: &'a MenuLabels,
    /// Send a matched recording back to the user.
    pub playback: bool,
}

impl<C: ChatApi, P: PromptSource, T: Transcoder> Controller<'_, C, P, T> {
    pub async fn command(&self, chat_id: ChatId, cmd: Command) {
        let text = match cmd {
            Command::Start => replies::WELCOME.to_string(),
            Command::Help => format!("{}\n\n{}", replies::WELCOME, Command::descriptions()),
        };
        self.chat
            .send_message(chat_id, &text, Some(primary_menu(self.menu)))
            .await
            .ok();
    }

    pub async fn prompt_request(&self, query_id: CallbackQueryId, chat_id: ChatId, user_id: i64) {
        // Answer first so the button stops spinning while the text is generated.
        self.chat.answer_callback(query_id).await.ok();

        match self.collector.issue_prompt(user_id).await {
            Ok(record) => {
                self.chat.send_message(chat_id, replies::READ_ALOUD, None).await.ok();
                self.chat.send_message(chat_id, &record.text, None).await.ok();
            }
            Err(e) => {
                error!("Failed to issue prompt for user {}: {e}", user_id);
                self.chat
                    .send_message(chat_id, replies::PROMPT_FAILED, Some(primary_menu(self.menu)))
                    .await
                    .ok();
            }
        }
    }

    pub async fn voice(&self, chat_id: ChatId, user_id: i64, message_id: i32, file_id: FileId) {
        let menu = repeat_menu(self.menu);

        let file = match self.chat.download_voice(file_id).await {
            Ok(file) => file,
            Err(e) => {
                warn!("{e}");
                self.chat
                    .send_message(chat_id, replies::PROCESSING_FAILED, Some(menu))
                    .await
                    .ok();
                return;
            }
        };

        let upload = VoiceUpload {
            user_id,
            message_id,
            remote_path: file.remote_path,
        };
        let result = self.collector.intake_voice(&upload, &file.data).await;

        match &result {
            Ok(outcome @ IntakeOutcome::Matched { record_id, text, audio_path, .. }) => {
                info!(
                    "🗣 Message {} from user {} reads record {} \"{}\" ({:?})",
                    message_id, user_id, record_id, text, audio_path
                );
                if self.playback {
                    self.chat.send_voice_file(chat_id, outcome.raw_path()).await.ok();
                }
            }
            Ok(IntakeOutcome::Unmatched { .. }) => {}
            Err(e) => error!("Intake of message {} from user {} failed: {e}", message_id, user_id),
        }

        let reply = replies::intake_reply(&result);
        self.chat.send_message(chat_id, reply, None).await.ok();
        self.chat.send_message(chat_id, replies::TRY_AGAIN, Some(menu)).await.ok();
    }
}
