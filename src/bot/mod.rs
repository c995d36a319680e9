//! Conversation controller: binds Telegram updates to the collector.

pub mod handlers;
pub mod keyboards;
pub mod replies;
pub mod telegram;


use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::collector::{self, FfmpegTranscoder, PollinationsClient};
use crate::config::Config;

pub use handlers::{Controller, handler_tree};
pub use telegram::{ChatApi, TelegramClient};

/// The collector wired to production collaborators.
pub type Collector = collector::Collector<PollinationsClient, FfmpegTranscoder>;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "о проекте и начало записи")]
    Start,
    #[command(description = "показать это сообщение")]
    Help,
}

/// Everything handlers need, built once at startup.
pub struct BotState {
    pub config: Config,
    pub collector: Collector,
    pub telegram: TelegramClient,
}

impl BotState {
    pub fn new(config: Config, collector: Collector, bot: Bot) -> Self {
        Self {
            config,
            collector,
            telegram: TelegramClient::new(bot),
        }
    }

    pub fn controller(&self) -> Controller<'_, TelegramClient, PollinationsClient, FfmpegTranscoder> {
        Controller {
            chat: &self.telegram,
            collector: &self.collector,
            menu: &self.config.menu,
            playback: self.config.playback,
        }
    }
}
