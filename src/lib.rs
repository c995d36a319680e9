//! TilDos: a Telegram bot collecting read-aloud Kazakh speech samples.

pub mod bot;
pub mod collector;
pub mod config;
pub mod telegram_log;
