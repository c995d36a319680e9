use std::path::PathBuf;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use tildos::bot::{BotState, Command, handler_tree};
use tildos::collector::{AudioStorage, Collector, FfmpegTranscoder, PollinationsClient, RegistryStore};
use tildos::config::Config;
use tildos::telegram_log::TelegramLogLayer;

fn fatal(msg: impl std::fmt::Display) -> ! {
    error!("{msg}");
    eprintln!("{msg}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())
        .unwrap_or_else(|e| fatal(format!("Failed to load config: {e}")));

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("tildos.log"))
        .unwrap_or_else(|e| fatal(format!("Failed to open log file: {e}")));
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        registry.with(TelegramLogLayer::new(bot.clone(), log_chat_id)).init();
    } else {
        registry.init();
    }

    info!("🚀 Starting tildos...");
    match &config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config path given, using defaults"),
    }
    info!(
        "Audio in {:?} (partition by date: {}), playback: {}",
        config.audio_dir, config.partition_by_date, config.playback
    );

    let registry = RegistryStore::open(&config.registry_path)
        .await
        .unwrap_or_else(|e| fatal(format!("Failed to open registry: {e}")));
    if let Err(e) = tokio::fs::create_dir_all(&config.audio_dir).await {
        fatal(format!("Failed to create audio dir {:?}: {e}", config.audio_dir));
    }
    let prompts = PollinationsClient::new(config.prompt_endpoint.clone(), config.prompt_instruction.clone())
        .unwrap_or_else(|e| fatal(format!("Failed to build prompt client: {e}")));
    let collector = Collector::new(
        registry,
        AudioStorage::new(config.audio_dir.clone(), config.partition_by_date),
        prompts,
        FfmpegTranscoder::new(config.ffmpeg_path.clone()),
    );

    match collector.registry().load().await {
        Ok(records) => info!(
            "Registry holds {} records, {} pending",
            records.len(),
            records.iter().filter(|r| r.is_pending()).count()
        ),
        Err(e) => fatal(format!("Failed to read registry: {e}")),
    }

    let me = bot
        .get_me()
        .await
        .unwrap_or_else(|e| fatal(format!("Failed to get bot info (check BOT_TOKEN): {e}")));
    info!("Bot user ID: {}, username: @{}", me.id, me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let state = Arc::new(BotState::new(config, collector, bot.clone()));

    Dispatcher::builder(bot, handler_tree())
        .dependencies(dptree::deps![state, me])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("👋 Stopped");
}
