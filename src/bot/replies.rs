//! User-facing texts.

use crate::collector::{IntakeError, IntakeOutcome};

pub const WELCOME: &str = "🎙 Привет! TilDos — это исследовательский проект, цель которого — собрать \
разнообразные образцы казахской речи. Голоса участников помогут создать и обучить системы распознавания \
и синтеза речи на казахском языке, которые будут полезны детям и взрослым с особенностями речи \
(например, при ДЦП или аутизме).";

pub const READ_ALOUD: &str = "Отлично, пожалуйста озвучьте следующий текст на казахском языке:";

pub const PROMPT_FAILED: &str = "😔 Не удалось получить текст. Попробуйте ещё раз чуть позже.";

pub const SAVED: &str = "✅ Ваш голос успешно сохранен! Спасибо за вклад в проект!";

pub const NO_PENDING_PROMPT: &str = "⚠️ Запись сохранена, но у вас нет текста, ожидающего озвучки. \
Сначала получите новый текст кнопкой ниже, а затем отправьте голосовое сообщение.";

pub const PROCESSING_FAILED: &str = "😔 Не удалось обработать запись. Пожалуйста, отправьте голосовое \
сообщение ещё раз.";

pub const TRY_AGAIN: &str = "Хотите попробовать ещё?";

/// Acknowledgment for a finished intake.
pub fn intake_reply(result: &Result<IntakeOutcome, IntakeError>) -> &'static str {
    match result {
        Ok(IntakeOutcome::Matched { .. }) => SAVED,
        Ok(IntakeOutcome::Unmatched { .. }) => NO_PENDING_PROMPT,
        Err(_) => PROCESSING_FAILED,
    }
}
