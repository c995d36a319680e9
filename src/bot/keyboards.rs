//! Inline menus.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::config::MenuLabels;

/// Callback data of the "give me a text" button.
pub const PROMPT_CALLBACK: &str = "voice_get";

/// Shown under the welcome message.
pub fn primary_menu(labels: &MenuLabels) -> InlineKeyboardMarkup {
    prompt_button(&labels.request_prompt)
}

/// Shown after a recording, offering another round.
pub fn repeat_menu(labels: &MenuLabels) -> InlineKeyboardMarkup {
    prompt_button(&labels.request_again)
}

fn prompt_button(label: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        label.to_string(),
        PROMPT_CALLBACK.to_string(),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn only_button(markup: &InlineKeyboardMarkup) -> &InlineKeyboardButton {
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
        &markup.inline_keyboard[0][0]
    }

    #[test]
    fn test_both_menus_request_a_prompt() {
        let labels = MenuLabels::default();
        for (markup, label) in [
            (primary_menu(&labels), &labels.request_prompt),
            (repeat_menu(&labels), &labels.request_again),
        ] {
            let button = only_button(&markup);
            assert_eq!(&button.text, label);
            assert!(matches!(
                &button.kind,
                InlineKeyboardButtonKind::CallbackData(data) if data == PROMPT_CALLBACK
            ));
        }
    }
}
