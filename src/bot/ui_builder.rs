//! UI Builder module for creating keyboards and formatting messages
//!
//! Texts sent with `ParseMode::MarkdownV2` are escaped here; plain-text
//! replies are returned as-is.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::markdown::{bold, escape};

use crate::config::BrandingConfig;
use crate::localization::{t_args_lang, t_lang};

/// Callback payload of the "send a photo" menu button
pub const SEND_PHOTO_CALLBACK: &str = "send_photo";

/// Welcome text for `/start` (MarkdownV2)
pub fn welcome_message(branding: &BrandingConfig, language_code: Option<&str>) -> String {
    format!(
        "👋 {}\n\n🪄 {}\n\n✨ {}",
        bold(&escape(&t_lang("welcome-title", language_code))),
        escape(&t_lang("welcome-description", language_code)),
        escape(&t_args_lang(
            "welcome-credits",
            &[("credit", &branding.credit_handle)],
            language_code
        ))
    )
}

/// Two-button menu shown under the welcome text
pub fn main_menu_keyboard(branding: &BrandingConfig, language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            t_lang("menu-send-photo", language_code),
            SEND_PHOTO_CALLBACK,
        )],
        vec![InlineKeyboardButton::url(
            t_args_lang("menu-follow", &[("credit", &branding.credit_handle)], language_code),
            branding.credit_url.clone(),
        )],
    ])
}

/// Caption attached to an enhanced photo (MarkdownV2)
pub fn enhanced_caption(branding: &BrandingConfig, language_code: Option<&str>) -> String {
    format!(
        "✨ {}\n\n🧠 {}\n👤 {}",
        bold(&escape(&t_lang("caption-title", language_code))),
        escape(&t_args_lang(
            "caption-powered-by",
            &[("bot", &branding.bot_username)],
            language_code
        )),
        escape(&t_args_lang(
            "caption-credits",
            &[("credit", &branding.credit_handle)],
            language_code
        ))
    )
}

/// Plain-text error reply naming the failure detail
pub fn processing_error_message(detail: &str, language_code: Option<&str>) -> String {
    t_args_lang("error-processing", &[("detail", detail)], language_code)
}

/// Reply to a menu button press, if the button asks for one
pub fn callback_prompt(data: Option<&str>, language_code: Option<&str>) -> Option<String> {
    match data {
        Some(SEND_PHOTO_CALLBACK) => Some(t_lang("send-photo-prompt", language_code)),
        _ => None,
    }
}
