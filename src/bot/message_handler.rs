//! Message Handler module for processing incoming Telegram messages

use anyhow::{anyhow, Result};
use reqwest::Url;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, PhotoSize, ReplyParameters};
use tracing::{debug, error, info};

use crate::config::BrandingConfig;
use crate::enhanced_image::EnhancedImage;
use crate::enhancer::Enhancer;
use crate::inference_errors::redact_bot_tokens;
use crate::localization::t_lang;

use super::ui_builder::{enhanced_caption, main_menu_keyboard, processing_error_message, welcome_message};

/// Direct download URL of a file on the Bot API server
///
/// Telegram keeps these links valid for at least one hour.
pub fn file_download_url(api_url: &Url, token: &str, file_path: &str) -> String {
    format!(
        "{}/file/bot{}/{}",
        api_url.as_str().trim_end_matches('/'),
        token,
        file_path
    )
}

/// Pick the highest-resolution variant of a photo
pub fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos
        .iter()
        .max_by_key(|photo| u64::from(photo.width) * u64::from(photo.height))
}

fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// Handle `/start`: welcome text plus the main menu
pub async fn start_handler(bot: Bot, msg: Message, branding: Arc<BrandingConfig>) -> Result<()> {
    let language_code = language_code(&msg);
    debug!(user_id = %msg.chat.id, "Received /start from user");

    bot.send_message(msg.chat.id, welcome_message(&branding, language_code))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(main_menu_keyboard(&branding, language_code))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Resolve the photo of a message and run it through the pipeline
pub async fn enhance_photo(bot: &Bot, msg: &Message, enhancer: &Enhancer) -> Result<EnhancedImage> {
    let photo = msg
        .photo()
        .and_then(largest_photo)
        .ok_or_else(|| anyhow!("message has no photo"))?;

    let file = bot.get_file(photo.file.id.clone()).await?;
    debug!(
        user_id = %msg.chat.id,
        file_path = %file.path,
        width = photo.width,
        height = photo.height,
        "Resolved photo file"
    );

    let image_url = file_download_url(&bot.api_url(), bot.token(), &file.path);
    let enhancement = enhancer.enhance(&image_url).await?;
    info!(
        user_id = %msg.chat.id,
        restored = enhancement.restored,
        "Enhancement pipeline finished"
    );

    Ok(EnhancedImage::from_output(&enhancement.output)?)
}

/// Handle an incoming photo
///
/// Sends a placeholder, enhances the photo, replies with the result or the
/// error detail, then removes the placeholder.
pub async fn photo_handler(
    bot: Bot,
    msg: Message,
    enhancer: Arc<Enhancer>,
    branding: Arc<BrandingConfig>,
) -> Result<()> {
    let language_code = language_code(&msg);
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    let status = bot
        .send_message(msg.chat.id, t_lang("processing-photo", language_code))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    let outcome = async {
        let image = enhance_photo(&bot, &msg, &enhancer).await?;
        bot.send_photo(msg.chat.id, image.into_input_file())
            .caption(enhanced_caption(&branding, language_code))
            .parse_mode(ParseMode::MarkdownV2)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;

    let reply_result = match outcome {
        Ok(()) => {
            info!(user_id = %msg.chat.id, "Enhanced photo sent");
            Ok(())
        }
        Err(e) => {
            let detail = redact_bot_tokens(&e.to_string());
            error!(user_id = %msg.chat.id, error = %detail, "Photo processing failed for user");
            bot.send_message(msg.chat.id, processing_error_message(&detail, language_code))
                .reply_parameters(ReplyParameters::new(msg.id))
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from)
        }
    };

    // Placeholder removal is non-critical cleanup
    if let Err(e) = bot.delete_message(status.chat.id, status.id).await {
        debug!(user_id = %msg.chat.id, error = %e, "Failed to delete processing message");
    }

    reply_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_download_url() {
        let api_url = Url::parse("https://api.telegram.org").unwrap();
        assert_eq!(
            file_download_url(&api_url, "123:ABC", "photos/file_7.jpg"),
            "https://api.telegram.org/file/bot123:ABC/photos/file_7.jpg"
        );
    }

    #[test]
    fn test_file_download_url_with_custom_server() {
        let api_url = Url::parse("http://127.0.0.1:8081/").unwrap();
        assert_eq!(
            file_download_url(&api_url, "t", "a.jpg"),
            "http://127.0.0.1:8081/file/bott/a.jpg"
        );
    }
}
