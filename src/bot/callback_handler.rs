//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, error};

use super::ui_builder::callback_prompt;

/// Handle callback queries from the main menu keyboard
///
/// Every query is acknowledged, even when sending the prompt failed.
pub async fn callback_handler(bot: Bot, q: CallbackQuery) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    let language_code = q.from.language_code.as_deref();

    let prompt_result = match (callback_prompt(q.data.as_deref(), language_code), &q.message) {
        (Some(prompt), Some(msg)) => bot.send_message(msg.chat().id, prompt).await.map(|_| ()),
        _ => Ok(()),
    };

    if let Err(e) = &prompt_result {
        error!(user_id = %q.from.id, error = %e, "Failed to send photo prompt");
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    prompt_result?;
    Ok(())
}
