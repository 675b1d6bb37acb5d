//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles `/start` and incoming photos
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::config::BrandingConfig;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::{photo_handler, start_handler};

// Re-export utility functions that might be used elsewhere
pub use message_handler::{enhance_photo, file_download_url, largest_photo};
pub use ui_builder::{main_menu_keyboard, welcome_message};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show the welcome menu")]
    Start,
}

/// Update routing: `/start`, photos and menu callbacks
///
/// Expects `Arc<Enhancer>` and `Arc<BrandingConfig>` among the dispatcher
/// dependencies.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let message_handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(|bot: Bot, msg: Message, cmd: Command, branding: Arc<BrandingConfig>| async move {
                    match cmd {
                        Command::Start => start_handler(bot, msg, branding).await,
                    }
                }),
        )
        .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(photo_handler));

    dptree::entry()
        .branch(message_handler)
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}
