use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use photo_enhancer::bot;
use photo_enhancer::config::BotConfig;
use photo_enhancer::enhancer::Enhancer;
use photo_enhancer::localization::init_localization;
use photo_enhancer::replicate::ReplicateClient;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting Photo Enhancer Telegram Bot");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error, set TELEGRAM_BOT_TOKEN and REPLICATE_API_TOKEN");
            return Err(e.into());
        }
    };

    init_localization();

    let mut bot = Bot::new(&config.telegram_token);
    if let Some(api_url) = config.telegram_api_url.clone() {
        bot = bot.set_api_url(api_url);
    }

    let inference = Arc::new(ReplicateClient::new(&config.replicate));
    let enhancer = Arc::new(Enhancer::new(inference, config.enhancement.clone()));
    let branding = Arc::new(config.branding.clone());

    info!(
        upscale_model = %enhancer.config().upscale_model,
        restore_model = %enhancer.config().restore_model,
        "Bot initialized, starting dispatcher"
    );

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![enhancer, branding])
        .default_handler(|update| async move {
            tracing::trace!(update_id = ?update.id, "Ignoring unhandled update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
