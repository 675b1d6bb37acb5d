//! # Photo Enhancer Telegram Bot
//!
//! A Telegram bot that takes a user's photo, upscales it and restores faces
//! through a hosted inference service, and replies with the enhanced image.

pub mod bot;
pub mod config;
pub mod enhanced_image;
pub mod enhancer;
pub mod inference;
pub mod inference_errors;
pub mod localization;
pub mod replicate;
