//! Errors surfaced by the bot binary.

use warden_common::WardenError;
use warden_framework::FrameworkError;

/// Startup and runtime failures of the bot.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Invalid configuration or framework options.
    #[error("Configuration error: {0}")]
    Config(#[from] WardenError),

    /// Gateway or HTTP failure.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Framework lifecycle error.
    #[error("Framework error: {0}")]
    Framework(#[from] FrameworkError),

    /// A platform call was made before the gateway delivered its ready event.
    #[error("Gateway is not connected yet")]
    NotConnected,
}

/// Result alias for [`BotError`].
pub type BotResult<T> = Result<T, BotError>;
