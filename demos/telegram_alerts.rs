//! Telegram demo: chat alerts with level wrappers and a request timeout
//!
//! Set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID to try it against a real bot;
//! without them the sink stays disabled and the run is a no-op.

use anyhow::Result;
use fanlog::{Level, LogContext, Logger, SinkSetting, TelegramSetting};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
    let chat_id: i64 = std::env::var("TELEGRAM_CHAT_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let logger = Logger::new();
    let settings: Vec<Box<dyn SinkSetting>> = vec![Box::new(TelegramSetting {
        enabled: !token.is_empty() && chat_id != 0,
        minimum_level: Level::Warning,
        use_level_wrappers: true,
        timeout_secs: Some(5), // wait at most 5 seconds per API request
        ..TelegramSetting::new(token.clone(), chat_id)
    })];
    logger.init(settings).await?;

    logger
        .warn(
            "Warning with 5s API timeout setting",
            Some(&LogContext::new().with("source", "telegram_alerts demo")),
        )
        .await;

    logger.stop().await;
    Ok(())
}
