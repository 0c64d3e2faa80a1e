//! Console demo: JSON lines with a warning threshold

use anyhow::Result;
use fanlog::{ConsoleSetting, Level, LineFormat, LogContext, Logger, SinkSetting};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let logger = Logger::new();
    let settings: Vec<Box<dyn SinkSetting>> = vec![Box::new(ConsoleSetting {
        minimum_level: Level::Warning,
        format: LineFormat::Json,
        ..ConsoleSetting::default()
    })];
    logger.init(settings).await?;

    // This will NOT be visible (level too low)
    logger.info("This info message is hidden", None).await;

    // These WILL be visible as JSON lines
    logger
        .warn(
            "Warning: resource limit reached",
            Some(&LogContext::new().with("usage", "95%")),
        )
        .await;
    logger.error("Error: operation failed", None).await;

    logger.stop().await;
    Ok(())
}
