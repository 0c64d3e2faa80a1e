//! File demo: size rotation with pruning and gzip compression

use anyhow::Result;
use fanlog::{FileSetting, LogContext, Logger, SinkSetting};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let logger = Logger::new();
    let settings: Vec<Box<dyn SinkSetting>> = vec![Box::new(FileSetting {
        max_size_mb: Some(10),  // rotate when the file reaches 10 MB
        max_backups: Some(5),   // keep up to 5 old log files
        max_age_days: Some(7),  // retain old logs for 7 days
        compress: true,         // gzip old log files
        ..FileSetting::new("logs/rotated.log")
    })];
    logger.init(settings).await?;

    logger
        .info(
            "Logging with rotation enabled",
            Some(
                &LogContext::new()
                    .with("max_size_mb", 10)
                    .with("backups", 5),
            ),
        )
        .await;

    logger.stop().await;
    Ok(())
}
