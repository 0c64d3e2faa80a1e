//! Composite demo: console + file fan-out, error enrichment, panic recovery

use anyhow::Result;
use fanlog::{
    ConsoleSetting, FileSetting, Level, LogContext, LoggedError, Logger, SinkSetting,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // 1. Initialize the logger with multiple sinks
    let logger = Logger::new();
    let settings: Vec<Box<dyn SinkSetting>> = vec![
        Box::new(ConsoleSetting::default()),
        Box::new(FileSetting {
            minimum_level: Level::Warning,
            ..FileSetting::new("logs/app.log")
        }),
    ];
    logger.init(settings).await?;

    // 2. Simple logging
    logger
        .info(
            "Application started",
            Some(&LogContext::new().with("version", "1.0.0")),
        )
        .await;

    // 3. Error logging with automatic stack trace
    if let Err(err) = some_function_that_fails() {
        logger
            .error(
                "Operation failed",
                Some(
                    &LogContext::new()
                        .with("error", LoggedError::from_anyhow(&err))
                        .with("tags", vec!["critical", "database"]),
                ),
            )
            .await;
    }

    // 4. Recovering from panics
    let outcome = logger
        .recover(
            Some(&LogContext::new().with("component", "main_loop")),
            || {
                // panic!("something unexpected happened");
                "done"
            },
        )
        .await;
    logger
        .info(
            "Main loop finished",
            Some(&LogContext::new().with("outcome", outcome.unwrap_or("recovered"))),
        )
        .await;

    logger.stop().await;
    Ok(())
}

fn some_function_that_fails() -> Result<()> {
    Err(anyhow::anyhow!("database connection refused"))
}
