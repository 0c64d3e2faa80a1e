//! # Integration Tests
//!
//! End-to-end tests across the facade, engine, and sinks.
//!
//! Covers:
//! - Fan-out, prefixing, and per-sink severity filtering
//! - FIFO delivery order and backpressure behavior
//! - Stack-trace enrichment and context immutability
//! - Lifecycle: reinit routing, zero-config init, stop semantics
//! - Panic recovery

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};

    use contracts::{ContextValue, Level, LogContext, LogError, LogSink, LoggedError};
    use dispatcher::{SinkHandle, SinkSetting};
    use fanlog::Logger;

    /// One delivered event, as a sink saw it
    #[derive(Debug, Clone)]
    struct Call {
        level: Level,
        message: String,
        context: LogContext,
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    /// Sink that records every delivery for later assertions
    struct RecordingSink {
        name: String,
        calls: CallLog,
    }

    impl RecordingSink {
        fn record(&mut self, level: Level, message: &str, context: &LogContext) {
            self.calls.lock().unwrap().push(Call {
                level,
                message: message.to_string(),
                context: context.clone(),
            });
        }
    }

    impl LogSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn info(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
            self.record(Level::Info, message, context);
            Ok(())
        }

        async fn warn(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
            self.record(Level::Warning, message, context);
            Ok(())
        }

        async fn error(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
            self.record(Level::Error, message, context);
            Ok(())
        }

        async fn fatal(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
            self.record(Level::Fatal, message, context);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), LogError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), LogError> {
            Ok(())
        }
    }

    /// Setting producing a recording sink
    struct RecordingSetting {
        name: String,
        minimum_level: Level,
        enabled: bool,
        queue_capacity: usize,
        calls: CallLog,
    }

    impl RecordingSetting {
        fn new(name: &str) -> (Self, CallLog) {
            Self::with_level(name, Level::Info)
        }

        fn with_level(name: &str, minimum_level: Level) -> (Self, CallLog) {
            let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    minimum_level,
                    enabled: true,
                    queue_capacity: 16,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl SinkSetting for RecordingSetting {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn build(&self) -> Result<SinkHandle, LogError> {
            let sink = RecordingSink {
                name: self.name.clone(),
                calls: Arc::clone(&self.calls),
            };
            Ok(SinkHandle::spawn(sink, self.minimum_level, self.queue_capacity))
        }
    }

    /// Setting that always fails to build
    struct BrokenSetting;

    impl SinkSetting for BrokenSetting {
        fn build(&self) -> Result<SinkHandle, LogError> {
            Err(LogError::configuration("broken", "missing required token"))
        }
    }

    fn messages(calls: &CallLog) -> Vec<String> {
        calls.lock().unwrap().iter().map(|c| c.message.clone()).collect()
    }

    #[tokio::test]
    async fn test_info_fans_out_with_prefix() {
        let logger = Logger::new();
        let (s1, calls1) = RecordingSetting::new("sink1");
        let (s2, calls2) = RecordingSetting::new("sink2");
        logger
            .init([Box::new(s1) as Box<dyn SinkSetting>, Box::new(s2) as _])
            .await
            .unwrap();

        let ctx = LogContext::new().with("requestId", "abc-123");
        logger.info("process started", Some(&ctx)).await;
        logger.stop().await;

        assert_eq!(messages(&calls1), vec!["[INFO] process started"]);
        assert_eq!(messages(&calls2), vec!["[INFO] process started"]);

        let recorded = calls1.lock().unwrap();
        assert_eq!(recorded[0].level, Level::Info);
        assert_eq!(
            recorded[0].context.get("requestId").and_then(ContextValue::as_str),
            Some("abc-123")
        );
    }

    #[tokio::test]
    async fn test_warn_prefix_and_context() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("warned");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        logger
            .warn("slow response", Some(&LogContext::new().with("task", "poll")))
            .await;
        logger.stop().await;

        assert_eq!(messages(&calls), vec!["[WARNING] slow response"]);
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0].level, Level::Warning);
        assert_eq!(
            recorded[0].context.get("task").and_then(ContextValue::as_str),
            Some("poll")
        );
    }

    #[tokio::test]
    async fn test_error_adds_fallback_stack_trace_and_never_mutates_input() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("errors");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let input_ctx = LogContext::new()
            .with("error", LoggedError::new("plain error"))
            .with("taskType", "poll");
        let keys_before: Vec<String> = input_ctx.keys().cloned().collect();

        logger.error("failed", Some(&input_ctx)).await;
        logger.stop().await;

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "[ERROR] failed");
        assert_eq!(
            recorded[0].context.get("taskType").and_then(ContextValue::as_str),
            Some("poll")
        );

        let trace = recorded[0]
            .context
            .get("stackTrace")
            .and_then(ContextValue::as_str)
            .expect("stack trace expected");
        assert!(!trace.is_empty());
        assert!(trace.contains(':'), "trace should carry a source-location marker");

        // The caller's map is untouched
        let keys_after: Vec<String> = input_ctx.keys().cloned().collect();
        assert_eq!(keys_before, keys_after);
        assert!(!input_ctx.contains_key("stackTrace"));
    }

    #[tokio::test]
    async fn test_fatal_fans_out_with_stack_trace() {
        let logger = Logger::new();
        let (s1, calls1) = RecordingSetting::new("f1");
        let (s2, calls2) = RecordingSetting::new("f2");
        logger
            .init([Box::new(s1) as Box<dyn SinkSetting>, Box::new(s2) as _])
            .await
            .unwrap();

        logger
            .fatal("critical failure", Some(&LogContext::new().with("service", "scheduler")))
            .await;
        logger.stop().await;

        for calls in [&calls1, &calls2] {
            let recorded = calls.lock().unwrap();
            assert_eq!(recorded.len(), 1);
            assert_eq!(recorded[0].message, "[FATAL] critical failure");
            assert!(recorded[0].context.contains_key("stackTrace"));
        }
    }

    #[tokio::test]
    async fn test_existing_stack_trace_wins() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("pre");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let ctx = LogContext::new()
            .with("error", LoggedError::new("plain"))
            .with("stackTrace", "precomputed-stack");
        logger.error("failed", Some(&ctx)).await;
        logger.stop().await;

        let recorded = calls.lock().unwrap();
        assert_eq!(
            recorded[0].context.get("stackTrace").and_then(ContextValue::as_str),
            Some("precomputed-stack")
        );
    }

    #[tokio::test]
    async fn test_embedded_error_trace_wins_over_synthesis() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("embedded");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let ctx = LogContext::new().with(
            "error",
            LoggedError::with_detail("wrapped error", "embedded-stack-line-1\nembedded-stack-line-2"),
        );
        logger.error("failed", Some(&ctx)).await;
        logger.stop().await;

        let recorded = calls.lock().unwrap();
        assert_eq!(
            recorded[0].context.get("stackTrace").and_then(ContextValue::as_str),
            Some("embedded-stack-line-1\nembedded-stack-line-2")
        );
    }

    #[tokio::test]
    async fn test_min_level_filtering() {
        let logger = Logger::new();
        let (verbose, verbose_calls) = RecordingSetting::with_level("verbose", Level::Info);
        let (alerts, alert_calls) = RecordingSetting::with_level("alerts", Level::Error);
        logger
            .init([Box::new(verbose) as Box<dyn SinkSetting>, Box::new(alerts) as _])
            .await
            .unwrap();

        logger.info("i", None).await;
        logger.warn("w", None).await;
        logger.error("e", None).await;
        logger.fatal("f", None).await;
        logger.stop().await;

        assert_eq!(
            messages(&verbose_calls),
            vec!["[INFO] i", "[WARNING] w", "[ERROR] e", "[FATAL] f"]
        );
        assert_eq!(messages(&alert_calls), vec!["[ERROR] e", "[FATAL] f"]);
    }

    #[tokio::test]
    async fn test_fifo_order_per_sink() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("ordered");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        for i in 0..50 {
            logger.info(&format!("event-{i}"), None).await;
        }
        logger.stop().await;

        let expected: Vec<String> = (0..50).map(|i| format!("[INFO] event-{i}")).collect();
        assert_eq!(messages(&calls), expected);
    }

    #[tokio::test]
    async fn test_backpressure_loses_nothing() {
        let logger = Logger::new();
        // Queue far smaller than the burst; submit must block, never drop
        let (mut setting, calls) = RecordingSetting::new("pressured");
        setting.queue_capacity = 2;
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        for i in 0..500 {
            logger.info(&format!("{i}"), None).await;
        }
        logger.stop().await;

        assert_eq!(calls.lock().unwrap().len(), 500);
    }

    #[tokio::test]
    async fn test_reinit_routes_only_to_fresh_instance() {
        let logger = Logger::new();

        let (setting_a, calls_a) = RecordingSetting::new("a");
        logger.init([Box::new(setting_a) as Box<dyn SinkSetting>]).await.unwrap();
        logger.info("x", None).await;

        let (setting_b, calls_b) = RecordingSetting::new("b");
        logger.init([Box::new(setting_b) as Box<dyn SinkSetting>]).await.unwrap();
        logger.info("y", None).await;

        logger.stop().await;

        assert_eq!(messages(&calls_a), vec!["[INFO] x"]);
        assert_eq!(messages(&calls_b), vec!["[INFO] y"]);
    }

    #[tokio::test]
    async fn test_disabled_setting_is_never_built() {
        let logger = Logger::new();
        let (mut disabled, disabled_calls) = RecordingSetting::new("disabled");
        disabled.enabled = false;
        let (enabled, enabled_calls) = RecordingSetting::new("enabled");

        logger
            .init([Box::new(disabled) as Box<dyn SinkSetting>, Box::new(enabled) as _])
            .await
            .unwrap();
        logger.info("only one sink", None).await;
        logger.stop().await;

        assert!(disabled_calls.lock().unwrap().is_empty());
        assert_eq!(enabled_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_config_init_is_a_complete_noop() {
        let logger = Logger::new();
        logger.init([]).await.unwrap();
        logger.info("test", None).await;
        logger.stop().await;
    }

    #[tokio::test]
    async fn test_configuration_error_aborts_init() {
        let logger = Logger::new();
        let (good, good_calls) = RecordingSetting::new("good");

        let err = logger
            .init([Box::new(good) as Box<dyn SinkSetting>, Box::new(BrokenSetting) as _])
            .await
            .unwrap_err();
        assert!(matches!(err, LogError::Configuration { .. }));

        // Failed init leaves the handle without a running instance
        logger.info("dropped", None).await;
        logger.stop().await;
        assert!(good_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logging_after_stop_is_dropped() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("stopped");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        logger.info("before", None).await;
        logger.stop().await;
        logger.info("after", None).await;

        assert_eq!(messages(&calls), vec!["[INFO] before"]);
    }

    #[tokio::test]
    async fn test_recover_logs_panic_as_fatal() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("recovering");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let result: Option<()> = logger
            .recover(Some(&LogContext::new().with("component", "test")), || {
                panic!("something went wrong")
            })
            .await;
        assert!(result.is_none());
        logger.stop().await;

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].level, Level::Fatal);
        assert_eq!(recorded[0].message, "[FATAL] Panic recovered");
        assert_eq!(
            recorded[0].context.get("panic").and_then(ContextValue::as_str),
            Some("something went wrong")
        );

        match recorded[0].context.get("ctx") {
            Some(ContextValue::Map(inner)) => {
                assert_eq!(
                    inner.get("component").and_then(ContextValue::as_str),
                    Some("test")
                );
            }
            other => panic!("expected nested ctx map, got {other:?}"),
        }

        let trace = recorded[0]
            .context
            .get("stackTrace")
            .and_then(ContextValue::as_str)
            .expect("stack trace expected");
        assert!(!trace.is_empty());
    }

    #[tokio::test]
    async fn test_recover_with_nil_context() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("nilctx");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let result: Option<()> = logger.recover(None, || panic!("panic with nil ctx")).await;
        assert!(result.is_none());
        logger.stop().await;

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "[FATAL] Panic recovered");
    }

    #[tokio::test]
    async fn test_recover_without_panic_logs_nothing() {
        let logger = Logger::new();
        let (setting, calls) = RecordingSetting::new("calm");
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        let result = logger.recover(None, || "fine").await;
        assert_eq!(result, Some("fine"));
        logger.stop().await;

        assert!(calls.lock().unwrap().is_empty());
    }
}

#[cfg(test)]
mod file_e2e_tests {
    use contracts::LogContext;
    use dispatcher::SinkSetting;
    use fanlog::Logger;
    use sinks::FileSetting;

    #[tokio::test]
    async fn test_facade_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e2e.log");

        let logger = Logger::new();
        let setting = FileSetting::new(path.to_string_lossy().into_owned());
        logger.init([Box::new(setting) as Box<dyn SinkSetting>]).await.unwrap();

        logger
            .info("first", Some(&LogContext::new().with("seq", 1)))
            .await;
        logger.warn("second", None).await;
        logger.stop().await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] first"));
        assert!(lines[1].contains("[WARNING] second"));
    }
}
