//! TelegramSink - ships events to a chat via the Bot API
//!
//! Detailed messages use MarkdownV2 with a fenced JSON context block; if a
//! detailed send fails the sink falls back to a plain-text message so the
//! alert still lands.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use validator::Validate;

use contracts::{Level, LogContext, LogError, LogSink};
use dispatcher::{SinkHandle, SinkSetting};

use crate::{default_queue_capacity, default_true};

/// Configuration for the telegram sink
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelegramSetting {
    /// Whether the sink is built at init time
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bot API token
    #[validate(length(min = 1, message = "bot token is not set"))]
    pub bot_token: String,
    /// Destination chat (may be negative for group chats, never zero)
    pub chat_id: i64,
    /// Severity floor
    #[serde(default)]
    pub minimum_level: Level,
    /// Decorate the title line with per-level wrapper symbols
    #[serde(default)]
    pub use_level_wrappers: bool,
    /// Per-level wrapper overrides (empty values keep the default)
    #[serde(default)]
    pub level_wrappers: BTreeMap<Level, String>,
    /// Per-level title overrides (default: uppercased level name)
    #[serde(default)]
    pub level_titles: BTreeMap<Level, String>,
    /// Bot API request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl TelegramSetting {
    /// Minimal setting: token + chat, defaults for everything else
    pub fn new(bot_token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            enabled: true,
            bot_token: bot_token.into(),
            chat_id,
            minimum_level: Level::Info,
            use_level_wrappers: false,
            level_wrappers: BTreeMap::new(),
            level_titles: BTreeMap::new(),
            timeout_secs: None,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SinkSetting for TelegramSetting {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn build(&self) -> Result<SinkHandle, LogError> {
        self.validate()
            .map_err(|e| LogError::configuration("telegram", e.to_string()))?;
        if self.chat_id == 0 {
            return Err(LogError::configuration("telegram", "chat id is not set"));
        }

        let sink = TelegramSink::new(self)?;
        Ok(SinkHandle::spawn(sink, self.minimum_level, self.queue_capacity))
    }
}

/// Default wrapper symbols per level
fn default_wrappers() -> BTreeMap<Level, String> {
    BTreeMap::from([
        (Level::Info, "\u{2139}\u{fe0f}\u{2139}\u{fe0f}".to_string()),
        (Level::Warning, "\u{26a0}\u{fe0f}\u{26a0}\u{fe0f}".to_string()),
        (Level::Error, "\u{203c}\u{fe0f}\u{203c}\u{fe0f}".to_string()),
        (Level::Fatal, "\u{1f6a8}\u{1f6a8}".to_string()),
    ])
}

/// Sink that posts events to a telegram chat
pub struct TelegramSink {
    name: String,
    client: reqwest::Client,
    api_url: String,
    chat_id: i64,
    use_level_wrappers: bool,
    level_wrappers: BTreeMap<Level, String>,
    level_titles: BTreeMap<Level, String>,
}

impl TelegramSink {
    /// Build the HTTP client and resolve wrapper/title tables
    ///
    /// # Errors
    /// Returns [`LogError::Configuration`] when the client cannot be built.
    pub fn new(setting: &TelegramSetting) -> Result<Self, LogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = setting.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LogError::configuration("telegram", e.to_string()))?;

        // Start from the defaults, then overlay non-empty user overrides
        let level_wrappers = if setting.use_level_wrappers {
            let mut wrappers = default_wrappers();
            for (level, wrapper) in &setting.level_wrappers {
                if !wrapper.is_empty() {
                    wrappers.insert(*level, wrapper.clone());
                }
            }
            wrappers
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            name: "telegram".to_string(),
            client,
            api_url: format!(
                "https://api.telegram.org/bot{}/sendMessage",
                setting.bot_token
            ),
            chat_id: setting.chat_id,
            use_level_wrappers: setting.use_level_wrappers,
            level_wrappers,
            level_titles: setting.level_titles.clone(),
        })
    }

    async fn send(
        &self,
        level: Level,
        message: &str,
        context: &LogContext,
    ) -> Result<(), LogError> {
        let text = self.format_markdown(level, message, context);

        if let Err(e) = self.post(&text, Some("MarkdownV2")).await {
            warn!(
                sink = %self.name,
                chat_id = self.chat_id,
                error = %e,
                "Detailed send failed, falling back to plain text"
            );

            let fallback = format!(
                "\u{26a0}\u{fe0f} [TelegramSink]\nFailed to send detailed log.\nError: {e}\nMessage: {message}"
            );
            self.post(&fallback, None).await.map_err(|fe| {
                LogError::sink_write(&self.name, format!("fallback send failed: {fe}"))
            })?;
        }

        Ok(())
    }

    async fn post(&self, text: &str, parse_mode: Option<&str>) -> Result<(), LogError> {
        let mut body = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LogError::sink_write(&self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LogError::sink_write(
                &self.name,
                format!("bot api returned {status}: {detail}"),
            ));
        }

        debug!(sink = %self.name, chat_id = self.chat_id, "Message sent");
        Ok(())
    }

    fn format_markdown(&self, level: Level, message: &str, context: &LogContext) -> String {
        let now = Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string();
        let json_context =
            serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());

        let title = self
            .level_titles
            .get(&level)
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| level.as_str().to_uppercase());

        let decoration = if self.use_level_wrappers {
            let wrapper = self
                .level_wrappers
                .get(&level)
                .map(String::as_str)
                .unwrap_or("");
            format!("{wrapper} *{title}* {wrapper}\n")
        } else {
            format!("*{title}*\n")
        };

        format!(
            "{decoration}{} {}\n\n```json\n{json_context}\n```",
            escape_markdown_v2(&now),
            escape_markdown_v2(message),
        )
    }
}

/// Escape the characters MarkdownV2 treats as syntax
fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '[' | ']' | '-' | '_' | '*' | '~' | '`' | '>' | '#' | '+' | '=' | '|' | '{' | '}'
                | '.' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl LogSink for TelegramSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.send(Level::Info, message, context).await
    }

    async fn warn(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.send(Level::Warning, message, context).await
    }

    async fn error(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.send(Level::Error, message, context).await
    }

    async fn fatal(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.send(Level::Fatal, message, context).await
    }

    async fn flush(&mut self) -> Result<(), LogError> {
        // Nothing buffered
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LogError> {
        debug!(sink = %self.name, "TelegramSink closed");
        Ok(())
    }
}
