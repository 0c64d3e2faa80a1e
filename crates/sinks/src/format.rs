//! Shared line rendering for console and file sinks

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use contracts::{Level, LogContext};

/// Output format for line-oriented sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// Human-readable `key=value` line
    #[default]
    Text,
    /// Single-line JSON object
    Json,
}

/// Render one event as a line in the given format
///
/// Context values are normalized for rendering (errors collapse to their
/// short message, nested maps recurse).
pub fn render_line(format: LineFormat, level: Level, message: &str, context: &LogContext) -> String {
    match format {
        LineFormat::Text => render_text(level, message, context),
        LineFormat::Json => render_json(level, message, context),
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn render_text(level: Level, message: &str, context: &LogContext) -> String {
    let mut line = format!(
        "time={} level={} msg={}",
        timestamp(),
        level,
        json_scalar(&Value::String(message.to_string())),
    );

    for (key, value) in context.iter() {
        let rendered = serde_json::to_value(value).unwrap_or(Value::Null);
        line.push(' ');
        line.push_str(key);
        line.push('=');
        line.push_str(&json_scalar(&rendered));
    }

    line
}

// Bare words stay unquoted, anything else renders as compact JSON.
fn json_scalar(value: &Value) -> String {
    if let Value::String(s) = value {
        let plain = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':'));
        if plain {
            return s.clone();
        }
    }
    value.to_string()
}

fn render_json(level: Level, message: &str, context: &LogContext) -> String {
    let mut object = match serde_json::to_value(context) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    object.insert("time".to_string(), json!(timestamp()));
    object.insert("level".to_string(), json!(level.as_str()));
    object.insert("msg".to_string(), json!(message));

    Value::Object(object).to_string()
}
