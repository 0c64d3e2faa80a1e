//! Stack-trace enrichment for error-level events
//!
//! Decides, for every error/fatal event, what diagnostic trace to attach:
//! a pre-existing `stackTrace` entry wins, then an expanded rendering
//! carried by an `error` entry, then a synthesized capture of the current
//! call stack.

use backtrace::Backtrace;

use contracts::{ContextValue, LogContext};

/// Context key carrying the diagnostic trace
pub const STACK_TRACE_KEY: &str = "stackTrace";
/// Context key inspected for an error with an expanded rendering
pub const ERROR_KEY: &str = "error";

const MAX_FRAMES: usize = 48;

/// Frames from these namespaces never appear in a synthesized trace; the
/// trace starts at the caller's code, not the engine's internals.
const ENGINE_NAMESPACES: &[&str] = &[
    "fanlog::",
    "dispatcher::",
    "contracts::",
    "sinks::",
    "backtrace::",
];

/// Return a copy of `context` guaranteed to carry a `stackTrace` entry when
/// one can be determined
///
/// The input is never mutated. Never panics; if no trace can be captured at
/// all, the copy is returned without a trace key.
pub fn enrich_error_context(context: Option<&LogContext>) -> LogContext {
    let mut enriched = context.cloned().unwrap_or_default();

    if has_stack_trace(&enriched) {
        return enriched;
    }

    let trace = trace_from_error(&enriched).or_else(synthesize_trace);
    if let Some(trace) = trace {
        enriched.insert(STACK_TRACE_KEY, trace);
    }

    enriched
}

fn has_stack_trace(context: &LogContext) -> bool {
    context
        .get(STACK_TRACE_KEY)
        .and_then(ContextValue::as_str)
        .is_some_and(|trace| !trace.is_empty())
}

/// An error entry whose expanded rendering is richer than its short message
/// supplies the trace (callers propagating a wrapped error keep its stack)
fn trace_from_error(context: &LogContext) -> Option<String> {
    context
        .get(ERROR_KEY)?
        .as_error()?
        .expanded_trace()
        .map(str::to_string)
}

/// Capture the current call stack, skipping the engine's own frames
fn synthesize_trace() -> Option<String> {
    let captured = Backtrace::new();
    let mut lines = Vec::new();

    'frames: for frame in captured.frames() {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else { continue };
            let function = name.to_string();
            if !should_include_frame(&function) {
                continue;
            }

            let location = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => format!("{}:{line}", file.display()),
                _ => "<unknown>:0".to_string(),
            };

            lines.push(format!("{function}\n\t{location}"));
            if lines.len() >= MAX_FRAMES {
                break 'frames;
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn should_include_frame(function: &str) -> bool {
    !ENGINE_NAMESPACES.iter().any(|ns| function.contains(ns))
}
