//! Engine log hook.
//!
//! The engine reports what it is doing through a [`LogSink`]. The default
//! sink forwards to `tracing`; embedders can swap in their own (a UI panel, a
//! test recorder) with [`Engine::with_log_sink`](crate::Engine::with_log_sink).
//! Logging never affects results.

use std::fmt;

/// Category of an engine log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Process,
    Success,
    Warning,
    Error,
    Input,
    Data,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Process => "process",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Input => "input",
            LogLevel::Data => "data",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for engine log messages.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, level: LogLevel);
}

impl<F> LogSink for F
where
    F: Fn(&str, LogLevel) + Send + Sync,
{
    fn log(&self, message: &str, level: LogLevel) {
        self(message, level)
    }
}

/// Forwards engine messages to `tracing` events, tagged with a `kind` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, level: LogLevel) {
        let kind = level.as_str();
        match level {
            LogLevel::Error => tracing::error!(kind, "{message}"),
            LogLevel::Warning => tracing::warn!(kind, "{message}"),
            LogLevel::Info | LogLevel::Success => tracing::info!(kind, "{message}"),
            LogLevel::Process | LogLevel::Input | LogLevel::Data => {
                tracing::debug!(kind, "{message}")
            }
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _message: &str, _level: LogLevel) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str, level: LogLevel| {
            seen.lock().unwrap().push((message.to_string(), level));
        };
        sink.log("hello", LogLevel::Input);
        LogSink::log(&sink, "bye", LogLevel::Success);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("hello".to_string(), LogLevel::Input),
                ("bye".to_string(), LogLevel::Success)
            ]
        );
    }

    #[test]
    fn level_names() {
        assert_eq!(LogLevel::Warning.to_string(), "warning");
        assert_eq!(LogLevel::Data.as_str(), "data");
    }

    #[test]
    fn builtin_sinks_accept_every_level() {
        for level in [
            LogLevel::Info,
            LogLevel::Process,
            LogLevel::Success,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Input,
            LogLevel::Data,
        ] {
            TracingSink.log("message", level);
            NoopSink.log("message", level);
        }
    }
}
