use std::{env, io::Write};

use chrono::{SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{json, Value};

const DEFAULT_SERVICE: &str = "radio-playlist-rs";

/// Severity, ordered from most to least important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Level::Error,
            "warn" | "warning" => Level::Warn,
            "debug" | "trace" => Level::Debug,
            _ => Level::Info,
        }
    }
}

/// One JSON object per line: `timestamp`, `service`, `env`, `host`, `level`,
/// `event`, then the caller's context fields.
pub struct Logger {
    service: String,
    env: String,
    host: String,
    threshold: Level,
}

static LOGGER: OnceCell<Logger> = OnceCell::new();

pub fn init_logger(service: &str) -> &'static Logger {
    LOGGER.get_or_init(|| Logger::from_env(service))
}

/// The process logger; falls back to the crate name when `init_logger` was
/// never called (library use and tests).
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::from_env(DEFAULT_SERVICE))
}

impl Logger {
    fn from_env(service: &str) -> Self {
        let env = env::var("APP_ENV")
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| "development".into());
        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .or_else(|| env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "unknown".into());
        let threshold = env::var("LOG_LEVEL")
            .map(|raw| Level::parse(&raw))
            .unwrap_or(Level::Info);

        Self {
            service: service.to_string(),
            env,
            host,
            threshold,
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level <= self.threshold
    }

    fn render<T: Serialize>(&self, level: Level, event: &str, context: T) -> String {
        let mut line = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "service": self.service,
            "env": self.env,
            "host": self.host,
            "level": level.label(),
            "event": event,
        });
        if let Value::Object(fields) = &mut line {
            match serde_json::to_value(context) {
                Ok(Value::Object(extra)) => fields.extend(extra),
                Ok(Value::Null) | Err(_) => {}
                Ok(scalar) => {
                    fields.insert("context".into(), scalar);
                }
            }
        }
        line.to_string()
    }

    fn log<T: Serialize>(&self, level: Level, event: &str, context: T) {
        if !self.enabled(level) {
            return;
        }
        let line = self.render(level, event, context);
        // A closed stdout or stderr is ignored.
        let _ = if level <= Level::Warn {
            writeln!(std::io::stderr().lock(), "{line}")
        } else {
            writeln!(std::io::stdout().lock(), "{line}")
        };
    }

    pub fn debug<T: Serialize>(&self, event: &str, context: T) {
        self.log(Level::Debug, event, context);
    }

    pub fn info<T: Serialize>(&self, event: &str, context: T) {
        self.log(Level::Info, event, context);
    }

    pub fn warn<T: Serialize>(&self, event: &str, context: T) {
        self.log(Level::Warn, event, context);
    }

    pub fn error<T: Serialize>(&self, event: &str, context: T) {
        self.log(Level::Error, event, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_logger(threshold: Level) -> Logger {
        Logger {
            service: "test".into(),
            env: "test".into(),
            host: "localhost".into(),
            threshold,
        }
    }

    #[test]
    fn render_merges_object_context() {
        let line = test_logger(Level::Info).render(
            Level::Info,
            "validation.progress",
            json!({ "completed": 50, "total": 120 }),
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "validation.progress");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["completed"], 50);
        assert_eq!(parsed["service"], "test");
    }

    #[test]
    fn render_wraps_scalar_context() {
        let line = test_logger(Level::Info).render(Level::Warn, "note", "plain");
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["context"], "plain");
        assert_eq!(parsed["level"], "warn");
    }

    #[test]
    fn threshold_filters_lower_levels() {
        let logger = test_logger(Level::Warn);
        assert!(logger.enabled(Level::Error));
        assert!(logger.enabled(Level::Warn));
        assert!(!logger.enabled(Level::Info));
        assert_eq!(Level::parse(" WARNING "), Level::Warn);
        assert_eq!(Level::parse("verbose"), Level::Info);
    }
}
