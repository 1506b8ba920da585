//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and a [`Log`] context.
//!
//! [`LogLayer`] is a tracing-subscriber layer that forwards every event to a
//! [`Log`], using the event target as the tag. Tracing levels map onto
//! [`LogLevel`] as follows:
//!
//! | tracing | log     |
//! |---------|---------|
//! | TRACE   | Verbose |
//! | DEBUG   | Debug   |
//! | INFO    | Info    |
//! | WARN    | Warn    |
//! | ERROR   | Error   |
//!
//! Events below the context's gate are dropped before their fields are
//! visited.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{global, init_tracing};
//!
//! init_tracing(global());
//! tracing::warn!(target: "shell", "device went quiet");
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::LogLevel;
use crate::log::Log;

/// A tracing layer that dispatches events through a [`Log`].
#[derive(Clone, Debug)]
pub struct LogLayer {
    log: Arc<Log>,
}

impl LogLayer {
    /// Creates a layer that forwards into `log`.
    #[must_use]
    pub const fn new(log: Arc<Log>) -> Self {
        Self { log }
    }

    /// Returns the context events are forwarded into.
    #[must_use]
    pub const fn log(&self) -> &Arc<Log> {
        &self.log
    }

    /// Maps a tracing level onto a log level.
    #[must_use]
    pub const fn map_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Verbose,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl<S> Layer<S> for LogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::map_level(metadata.level());
        if !self.log.is_at_least(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.log.println(level, metadata.target(), &visitor.finish());
    }
}

/// Collects the `message` field followed by any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }
}

/// Installs a global subscriber that forwards every event into `log`.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(log: Arc<Log>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry().with(LogLayer::new(log)).init();
}

/// Installs a global subscriber that applies `filter` before forwarding into `log`.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{global, init_tracing_with_filter};
/// use tracing_subscriber::EnvFilter;
///
/// init_tracing_with_filter(global(), EnvFilter::from_default_env());
/// ```
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing_with_filter<F>(log: Arc<Log>, filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(LogLayer::new(log))
        .init();
}
