//! crates/logging/src/config.rs
//! Start-up configuration for a [`Log`](crate::Log) context.

use crate::level::LogLevel;

/// Environment variable holding the initial gate level (name or letter).
pub const LEVEL_ENV: &str = "DEVKIT_LOG_LEVEL";
/// Environment variable enabling hex dump output.
pub const HEX_DUMP_ENV: &str = "DEVKIT_LOG_HEXDUMP";

/// Settings a [`Log`](crate::Log) is created with.
///
/// The gate level can be changed later through
/// [`Log::set_level`](crate::Log::set_level); the hex dump switch is fixed for
/// the lifetime of the context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    /// Minimum level that is dispatched.
    pub level: LogLevel,
    /// Whether [`Log::hex_dump`](crate::Log::hex_dump) emits anything.
    pub hex_dump: bool,
}

impl LogConfig {
    /// Returns the defaults: gate at [`LogLevel::Error`], hex dumps off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: LogLevel::Error,
            hex_dump: false,
        }
    }

    /// Sets the gate level.
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Enables or disables hex dumps.
    #[must_use]
    pub const fn with_hex_dump(mut self, enabled: bool) -> Self {
        self.hex_dump = enabled;
        self
    }

    /// Reads [`LEVEL_ENV`] and [`HEX_DUMP_ENV`] from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults. Unparseable values also keep the
    /// defaults and are reported through `tracing`.
    ///
    /// ```
    /// use logging::{LogConfig, LogLevel};
    ///
    /// let config = LogConfig::from_lookup(|key| match key {
    ///     "DEVKIT_LOG_LEVEL" => Some("debug".to_owned()),
    ///     "DEVKIT_LOG_HEXDUMP" => Some("1".to_owned()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.level, LogLevel::Debug);
    /// assert!(config.hex_dump);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(LEVEL_ENV) {
            match value.parse::<LogLevel>() {
                Ok(level) => config.level = level,
                Err(error) => {
                    tracing::warn!(variable = LEVEL_ENV, %error, "ignoring log level override");
                }
            }
        }

        if let Some(value) = lookup(HEX_DUMP_ENV) {
            match parse_switch(&value) {
                Some(enabled) => config.hex_dump = enabled,
                None => {
                    tracing::warn!(variable = HEX_DUMP_ENV, value = %value, "ignoring hex dump switch");
                }
            }
        }

        config
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
