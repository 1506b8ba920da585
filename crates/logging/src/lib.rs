#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` is the diagnostic logging facility shared by the devkit
//! workspace. Messages carry a [`LogLevel`], a free-form tag and a body, pass
//! through a level gate and fan out to every registered [`LogOutput`].
//!
//! # Design
//!
//! - [`Log`] owns the gate, the [`SinkRegistry`] and the hex dump switch. A
//!   process-wide instance is available through [`global`]; tests and
//!   embedders build their own.
//! - [`SinkRegistry`] holds the multiplexed sink set plus one legacy output
//!   slot. When neither is configured messages go to a console fallback.
//! - [`format_line`] renders `HH:MM:SS L/tag: message` and
//!   [`hex_dump_lines`] renders byte ranges as fixed-width dump lines.
//! - With the `tracing-bridge` feature, [`LogLayer`] forwards `tracing`
//!   events into a [`Log`].
//!
//! # Invariants
//!
//! - A message below the gate is never formatted and never reaches a sink.
//!   The prompt path used by [`Log::log_and_display`] is the one exception.
//! - Sinks are invoked from a snapshot, so a sink may add or remove sinks
//!   while it is being called.
//! - Logging never fails. Write errors inside sinks are swallowed.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging::{log_info, Log, LogConfig, LogLevel, WriterOutput};
//!
//! let log = Log::new(LogConfig::new().with_level(LogLevel::Info));
//! let sink = Arc::new(WriterOutput::new(Vec::new()));
//! log.add_logger(sink.clone());
//!
//! log_info!(log, "TAG", "{} + {}", 1, 2);
//! log.debug("TAG", "gated");
//! ```

mod config;
mod failure;
mod format;
mod level;
mod log;
mod macros;
mod output;
mod registry;
#[cfg(feature = "tracing-bridge")]
mod tracing_bridge;

pub use config::{HEX_DUMP_ENV, LEVEL_ENV, LogConfig};
pub use failure::render_failure;
pub use format::{
    ASCII_COLUMN, BYTES_PER_LINE, HEX_COLUMN, HEX_DUMP_LINE_WIDTH, HexDumpLines, format_line,
    format_line_at, hex_dump_lines,
};
pub use level::{LogLevel, ParseLevelError};
pub use log::{HEX_DUMP_TAG, Log, global, install_global};
pub use output::{ConsoleOutput, LogOutput, LogRecord, MemoryOutput, WriterOutput};
pub use registry::SinkRegistry;
#[cfg(feature = "tracing-bridge")]
pub use tracing_bridge::{LogLayer, init_tracing, init_tracing_with_filter};
