//! crates/logging/src/failure.rs
//! Rendering of error values into log message bodies.

use std::error::Error;
use std::fmt::Write as _;

/// Renders `failure` as its message followed by its full textual trace.
///
/// The trace is the error's `Debug` rendering followed by one
/// `Caused by: ...` line for every entry of its [`Error::source`] chain.
///
/// ```
/// use std::io;
/// use logging::render_failure;
///
/// let error = io::Error::new(io::ErrorKind::TimedOut, "device went quiet");
/// let text = render_failure(&error);
/// assert!(text.starts_with("device went quiet\n"));
/// ```
#[must_use]
pub fn render_failure(failure: &(dyn Error + 'static)) -> String {
    let mut rendered = format!("{failure}\n{failure:?}");

    let mut source = failure.source();
    while let Some(cause) = source {
        let _ = write!(rendered, "\nCaused by: {cause}");
        source = cause.source();
    }

    rendered
}
