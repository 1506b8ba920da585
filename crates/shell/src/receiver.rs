//! crates/shell/src/receiver.rs
//!
//! Consumers of command output.
//!
//! A [`ShellOutputReceiver`] is handed to a device for the duration of one
//! command. It gets raw output chunks in arrival order, a final flush, and is
//! polled between chunks for cancellation. Cancellation is the only way a
//! caller can stop a running command early.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives the output of a shell command.
pub trait ShellOutputReceiver {
    /// Accepts the next chunk of raw output. Chunks are never empty.
    fn add_output(&mut self, chunk: &[u8]);

    /// Called once when no more output will be delivered.
    fn flush(&mut self);

    /// Returns `true` once the receiver wants the command stopped.
    fn is_cancelled(&self) -> bool;
}

impl<R: ShellOutputReceiver + ?Sized> ShellOutputReceiver for &mut R {
    fn add_output(&mut self, chunk: &[u8]) {
        (**self).add_output(chunk);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<R: ShellOutputReceiver + ?Sized> ShellOutputReceiver for Box<R> {
    fn add_output(&mut self, chunk: &[u8]) {
        (**self).add_output(chunk);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Shared cancellation flag.
///
/// Clones observe the same flag, so one copy can live inside a receiver
/// while another is triggered from a different thread.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates an untriggered handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Reports whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Receiver that keeps all output in memory.
///
/// ```
/// use shell::{CollectingOutputReceiver, ShellOutputReceiver};
///
/// let mut receiver = CollectingOutputReceiver::new();
/// receiver.add_output(b"package:com.example\n");
/// receiver.flush();
/// assert_eq!(receiver.output(), "package:com.example\n");
/// assert!(receiver.is_flushed());
/// ```
#[derive(Debug, Default)]
pub struct CollectingOutputReceiver {
    buffer: Vec<u8>,
    chunks: usize,
    flushed: bool,
    cancel: CancelHandle,
}

impl CollectingOutputReceiver {
    /// Creates an empty receiver with its own cancellation handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty receiver that observes `cancel`.
    #[must_use]
    pub fn with_cancel(cancel: CancelHandle) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Returns a handle that cancels this receiver.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the collected output decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Returns the collected raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns how many chunks have been delivered.
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Reports whether [`flush`](ShellOutputReceiver::flush) was called.
    #[must_use]
    pub const fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Consumes the receiver and returns the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl ShellOutputReceiver for CollectingOutputReceiver {
    fn add_output(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        self.chunks += 1;
    }

    fn flush(&mut self) {
        self.flushed = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Receiver that discards all output and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOutputReceiver;

impl ShellOutputReceiver for NullOutputReceiver {
    fn add_output(&mut self, _chunk: &[u8]) {}

    fn flush(&mut self) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Receiver that splits output into lines and hands each one to a callback.
///
/// Lines end at `\n`; a trailing `\r` is removed. A line split across chunks
/// is reassembled before the callback sees it, and an unterminated final line
/// is delivered on flush. Invalid UTF-8 is replaced.
///
/// ```
/// use shell::{LineReceiver, ShellOutputReceiver};
///
/// let mut lines = Vec::new();
/// let mut receiver = LineReceiver::new(|line: &str| lines.push(line.to_owned()));
/// receiver.add_output(b"first\r\nsec");
/// receiver.add_output(b"ond\nthird");
/// receiver.flush();
/// drop(receiver);
/// assert_eq!(lines, ["first", "second", "third"]);
/// ```
pub struct LineReceiver<F> {
    on_line: F,
    pending: Vec<u8>,
    cancel: CancelHandle,
}

impl<F: FnMut(&str)> LineReceiver<F> {
    /// Creates a receiver that calls `on_line` for every complete line.
    pub fn new(on_line: F) -> Self {
        Self::with_cancel(on_line, CancelHandle::new())
    }

    /// Creates a receiver that observes `cancel`.
    pub fn with_cancel(on_line: F, cancel: CancelHandle) -> Self {
        Self {
            on_line,
            pending: Vec::new(),
            cancel,
        }
    }

    /// Returns a handle that cancels this receiver.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn emit(&mut self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        (self.on_line)(&String::from_utf8_lossy(line));
    }
}

impl<F: FnMut(&str)> ShellOutputReceiver for LineReceiver<F> {
    fn add_output(&mut self, chunk: &[u8]) {
        let mut rest = chunk;
        while let Some(position) = rest.iter().position(|&byte| byte == b'\n') {
            let (head, tail) = rest.split_at(position);
            if self.pending.is_empty() {
                self.emit(head);
            } else {
                let mut line = std::mem::take(&mut self.pending);
                line.extend_from_slice(head);
                self.emit(&line);
            }
            rest = &tail[1..];
        }
        self.pending.extend_from_slice(rest);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<F> std::fmt::Debug for LineReceiver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReceiver")
            .field("pending", &self.pending.len())
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
