//! crates/shell/src/pump.rs
//!
//! Deadline-tracking loop between an output stream and a receiver.
//!
//! Output producers (reader threads, sockets, test fixtures) push
//! [`StreamEvent`]s into a channel. [`pump_output`] drains that channel on
//! the calling thread, waiting with `recv_timeout` so that the deadlines and
//! the receiver's cancellation flag are re-examined at least once per poll
//! interval even while the producer is silent. Nothing here interrupts a
//! blocked read; producers own their reads and the pump only owns the wait.

use std::io;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::ShellError;
use crate::receiver::ShellOutputReceiver;
use crate::timeout::DeadlineTracker;

/// Default interval at which a silent stream is re-checked.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One item from an output producer.
#[derive(Debug)]
pub enum StreamEvent {
    /// A chunk of output.
    Chunk(Vec<u8>),
    /// The producer reached end of stream.
    Closed,
    /// The producer hit a transport fault.
    Failed(io::Error),
}

/// How a pump finished without error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PumpOutcome {
    /// Every producer closed its stream.
    Completed,
    /// The receiver asked to stop.
    Cancelled,
}

/// Forwards events to `receiver` until all producers close, the receiver
/// cancels, a deadline passes, or a producer fails.
///
/// `producers` is the number of [`StreamEvent::Closed`] events that mark the
/// end of output; a dropped channel counts as all remaining producers
/// closing. Each chunk re-arms the inactivity deadline. Cancellation is
/// checked before each wait and after each chunk, so once the receiver
/// reports cancelled no further chunk is delivered. The receiver is flushed
/// on completion and on cancellation but not on error.
pub fn pump_output(
    events: &Receiver<StreamEvent>,
    producers: usize,
    receiver: &mut dyn ShellOutputReceiver,
    tracker: &mut DeadlineTracker,
    poll: Duration,
) -> Result<PumpOutcome, ShellError> {
    let mut open = producers;

    while open > 0 {
        if receiver.is_cancelled() {
            receiver.flush();
            return Ok(PumpOutcome::Cancelled);
        }
        tracker.check()?;

        match events.recv_timeout(tracker.next_wait(poll)) {
            Ok(StreamEvent::Chunk(chunk)) => {
                if chunk.is_empty() {
                    continue;
                }
                tracker.record_output();
                receiver.add_output(&chunk);
            }
            Ok(StreamEvent::Closed) => open -= 1,
            Ok(StreamEvent::Failed(error)) => return Err(ShellError::Io(error)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => open = 0,
        }
    }

    receiver.flush();
    Ok(PumpOutcome::Completed)
}
