//! crates/logging/src/format.rs
//! Fixed-format rendering of log lines and hex dumps.
//!
//! Log lines look like `14:03:27 I/Device: connected\n`. Hex dump lines are
//! 72 columns wide:
//!
//! ```text
//! 0030- 00 11 22 33 44 55 66 77 88 99 aa bb cc dd ee ff  ..."3DUfw........
//! ```
//!
//! Both renderers are pure; [`format_line`] only adds a clock read.

use std::iter::FusedIterator;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::level::LogLevel;

/// Width of every hex dump line, in columns.
pub const HEX_DUMP_LINE_WIDTH: usize = 72;
/// Column of the first hex byte pair.
pub const HEX_COLUMN: usize = 6;
/// Column of the first ASCII rendering character.
pub const ASCII_COLUMN: usize = 55;
/// Number of bytes rendered per hex dump line.
pub const BYTES_PER_LINE: usize = 16;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Blank line template: zero address, dash separator, spaces elsewhere.
const BLANK_LINE: [u8; HEX_DUMP_LINE_WIDTH] = {
    let mut line = [b' '; HEX_DUMP_LINE_WIDTH];
    line[0] = b'0';
    line[1] = b'0';
    line[2] = b'0';
    line[3] = b'0';
    line[4] = b'-';
    line
};

/// Renders a log line stamped with the current local time.
///
/// Falls back to UTC when the local offset cannot be determined, which the
/// `time` crate reports on some multi-threaded Unix processes.
#[must_use]
pub fn format_line(level: LogLevel, tag: &str, message: &str) -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_line_at(now, level, tag, message)
}

/// Renders a log line for an explicit timestamp.
///
/// ```
/// use logging::{format_line_at, LogLevel};
/// use time::macros::datetime;
///
/// let at = datetime!(2024-05-01 09:08:07 UTC);
/// assert_eq!(
///     format_line_at(at, LogLevel::Info, "TAG", "hello"),
///     "09:08:07 I/TAG: hello\n"
/// );
/// ```
#[must_use]
pub fn format_line_at(at: OffsetDateTime, level: LogLevel, tag: &str, message: &str) -> String {
    let timestamp = at
        .format(format_description!(
            "[hour padding:zero]:[minute padding:zero]:[second padding:zero]"
        ))
        .unwrap_or_else(|_| String::from("00:00:00"));
    format!("{timestamp} {}/{tag}: {message}\n", level.letter())
}

/// Returns an iterator over the hex dump lines for `data[offset..offset + length]`.
///
/// The range is clamped to the buffer, so out-of-range requests dump whatever
/// part of the range exists. Addresses count from the start of the range and
/// wrap at 16 bits.
#[must_use]
pub fn hex_dump_lines(data: &[u8], offset: usize, length: usize) -> HexDumpLines<'_> {
    let start = offset.min(data.len());
    let end = start.saturating_add(length).min(data.len());
    HexDumpLines {
        remaining: &data[start..end],
        address: 0,
    }
}

/// Iterator produced by [`hex_dump_lines`].
#[derive(Clone, Debug)]
pub struct HexDumpLines<'a> {
    remaining: &'a [u8],
    address: usize,
}

impl Iterator for HexDumpLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let count = self.remaining.len().min(BYTES_PER_LINE);
        let (chunk, rest) = self.remaining.split_at(count);
        let line = render_hex_line(self.address, chunk);

        self.remaining = rest;
        self.address += count;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lines = self.remaining.len().div_ceil(BYTES_PER_LINE);
        (lines, Some(lines))
    }
}

impl ExactSizeIterator for HexDumpLines<'_> {}

impl FusedIterator for HexDumpLines<'_> {}

fn render_hex_line(address: usize, chunk: &[u8]) -> String {
    let mut line = BLANK_LINE;

    let address = address & 0xffff;
    for (position, shift) in [12, 8, 4, 0].into_iter().enumerate() {
        line[position] = HEX_DIGITS[(address >> shift) & 0x0f];
    }

    for (index, &byte) in chunk.iter().enumerate() {
        let column = HEX_COLUMN + index * 3;
        line[column] = HEX_DIGITS[usize::from(byte >> 4)];
        line[column + 1] = HEX_DIGITS[usize::from(byte & 0x0f)];
        line[ASCII_COLUMN + index] = if (0x20..0x7f).contains(&byte) {
            byte
        } else {
            b'.'
        };
    }

    line.iter().copied().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn line_format_matches_layout() {
        let at = datetime!(2023-11-02 23:59:01 UTC);
        assert_eq!(
            format_line_at(at, LogLevel::Warn, "adb", "device offline"),
            "23:59:01 W/adb: device offline\n"
        );
    }

    #[test]
    fn line_format_is_repeatable() {
        let at = datetime!(2023-11-02 01:02:03 UTC);
        let first = format_line_at(at, LogLevel::Debug, "T", "m");
        let second = format_line_at(at, LogLevel::Debug, "T", "m");
        assert_eq!(first, second);
    }

    #[test]
    fn current_time_line_has_expected_shape() {
        let line = format_line(LogLevel::Error, "tag", "boom");
        assert!(line.ends_with(" E/tag: boom\n"));
        assert_eq!(line.as_bytes()[2], b':');
        assert_eq!(line.as_bytes()[5], b':');
    }

    #[test]
    fn blank_template_has_zero_address() {
        assert_eq!(&BLANK_LINE[..5], b"0000-");
        assert!(BLANK_LINE[5..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn two_byte_dump_matches_scenario() {
        let lines: Vec<String> = hex_dump_lines(&[0x41, 0x0a], 0, 2).collect();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.len(), HEX_DUMP_LINE_WIDTH);
        assert!(line.starts_with("0000- 41 0a "));
        assert_eq!(&line[HEX_COLUMN..HEX_COLUMN + 5], "41 0a");
        assert_eq!(&line[ASCII_COLUMN..ASCII_COLUMN + 2], "A.");
    }

    #[test]
    fn full_line_layout() {
        let data: Vec<u8> = (0x30..0x40).collect();
        let line = hex_dump_lines(&data, 0, data.len()).next().unwrap();
        assert_eq!(
            line,
            "0000- 30 31 32 33 34 35 36 37 38 39 3a 3b 3c 3d 3e 3f  0123456789:;<=>? "
        );
    }

    #[test]
    fn partial_line_after_full_line_is_blank_filled() {
        let mut data = vec![0xffu8; 16];
        data.push(b'z');
        let lines: Vec<String> = hex_dump_lines(&data, 0, data.len()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0010- 7a "));
        assert!(lines[1][HEX_COLUMN + 3..ASCII_COLUMN].chars().all(|c| c == ' '));
        assert_eq!(&lines[1][ASCII_COLUMN..ASCII_COLUMN + 1], "z");
        assert!(lines[1][ASCII_COLUMN + 1..].chars().all(|c| c == ' '));
    }

    #[test]
    fn addresses_wrap_at_sixteen_bits() {
        let data = vec![0u8; 0x10010];
        let last = hex_dump_lines(&data, 0, data.len()).last().unwrap();
        assert!(last.starts_with("0000-"));
        let penultimate = hex_dump_lines(&data, 0, data.len()).nth(0xfff).unwrap();
        assert!(penultimate.starts_with("fff0-"));
    }

    #[test]
    fn offset_and_length_select_a_window() {
        let data = b"xxABCDxx";
        let lines: Vec<String> = hex_dump_lines(data, 2, 4).collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("0000- 41 42 43 44 "));
    }

    #[test]
    fn out_of_range_requests_are_clamped() {
        assert_eq!(hex_dump_lines(b"abc", 10, 4).count(), 0);
        assert_eq!(hex_dump_lines(b"abc", 1, usize::MAX).count(), 1);
        assert_eq!(hex_dump_lines(b"", 0, 0).count(), 0);
    }

    #[test]
    fn size_hint_counts_lines() {
        let data = [0u8; 33];
        let lines = hex_dump_lines(&data, 0, data.len());
        assert_eq!(lines.len(), 3);
    }
}
