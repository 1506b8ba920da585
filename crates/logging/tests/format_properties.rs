//! Property tests for level lookup and line rendering.
//!
//! Level lookups must be total over arbitrary input, and every hex dump line
//! must have the fixed 72-column layout with hex that decodes back to the
//! dumped bytes.

use logging::{
    ASCII_COLUMN, BYTES_PER_LINE, HEX_COLUMN, HEX_DUMP_LINE_WIDTH, LogLevel, format_line_at,
    hex_dump_lines,
};
use proptest::prelude::*;
use time::OffsetDateTime;

// ============================================================================
// Fixed Scenarios
// ============================================================================

/// Two bytes `A` and newline produce a single line with a blank tail.
#[test]
fn two_byte_dump_layout() {
    let lines: Vec<String> = hex_dump_lines(&[0x41, 0x0a], 0, 2).collect();
    assert_eq!(lines.len(), 1);

    let line = &lines[0];
    assert_eq!(line.len(), HEX_DUMP_LINE_WIDTH);
    assert!(line.starts_with("0000- 41 0a "));
    assert_eq!(&line[ASCII_COLUMN..ASCII_COLUMN + 2], "A.");
    assert!(line[ASCII_COLUMN + 2..].chars().all(|c| c == ' '));
    assert!(line[HEX_COLUMN + 6..ASCII_COLUMN].chars().all(|c| c == ' '));
}

/// An empty range yields no lines at all.
#[test]
fn empty_range_has_no_lines() {
    assert_eq!(hex_dump_lines(b"abc", 3, 10).count(), 0);
    assert_eq!(hex_dump_lines(b"", 0, 0).count(), 0);
}

// ============================================================================
// Properties
// ============================================================================

fn decode_hex_section(line: &str, count: usize) -> Vec<u8> {
    (0..count)
        .map(|index| {
            let column = HEX_COLUMN + index * 3;
            u8::from_str_radix(&line[column..column + 2], 16).unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn name_lookup_is_total(name in ".{0,12}") {
        let found = LogLevel::from_name(&name);
        let expected = LogLevel::ALL.into_iter().find(|level| level.name() == name);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn letter_lookup_is_total(letter in any::<char>()) {
        let found = LogLevel::from_letter(letter);
        let expected = LogLevel::ALL.into_iter().find(|level| level.letter() == letter);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn letter_str_uses_first_character(text in ".{0,6}") {
        let expected = text.chars().next().and_then(LogLevel::from_letter);
        prop_assert_eq!(LogLevel::from_letter_str(&text), expected);
    }

    #[test]
    fn line_rendering_is_pure(
        seconds in 0i64..4_000_000_000,
        tag in "[A-Za-z]{1,8}",
        message in "[ -~]{0,40}",
        index in 0usize..6,
    ) {
        let at = OffsetDateTime::from_unix_timestamp(seconds).unwrap();
        let level = LogLevel::ALL[index];
        let first = format_line_at(at, level, &tag, &message);
        let second = format_line_at(at, level, &tag, &message);
        prop_assert_eq!(&first, &second);

        let suffix = format!(" {}/{}: {}\n", level.letter(), tag, message);
        prop_assert!(first.ends_with(&suffix));
        prop_assert_eq!(first.len(), 8 + suffix.len());
    }

    #[test]
    fn hex_dump_lines_decode_to_input(data in proptest::collection::vec(any::<u8>(), 0..100)) {
        let lines: Vec<String> = hex_dump_lines(&data, 0, data.len()).collect();
        prop_assert_eq!(lines.len(), data.len().div_ceil(BYTES_PER_LINE));

        for (index, (line, chunk)) in lines.iter().zip(data.chunks(BYTES_PER_LINE)).enumerate() {
            prop_assert_eq!(line.len(), HEX_DUMP_LINE_WIDTH);
            prop_assert_eq!(&line[..4], format!("{:04x}", index * BYTES_PER_LINE));
            prop_assert_eq!(&line[4..5], "-");
            prop_assert_eq!(decode_hex_section(line, chunk.len()), chunk.to_vec());

            for (position, &byte) in chunk.iter().enumerate() {
                let shown = line.as_bytes()[ASCII_COLUMN + position];
                if (0x20..0x7f).contains(&byte) {
                    prop_assert_eq!(shown, byte);
                } else {
                    prop_assert_eq!(shown, b'.');
                }
            }

            let hex_end = HEX_COLUMN + chunk.len() * 3;
            prop_assert!(line[hex_end..ASCII_COLUMN].chars().all(|c| c == ' '));
            prop_assert!(line[ASCII_COLUMN + chunk.len()..].chars().all(|c| c == ' '));
        }
    }

    #[test]
    fn hex_dump_range_is_clamped(
        data in proptest::collection::vec(any::<u8>(), 0..64),
        offset in 0usize..80,
        length in 0usize..80,
    ) {
        let start = offset.min(data.len());
        let end = start.saturating_add(length).min(data.len());
        let expected = hex_dump_lines(&data[start..end], 0, end - start).collect::<Vec<_>>();
        let actual = hex_dump_lines(&data, offset, length).collect::<Vec<_>>();
        prop_assert_eq!(actual, expected);
    }
}
