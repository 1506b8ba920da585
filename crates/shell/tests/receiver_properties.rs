//! Property tests for the stock receivers and timeout construction.

use std::time::Duration;

use proptest::prelude::*;
use shell::{
    CollectingOutputReceiver, CommandTimeouts, LineReceiver, ShellOutputReceiver, TimeUnit,
};

fn lines_of(chunks: &[Vec<u8>]) -> Vec<String> {
    let mut lines = Vec::new();
    {
        let mut receiver = LineReceiver::new(|line: &str| lines.push(line.to_owned()));
        for chunk in chunks {
            receiver.add_output(chunk);
        }
        receiver.flush();
    }
    lines
}

fn split_at_points(data: &[u8], mut points: Vec<usize>) -> Vec<Vec<u8>> {
    points.retain(|&point| point <= data.len());
    points.sort_unstable();
    points.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for point in points {
        chunks.push(data[start..point].to_vec());
        start = point;
    }
    chunks.push(data[start..].to_vec());
    chunks
}

proptest! {
    #[test]
    fn line_splitting_ignores_chunk_boundaries(
        text in "[a-z\r\n]{0,64}",
        points in proptest::collection::vec(0usize..64, 0..8),
    ) {
        let whole = lines_of(&[text.as_bytes().to_vec()]);
        let pieces = lines_of(&split_at_points(text.as_bytes(), points));
        prop_assert_eq!(whole, pieces);
    }

    #[test]
    fn lines_never_contain_newlines(text in "[a-z\r\n]{0,64}") {
        let newlines = text.matches('\n').count();
        let lines = lines_of(&[text.into_bytes()]);
        prop_assert!(lines.iter().all(|line| !line.contains('\n')));
        prop_assert!(lines.len() == newlines || lines.len() == newlines + 1);
    }

    #[test]
    fn collecting_receiver_concatenates(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..16), 0..8),
    ) {
        let mut receiver = CollectingOutputReceiver::new();
        for chunk in &chunks {
            receiver.add_output(chunk);
        }
        let expected = chunks.concat();
        prop_assert_eq!(receiver.bytes(), expected.as_slice());
        prop_assert_eq!(receiver.chunk_count(), chunks.len());
    }

    #[test]
    fn zero_is_always_unbounded(value in 0u64..10_000, index in 0usize..3) {
        let unit = [TimeUnit::Milliseconds, TimeUnit::Seconds, TimeUnit::Minutes][index];
        let timeouts = CommandTimeouts::from_units(0, value, unit);
        prop_assert_eq!(timeouts.overall(), None);
        if value == 0 {
            prop_assert_eq!(timeouts.inactivity(), None);
        } else {
            prop_assert!(timeouts.inactivity().unwrap() >= Duration::from_millis(value));
        }
    }
}
