//! SRT (SubRip) subtitle rendering.

use crate::timeline::SubtitleBlock;
use std::fmt::Write;

/// Format a timestamp in seconds as `HH:MM:SS,mmm`.
///
/// Components are truncated, not rounded; negative input clamps to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Render subtitle blocks as an SRT document.
///
/// Each block is `index\nstart --> end\ntext\n\n`.
pub fn render(blocks: &[SubtitleBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", block.index);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp(block.start),
            format_timestamp(block.end)
        );
        let _ = writeln!(out, "{}", block.text);
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
    }

    #[test]
    fn test_format_seconds_and_millis() {
        assert_eq!(format_timestamp(5.0), "00:00:05,000");
        assert_eq!(format_timestamp(5.25), "00:00:05,250");
    }

    #[test]
    fn test_format_minutes_and_hours() {
        assert_eq!(format_timestamp(65.5), "00:01:05,500");
        assert_eq!(format_timestamp(3661.5), "01:01:01,500");
    }

    #[test]
    fn test_format_truncates_sub_millisecond() {
        assert_eq!(format_timestamp(1.9996), "00:00:01,999");
    }

    #[test]
    fn test_format_negative_clamps_to_zero() {
        assert_eq!(format_timestamp(-3.0), "00:00:00,000");
    }

    #[test]
    fn test_render_single_block() {
        let blocks = vec![SubtitleBlock {
            index: 1,
            start: 0.0,
            end: 5.0,
            text: "hello".to_string(),
        }];

        assert_eq!(render(&blocks), "1\n00:00:00,000 --> 00:00:05,000\nhello\n\n");
    }

    #[test]
    fn test_render_multiple_blocks() {
        let blocks = vec![
            SubtitleBlock {
                index: 1,
                start: 0.0,
                end: 5.0,
                text: "a".to_string(),
            },
            SubtitleBlock {
                index: 2,
                start: 5.0,
                end: 10.0,
                text: "b".to_string(),
            },
        ];

        let srt = render(&blocks);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:05,000\na\n\n2\n00:00:05,000 --> 00:00:10,000\nb\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }
}
