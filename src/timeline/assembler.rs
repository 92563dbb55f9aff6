//! Timeline assembler: stitches per-segment fragments into one transcript.
//!
//! Fragments arrive in segment-local time; the assembler shifts them by
//! their segment's start offset and concatenates in segment order. Fragment
//! order within a segment is preserved as returned by the adapter, never
//! re-sorted. Overlap artifacts at cut points are accepted, not corrected.

use crate::timeline::{Fragment, SegmentFragments, SubtitleBlock, Transcript};

/// Combine per-segment fragment sequences into a full transcript.
///
/// Input must be ordered by segment index. Works identically for one segment
/// or many. Never fails; a malformed fragment (end before start) is clamped
/// and logged.
pub fn assemble(per_segment: &[SegmentFragments]) -> Transcript {
    let mut globals: Vec<Fragment> = Vec::new();

    for entry in per_segment {
        for fragment in &entry.fragments {
            let start = entry.start_offset + fragment.start;
            let mut end = entry.start_offset + fragment.end;

            if end < start {
                log::warn!(
                    "segment {}: fragment end {:.3}s precedes start {:.3}s, clamping",
                    entry.segment_index,
                    end,
                    start
                );
                end = start;
            }

            globals.push(Fragment {
                start,
                end,
                text: fragment.text.clone(),
            });
        }
    }

    let full_text = join_texts(&globals);
    let blocks = globals
        .into_iter()
        .filter(|f| !f.text.trim().is_empty())
        .enumerate()
        .map(|(i, f)| SubtitleBlock {
            index: i + 1,
            start: f.start,
            end: f.end,
            text: f.text.trim().to_string(),
        })
        .collect();

    Transcript { full_text, blocks }
}

/// Join fragment texts with single spaces, dropping whitespace-only entries
/// so segment boundaries never produce doubled separators.
fn join_texts(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}
