//! Resolution of overlapping style spans into non-overlapping styled
//! segments for one visual line.

use crate::richtext::{RichSpan, STYLE_BITS, StyleMask};

/// A maximal sub-range of a visual line with one combined style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyledSegment {
    pub start: usize,
    pub end: usize,
    pub style: StyleMask,
}

/// Combines `spans` into a gapless, non-overlapping partition of
/// `[line_start, line_start + line_len)`, ordered by start. Every offset's
/// segment style is the OR of all spans covering it. Spans outside the line
/// are ignored; malformed spans are clipped or dropped, never an error.
///
/// Per style bit, a delta sweep over the deduplicated breakpoints counts
/// covering spans; a bit is active wherever its running count is positive,
/// which holds up under duplicate spans and arbitrary overlap depth in any
/// input order.
pub fn line_segments(
    spans: &[RichSpan],
    line_start: usize,
    line_len: usize,
) -> Vec<StyledSegment> {
    let line_end = line_start + line_len;

    let mut clipped: Vec<(usize, usize, StyleMask)> = Vec::with_capacity(spans.len());
    for span in spans {
        let start = span.start.max(line_start);
        let end = span.end().min(line_end);
        if start < end {
            clipped.push((start, end, span.style));
        }
    }

    let mut bounds = Vec::with_capacity(clipped.len() * 2 + 2);
    bounds.push(line_start);
    bounds.push(line_end);
    for &(start, end, _) in &clipped {
        bounds.push(start);
        bounds.push(end);
    }
    bounds.sort_unstable();
    bounds.dedup();
    if bounds.len() < 2 {
        return Vec::new();
    }

    let mut styles = vec![StyleMask::empty(); bounds.len() - 1];
    for bit in STYLE_BITS {
        let mut deltas = vec![0i32; bounds.len()];
        for &(start, end, style) in &clipped {
            if !style.contains(bit) {
                continue;
            }
            let (Ok(start_idx), Ok(end_idx)) =
                (bounds.binary_search(&start), bounds.binary_search(&end))
            else {
                continue;
            };
            deltas[start_idx] += 1;
            deltas[end_idx] -= 1;
        }
        let mut count = 0i32;
        for (idx, style) in styles.iter_mut().enumerate() {
            count += deltas[idx];
            if count > 0 {
                *style |= bit;
            }
        }
    }

    (0..styles.len())
        .map(|idx| StyledSegment {
            start: bounds[idx],
            end: bounds[idx + 1],
            style: styles[idx],
        })
        .collect()
}
