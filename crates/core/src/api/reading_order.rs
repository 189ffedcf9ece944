//! Reading order of text runs by position.
//!
//! Runs are grouped into lines top to bottom, then ordered left to right
//! within each line. Boxes are device boxes; `top_down` says whether y grows
//! downward (a canvas mapping) or upward (user space).

use std::cmp::Ordering;

use crate::api::high_level::TextRun;
use crate::utils::Rect;

/// Vertical extent of a box as (top, bottom) with top < bottom.
fn vertical_span(bbox: Rect, top_down: bool) -> (f64, f64) {
    if top_down {
        (bbox.1, bbox.3)
    } else {
        (-bbox.3, -bbox.1)
    }
}

/// Whether two boxes lie on the same text line.
///
/// At least a quarter of the lower box's height must lie within the
/// horizontal band of the other box.
pub fn is_same_line(a: Rect, b: Rect, top_down: bool) -> bool {
    let (top1, bottom1) = vertical_span(a, top_down);
    let (top2, bottom2) = vertical_span(b, top_down);
    let min_height = (bottom1 - top1).min(bottom2 - top2);
    let threshold = min_height * 0.75;
    (top1 > top2 - threshold && top1 < bottom2 + threshold - min_height)
        || (top2 > top1 - threshold && top2 < bottom1 + threshold - min_height)
}

fn by_top_then_left(a: &TextRun, b: &TextRun, top_down: bool) -> Ordering {
    let top_a = vertical_span(a.bbox, top_down).0;
    let top_b = vertical_span(b.bbox, top_down).0;
    top_a.total_cmp(&top_b).then(a.bbox.0.total_cmp(&b.bbox.0))
}

/// Groups runs into lines in reading order.
///
/// Runs sharing a line with any run already in the current line join it;
/// each line is sorted by left edge. Ties keep content order.
pub fn text_lines(mut runs: Vec<TextRun>, top_down: bool) -> Vec<Vec<TextRun>> {
    runs.sort_by(|a, b| by_top_then_left(a, b, top_down));

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if line.iter().any(|r| is_same_line(r.bbox, run.bbox, top_down)) => {
                line.push(run)
            }
            _ => lines.push(vec![run]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.0.total_cmp(&b.bbox.0));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_line_needs_quarter_overlap() {
        let a = (0.0, 0.0, 10.0, 10.0);
        assert!(is_same_line(a, (20.0, 3.0, 30.0, 13.0), false));
        assert!(!is_same_line(a, (20.0, 8.0, 30.0, 18.0), false));
        assert!(!is_same_line(a, (20.0, 40.0, 30.0, 50.0), false));
    }

    #[test]
    fn test_same_line_is_symmetric_in_both_orientations() {
        let a = (0.0, 100.0, 10.0, 110.0);
        let b = (50.0, 104.0, 60.0, 112.0);
        assert_eq!(is_same_line(a, b, true), is_same_line(b, a, true));
        assert_eq!(is_same_line(a, b, false), is_same_line(b, a, false));
        assert!(is_same_line(a, b, true));
    }
}
