use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Lay out `left` and `right` on one line of exactly `width` cells: `right` is
/// flush right, `left` is truncated to leave at least one space between them.
pub fn spread(left: &str, right: &str, width: usize) -> String {
    let right_w = display_width(right);
    if right_w >= width {
        return truncate_to_width(right, width);
    }
    let left = truncate_to_width(left, width - right_w - 1);
    let gap = width - right_w - display_width(&left);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Keep at most the first `cols` cells of `s`, without an ellipsis. A wide
/// grapheme that would straddle the cut is dropped.
pub fn take_columns(s: &str, cols: usize) -> String {
    let mut col = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if col + gw > cols {
            break;
        }
        col += gw;
        out.push_str(g);
    }
    out
}

/// Drop the first `cols` cells of `s`. A wide grapheme straddling the cut is
/// replaced by spaces so the remainder keeps its column alignment.
pub fn skip_columns(s: &str, cols: usize) -> String {
    let mut col = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if col >= cols {
            out.push_str(g);
        } else if col + gw > cols {
            out.push_str(&" ".repeat(col + gw - cols));
        }
        col += gw;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn truncate_no_truncation_needed() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_to_width("hello world", 6), "hello\u{2026}");
    }

    #[test]
    fn truncate_cjk_boundary() {
        // 你好世 is 6 cells; budget 4 fits 你好 exactly
        assert_eq!(truncate_to_width("你好世", 5), "你好\u{2026}");
    }

    #[test]
    fn truncate_zero_and_one() {
        assert_eq!(truncate_to_width("hello", 0), "");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
    }

    #[test]
    fn spread_right_aligns_second_part() {
        assert_eq!(spread("Write", "01:05", 14), "Write    01:05");
    }

    #[test]
    fn spread_truncates_left_side_first() {
        let line = spread("A long title", "00:00", 12);
        assert_eq!(line, "A lon\u{2026} 00:00");
        assert_eq!(display_width(&line), 12);
    }

    #[test]
    fn skip_columns_pads_split_wide_grapheme() {
        assert_eq!(skip_columns("abc", 1), "bc");
        assert_eq!(skip_columns("你好", 1), " 好");
        assert_eq!(skip_columns("ab", 5), "");
    }

    #[test]
    fn take_columns_clips_without_ellipsis() {
        assert_eq!(take_columns("hello", 3), "hel");
        assert_eq!(take_columns("hi", 8), "hi");
        assert_eq!(take_columns("a你b", 2), "a");
    }
}
