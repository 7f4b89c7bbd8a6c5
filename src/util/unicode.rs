use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn grapheme_width(g: &str) -> usize {
    UnicodeWidthStr::width(g)
}

/// Cut `s` to at most `max_cells` cells, ending in `...` when anything was
/// dropped. Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 3 {
        return ".".repeat(max_cells);
    }
    let budget = max_cells - 3;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = grapheme_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        out.push_str(g);
    }
    out.push_str("...");
    out
}

/// Left-align `s` in a column of `cells` cells, truncating if needed
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let cut = truncate_to_width(s, cells);
    let pad = cells.saturating_sub(display_width(&cut));
    format!("{}{}", cut, " ".repeat(pad))
}

/// Next grapheme boundary after `byte_offset`. None at the end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset >= s.len() {
        return None;
    }
    match s[byte_offset..].grapheme_indices(true).nth(1) {
        Some((i, _)) => Some(byte_offset + i),
        None => Some(s.len()),
    }
}

/// Previous grapheme boundary before `byte_offset`. None at the start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    s[..byte_offset]
        .grapheme_indices(true)
        .last()
        .map(|(i, _)| i)
}

/// Convert byte offset to display column
pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_to_width("short", 30), "short");
        let exact = "a".repeat(30);
        assert_eq!(truncate_to_width(&exact, 30), exact);
    }

    #[test]
    fn truncate_long_titles() {
        let long = "a".repeat(31);
        let cut = truncate_to_width(&long, 30);
        assert_eq!(cut, format!("{}...", "a".repeat(27)));
        assert_eq!(display_width(&cut), 30);
    }

    #[test]
    fn truncate_never_splits_wide_chars() {
        // 10 wide chars = 20 cells; 7 cells leaves room for 2 of them
        let cut = truncate_to_width("日本語日本語日本語日", 7);
        assert_eq!(cut, "日本...");
        assert_eq!(truncate_to_width("abcdef", 2), "..");
    }

    #[test]
    fn pad_fills_column() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日", 4), "日  ");
        assert_eq!(pad_to_width("abcdefgh", 6), "abc...");
    }

    #[test]
    fn grapheme_boundaries() {
        let s = "ae\u{301}b";
        assert_eq!(next_grapheme_boundary(s, 0), Some(1));
        assert_eq!(next_grapheme_boundary(s, 1), Some(4));
        assert_eq!(next_grapheme_boundary(s, 4), Some(5));
        assert_eq!(next_grapheme_boundary(s, 5), None);
        assert_eq!(prev_grapheme_boundary(s, 5), Some(4));
        assert_eq!(prev_grapheme_boundary(s, 4), Some(1));
        assert_eq!(prev_grapheme_boundary(s, 0), None);
    }

    #[test]
    fn display_col_of_offset() {
        assert_eq!(byte_offset_to_display_col("日本", 3), 2);
        assert_eq!(byte_offset_to_display_col("ab", 10), 2);
    }
}
