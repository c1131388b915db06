//! Fixed-width text helpers shared by the report and the console view.
//! Widths count characters, not bytes.

/// Cut `text` to at most `max` characters, ending with `...` when cut
pub fn ellipsize(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max < 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// `text` cut to `width` and right-padded to exactly `width`
pub fn cell(text: &str, width: usize) -> String {
    format!("{:<width$}", ellipsize(text, width), width = width)
}

/// `ch` repeated `width` times
pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat(ch).take(width).collect()
}
