use unicode_width::UnicodeWidthStr;

/// Pick the singular or plural noun for `count`
pub fn pluralize(count: u32, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}

/// Format a grade average to two decimals
pub fn format_grade(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a percentage, trimming trailing zeros
pub fn format_percent(value: f64) -> String {
    if value == value.floor() {
        format!("{}%", value as i64)
    } else {
        format!("{:.2}%", value)
    }
}

/// Pad `text` on the right to `width` terminal columns
pub fn pad_display(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralize_only_singular_for_one() {
        assert_eq!(pluralize(0, "class", "classes"), "classes");
        assert_eq!(pluralize(1, "class", "classes"), "class");
        assert_eq!(pluralize(7, "class", "classes"), "classes");
    }

    #[test]
    fn percent_trims_whole_numbers() {
        assert_eq!(format_percent(80.0), "80%");
        assert_eq!(format_percent(66.666), "66.67%");
    }

    #[test]
    fn padding_counts_display_columns() {
        assert_eq!(pad_display("abc", 5), "abc  ");
        assert_eq!(pad_display("数学", 6), "数学  ");
        assert_eq!(pad_display("toolong", 3), "toolong");
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(3, 4, 4), "███░");
        assert_eq!(progress_bar(9, 4, 4), "████");
    }
}
