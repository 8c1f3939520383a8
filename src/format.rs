use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const NOT_AVAILABLE: &str = "N/A";

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_gb(gb: f64) -> String {
    format!("{gb:.2} GB")
}

pub fn format_rate(kbs: f64) -> String {
    if kbs >= 1024.0 * 1024.0 {
        format!("{:.1} GB/s", kbs / (1024.0 * 1024.0))
    } else if kbs >= 1024.0 {
        format!("{:.1} MB/s", kbs / 1024.0)
    } else {
        format!("{kbs:.1} KB/s")
    }
}

pub fn format_optional<T>(value: Option<T>, fmt: impl FnOnce(T) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}
