use crate::text_metrics;

const ELLIPSIS: char = '\u{2026}';

/// Shortens `text` with a trailing ellipsis so it fits in `max_width`.
pub(crate) fn fit_label(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> String {
    let text = text.trim();
    if text_width(text, font_size, font_family, fast_metrics) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{ELLIPSIS}", chars.iter().collect::<String>().trim_end());
        if text_width(&candidate, font_size, font_family, fast_metrics) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Rough em-relative advance for a sans-serif face.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.35,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.95,
        '0'..='9' => 0.60,
        'A'..='Z' => 0.68,
        'a'..='z' => 0.56,
        '\u{2026}' => 0.9,
        c if c.is_ascii() => 0.57,
        _ => 0.95,
    }
}
