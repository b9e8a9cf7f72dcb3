/// Average glyph width as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

pub const DEFAULT_MIN_FONT_SIZE: u32 = 24;

/// Greedy word wrap on spaces; words longer than the limit are kept whole.
pub fn wrap_text(text: &str, max_chars_per_line: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let current_len = current.chars().count();
        if current_len + word.chars().count() + 1 <= max_chars_per_line {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Shrink `base_size` until the longest line is estimated to fit
/// `max_width` pixels, but never below `min_size`.
pub fn calculate_font_size(text: &str, max_width: f64, base_size: u32, min_size: u32) -> u32 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let estimated = longest as f64 * base_size as f64 * CHAR_WIDTH_RATIO;
    if estimated <= max_width {
        return base_size;
    }
    let scaled = ((max_width / estimated) * base_size as f64).floor() as u32;
    scaled.max(min_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_greedily() {
        assert_eq!(wrap_text("the quick brown fox jumps", 10), "the quick\nbrown fox\njumps");
        assert_eq!(wrap_text("incomprehensibilities ok", 5), "incomprehensibilities\nok");
    }

    #[test]
    fn font_size_scales_down_to_minimum() {
        assert_eq!(calculate_font_size("short", 1000.0, 72, DEFAULT_MIN_FONT_SIZE), 72);
        // 20 chars * 100 * 0.6 = 1200px estimated, 600px available.
        assert_eq!(calculate_font_size("abcdefghijklmnopqrst", 600.0, 100, 24), 50);
        assert_eq!(calculate_font_size("abcdefghijklmnopqrst", 60.0, 100, 24), 24);
    }
}
