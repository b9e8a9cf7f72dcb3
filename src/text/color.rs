use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RGBA: Regex =
        Regex::new(r"^rgba\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*([\d.]+)\s*\)$")
            .expect("valid rgba pattern");
    static ref RGB: Regex = Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$")
        .expect("valid rgb pattern");
}

/// Normalize a CSS-style color to ffmpeg's `0xRRGGBB[AA]`.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()` and `rgba()`. Named
/// colors and anything unrecognized pass through unchanged, since ffmpeg
/// understands color names itself.
pub fn color_to_ffmpeg(color: &str) -> String {
    let color = color.trim();

    if let Some(caps) = RGBA.captures(color) {
        let alpha = caps[4].parse::<f64>().unwrap_or(1.0).clamp(0.0, 1.0);
        return format!(
            "0x{}{:02x}",
            rgb_hex(&caps[1], &caps[2], &caps[3]),
            (alpha * 255.0).round() as u8
        );
    }

    if let Some(caps) = RGB.captures(color) {
        return format!("0x{}", rgb_hex(&caps[1], &caps[2], &caps[3]));
    }

    if let Some(hex) = color.strip_prefix('#')
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        return match hex.len() {
            3 => format!("0x{}", hex.chars().flat_map(|c| [c, c]).collect::<String>()),
            6 | 8 => format!("0x{hex}"),
            _ => color.to_string(),
        };
    }

    color.to_string()
}

fn rgb_hex(r: &str, g: &str, b: &str) -> String {
    [r, g, b]
        .iter()
        .map(|c| format!("{:02x}", c.parse::<u16>().unwrap_or(0).min(255)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(color_to_ffmpeg("#FFFFFF"), "0xFFFFFF");
        assert_eq!(color_to_ffmpeg("#f0a"), "0xff00aa");
        assert_eq!(color_to_ffmpeg("#11223380"), "0x11223380");
    }

    #[test]
    fn functional_forms() {
        assert_eq!(color_to_ffmpeg("rgb(255, 0, 16)"), "0xff0010");
        assert_eq!(color_to_ffmpeg("rgba(0,0,0,0.6)"), "0x00000099");
        assert_eq!(color_to_ffmpeg("rgba(0, 0, 0, 0.5)"), "0x00000080");
    }

    #[test]
    fn names_pass_through() {
        assert_eq!(color_to_ffmpeg("white"), "white");
        assert_eq!(color_to_ffmpeg("#zzz"), "#zzz");
    }
}
