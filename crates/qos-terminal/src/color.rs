//! Terminal colour capability detection and conversion.

use crossterm::style::Color as CrosstermColor;
use qos_core::Color;

/// How many colours the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 24-bit colour.
    #[default]
    TrueColor,
    Color256,
    Color16,
    /// No colour at all; the terminal's defaults are used.
    Mono,
}

impl ColorMode {
    /// Detect from `COLORTERM`, `TERM` and `NO_COLOR`.
    #[must_use]
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return Self::Mono;
        }
        Self::detect_with_env(
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    /// Testable core of [`detect`](Self::detect).
    #[must_use]
    pub fn detect_with_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            return Self::TrueColor;
        }
        match term {
            Some(t) if t.contains("256color") => Self::Color256,
            Some("dumb") | None => Self::Mono,
            Some(_) => Self::Color16,
        }
    }

    /// Convert for crossterm. Fully transparent colours map to the
    /// terminal default so unpainted cells are not drawn black.
    #[must_use]
    pub fn to_crossterm(self, color: Color) -> CrosstermColor {
        if color.a == 0.0 || self == Self::Mono {
            return CrosstermColor::Reset;
        }
        let [r, g, b] = [color.r, color.g, color.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        match self {
            Self::TrueColor => CrosstermColor::Rgb { r, g, b },
            Self::Color256 => CrosstermColor::AnsiValue(rgb_to_256(r, g, b)),
            Self::Color16 | Self::Mono => rgb_to_16(r, g, b),
        }
    }
}

/// Nearest entry of the xterm 256-colour palette.
fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            249..=255 => 231,
            _ => 232 + ((r - 8) / 10).min(23),
        };
    }
    let level = |c: u8| (u16::from(c) * 5 / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Nearest of the 16 ANSI colours.
fn rgb_to_16(r: u8, g: u8, b: u8) -> CrosstermColor {
    let luminance = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    let bright = luminance > 127;
    let threshold = r.max(g).max(b) / 2;

    match (r > threshold, g > threshold, b > threshold, bright) {
        (false, false, false, false) => CrosstermColor::Black,
        (false, false, false, true) => CrosstermColor::DarkGrey,
        (true, false, false, false) => CrosstermColor::DarkRed,
        (true, false, false, true) => CrosstermColor::Red,
        (false, true, false, false) => CrosstermColor::DarkGreen,
        (false, true, false, true) => CrosstermColor::Green,
        (true, true, false, false) => CrosstermColor::DarkYellow,
        (true, true, false, true) => CrosstermColor::Yellow,
        (false, false, true, false) => CrosstermColor::DarkBlue,
        (false, false, true, true) => CrosstermColor::Blue,
        (true, false, true, false) => CrosstermColor::DarkMagenta,
        (true, false, true, true) => CrosstermColor::Magenta,
        (false, true, true, false) => CrosstermColor::DarkCyan,
        (false, true, true, true) => CrosstermColor::Cyan,
        (true, true, true, false) => CrosstermColor::Grey,
        (true, true, true, true) => CrosstermColor::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qos_core::Palette;

    #[test]
    fn test_detect_with_env() {
        assert_eq!(ColorMode::detect_with_env(Some("truecolor"), None), ColorMode::TrueColor);
        assert_eq!(ColorMode::detect_with_env(Some("24bit"), Some("xterm")), ColorMode::TrueColor);
        assert_eq!(ColorMode::detect_with_env(None, Some("xterm-256color")), ColorMode::Color256);
        assert_eq!(ColorMode::detect_with_env(None, Some("xterm")), ColorMode::Color16);
        assert_eq!(ColorMode::detect_with_env(None, Some("dumb")), ColorMode::Mono);
        assert_eq!(ColorMode::detect_with_env(None, None), ColorMode::Mono);
    }

    #[test]
    fn test_truecolor_conversion() {
        assert_eq!(
            ColorMode::TrueColor.to_crossterm(Palette::Gold.color()),
            CrosstermColor::Rgb { r: 255, g: 200, b: 0 }
        );
    }

    #[test]
    fn test_transparent_and_mono_use_terminal_default() {
        assert_eq!(ColorMode::TrueColor.to_crossterm(Color::TRANSPARENT), CrosstermColor::Reset);
        assert_eq!(ColorMode::Mono.to_crossterm(Color::VOID), CrosstermColor::Reset);
    }

    #[test]
    fn test_256_grayscale_and_cube() {
        assert_eq!(rgb_to_256(0, 0, 0), 16);
        assert_eq!(rgb_to_256(255, 255, 255), 231);
        assert!(rgb_to_256(128, 128, 128) >= 232);
        assert_eq!(rgb_to_256(255, 0, 0), 196);
        for entry in Palette::ALL {
            let c = entry.color();
            let idx = rgb_to_256((c.r * 255.0) as u8, (c.g * 255.0) as u8, (c.b * 255.0) as u8);
            assert!((16..=231).contains(&idx), "{entry:?} -> {idx}");
        }
    }

    #[test]
    fn test_16_color_mapping() {
        assert_eq!(rgb_to_16(0, 0, 0), CrosstermColor::Black);
        assert_eq!(rgb_to_16(255, 255, 255), CrosstermColor::White);
        assert_eq!(rgb_to_16(0, 212, 255), CrosstermColor::Cyan);
        assert_eq!(rgb_to_16(10, 10, 26), CrosstermColor::DarkBlue);
    }
}
