//! Color representation and the shell's fixed particle palette.

use serde::{Deserialize, Serialize};

/// RGBA color with values in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component [0.0, 1.0]
    pub r: f32,
    /// Green component [0.0, 1.0]
    pub g: f32,
    /// Blue component [0.0, 1.0]
    pub b: f32,
    /// Alpha component [0.0, 1.0]
    pub a: f32,
}

impl Color {
    /// Create a new color, clamping values to [0.0, 1.0].
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create an opaque color from RGB values.
    #[must_use]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque color from 8-bit channels, usable in const context.
    #[must_use]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parse a `#rrggbb` hex string (leading `#` optional).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ColorParseError::InvalidLength);
        }
        // from_str_radix alone would accept a leading sign
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex);
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or(ColorParseError::InvalidHex)
        };
        Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Black color
    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    /// White color
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    /// Transparent color
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    /// Deep space background of the home screen
    pub const VOID: Self = Self::from_rgb8(10, 10, 26);
    /// Panel chrome
    pub const SLATE: Self = Self::from_rgb8(58, 64, 96);
    /// Dimmed secondary text
    pub const MUTED: Self = Self::from_rgb8(140, 146, 172);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Closed set of particle and wave colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Cyan,
    Magenta,
    Violet,
    Gold,
    Mint,
}

impl Palette {
    /// Every palette entry, in display order.
    pub const ALL: [Self; 5] = [
        Self::Cyan,
        Self::Magenta,
        Self::Violet,
        Self::Gold,
        Self::Mint,
    ];

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Cyan => Color::from_rgb8(0, 212, 255),
            Self::Magenta => Color::from_rgb8(255, 0, 170),
            Self::Violet => Color::from_rgb8(138, 43, 226),
            Self::Gold => Color::from_rgb8(255, 200, 0),
            Self::Mint => Color::from_rgb8(0, 255, 157),
        }
    }

    /// Entry at `index`, wrapping around the palette.
    #[must_use]
    pub const fn cycle(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Invalid hex characters
    InvalidHex,
    /// Invalid string length
    InvalidLength,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "invalid hex characters"),
            Self::InvalidLength => write!(f, "invalid hex string length (expected 6)"),
        }
    }
}

impl std::error::Error for ColorParseError {}
