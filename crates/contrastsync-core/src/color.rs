//! Color parsing and hex normalization.
//!
//! Parsing is delegated to `csscolorparser`, so anything a CSS color parser
//! accepts (named colors, hex forms, `rgb()`, `hsl()`, `hwb()`, ...) is a valid
//! input. Every accepted input normalizes to a lowercase `#rrggbb` [`Color`];
//! alpha is dropped.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContrastError;

mod contrast;
mod shades;

pub use contrast::{contrast_ratio, relative_luminance, WcagStatus};
pub use shades::{shade_ramp, Oklch, SHADE_STOPS};

/// A validated color in normalized `#rrggbb` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Build a color from 8-bit sRGB channels
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse any CSS color string
    ///
    /// Surrounding whitespace is ignored. Returns `ContrastError::InvalidColor`
    /// when the parser rejects the input.
    pub fn parse(input: &str) -> Result<Self, ContrastError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ContrastError::InvalidColor("empty color string".to_string()));
        }

        let parsed = csscolorparser::parse(trimmed)
            .map_err(|e| ContrastError::InvalidColor(format!("{trimmed}: {e}")))?;
        let [r, g, b, _] = parsed.to_rgba8();
        Ok(Self { r, g, b })
    }

    /// Parse a color carried in a URL parameter
    ///
    /// Hex values travel without the `#` prefix, so bare hex digits get one
    /// before parsing. Anything else is parsed as-is.
    pub fn from_param(value: &str) -> Result<Self, ContrastError> {
        let value = value.trim();
        let bare_hex = matches!(value.len(), 3 | 4 | 6 | 8)
            && value.bytes().all(|b| b.is_ascii_hexdigit());

        if bare_hex {
            Self::parse(&format!("#{value}"))
        } else {
            Self::parse(value)
        }
    }

    /// The 8-bit channels
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Normalized `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Hex digits without the `#` prefix, as written to URL parameters
    pub fn without_hash(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = ContrastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Whether the color parser accepts `input`
pub fn is_valid_color(input: &str) -> bool {
    Color::parse(input).is_ok()
}

/// Parse `input` and reformat it as normalized hex, or `None` if parsing fails
pub fn to_hex(input: &str) -> Option<Color> {
    Color::parse(input).ok()
}
