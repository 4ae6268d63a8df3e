//! WCAG 2.x relative luminance and contrast ratio.

use serde::{Deserialize, Serialize};

use super::Color;

/// Convert an 8-bit sRGB channel to linear light
fn srgb_to_linear(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance: 0.2126 R + 0.7152 G + 0.0722 B over linear channels
pub fn relative_luminance(color: &Color) -> f64 {
    let [r, g, b] = color.rgb();
    0.2126 * srgb_to_linear(r) + 0.7152 * srgb_to_linear(g) + 0.0722 * srgb_to_linear(b)
}

/// Contrast ratio between two colors, in `[1, 21]`
///
/// Order independent: `(L_lighter + 0.05) / (L_darker + 0.05)`.
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pass/fail flags for the four WCAG text-contrast levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WcagStatus {
    /// Contrast ratio rounded to one decimal
    pub ratio: f64,
    /// Normal text, level AA (>= 4.5)
    #[serde(rename = "normalAA")]
    pub normal_aa: bool,
    /// Normal text, level AAA (>= 7)
    #[serde(rename = "normalAAA")]
    pub normal_aaa: bool,
    /// Large text, level AA (>= 3)
    #[serde(rename = "largeAA")]
    pub large_aa: bool,
    /// Large text, level AAA (>= 4.5)
    #[serde(rename = "largeAAA")]
    pub large_aaa: bool,
}

impl WcagStatus {
    pub const NORMAL_AA: f64 = 4.5;
    pub const NORMAL_AAA: f64 = 7.0;
    pub const LARGE_AA: f64 = 3.0;
    pub const LARGE_AAA: f64 = 4.5;

    /// Evaluate thresholds against the unrounded ratio
    pub fn from_ratio(ratio: f64) -> Self {
        Self {
            ratio: (ratio * 10.0).round() / 10.0,
            normal_aa: ratio >= Self::NORMAL_AA,
            normal_aaa: ratio >= Self::NORMAL_AAA,
            large_aa: ratio >= Self::LARGE_AA,
            large_aaa: ratio >= Self::LARGE_AAA,
        }
    }

    /// True when every level passes
    pub fn passes_all(&self) -> bool {
        self.normal_aa && self.normal_aaa && self.large_aa && self.large_aaa
    }
}
