//! Core types for ContrastSync

use serde::{Deserialize, Serialize};

use crate::color::{contrast_ratio, Color, WcagStatus};

/// The tracked foreground/background pair
///
/// Both fields always hold a validated [`Color`]; there is no way to build a
/// pair from unvalidated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub foreground: Color,
    pub background: Color,
}

impl ColorPair {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }

    /// WCAG contrast ratio of the pair
    pub fn contrast_ratio(&self) -> f64 {
        contrast_ratio(&self.foreground, &self.background)
    }

    /// Foreground and background exchanged
    pub fn swapped(self) -> Self {
        Self {
            foreground: self.background,
            background: self.foreground,
        }
    }

    /// Snapshot of the pair with its derived contrast status
    pub fn state(&self) -> ColorState {
        let contrast_ratio = self.contrast_ratio();
        ColorState {
            foreground_color: self.foreground,
            background_color: self.background,
            contrast_ratio,
            wcag_status: WcagStatus::from_ratio(contrast_ratio),
        }
    }
}

/// A pair plus its derived contrast status
///
/// This is also the payload of the `colorsChanged` notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorState {
    pub foreground_color: Color,
    pub background_color: Color,
    /// Unrounded contrast ratio
    pub contrast_ratio: f64,
    pub wcag_status: WcagStatus,
}

impl ColorState {
    pub fn pair(&self) -> ColorPair {
        ColorPair::new(self.foreground_color, self.background_color)
    }
}

/// Persisted form of the pair in key-value storage
///
/// Fields are kept as raw strings so that a corrupt value in one field does not
/// invalidate the other; each is validated when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedColors {
    #[serde(default)]
    pub foreground_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
}

impl From<&ColorPair> for PersistedColors {
    fn from(pair: &ColorPair) -> Self {
        Self {
            foreground_color: Some(pair.foreground.to_hex()),
            background_color: Some(pair.background.to_hex()),
        }
    }
}
