//! Tunables for the synchronizer and its context.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::color::Color;
use crate::error::ContrastError;
use crate::types::ColorPair;

/// Storage key holding the persisted color pair
pub const COLORS_STORAGE_KEY: &str = "color-contrast-checker";
/// Storage key holding the raw input-value cache
pub const INPUT_VALUES_STORAGE_KEY: &str = "color-input-values";

/// Configuration for [`ColorManager`](crate::ColorManager) and
/// [`ColorContext`](crate::ColorContext)
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorConfig {
    pub default_foreground: Color,
    pub default_background: Color,
    pub storage_key: String,
    pub input_values_key: String,
    pub foreground_param: String,
    pub background_param: String,
    /// Delay before the coalesced URL rewrite
    pub debounce_ms: u64,
    /// Delay standing in for "next frame" when lifecycle checkpoints request init
    pub frame_delay_ms: u64,
    /// Publish `--color-*-{10..50}` ramps alongside the base properties
    pub shade_ramps: bool,
    pub event_capacity: usize,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            default_foreground: Color::from_rgb(0x46, 0x46, 0xff),
            default_background: Color::from_rgb(0xe6, 0xe6, 0x4a),
            storage_key: COLORS_STORAGE_KEY.to_string(),
            input_values_key: INPUT_VALUES_STORAGE_KEY.to_string(),
            foreground_param: "fg".to_string(),
            background_param: "bg".to_string(),
            debounce_ms: 150,
            frame_delay_ms: 16,
            shade_ramps: true,
            event_capacity: 256,
        }
    }
}

impl ColorConfig {
    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ContrastError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| ContrastError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn default_pair(&self) -> ColorPair {
        ColorPair::new(self.default_foreground, self.default_background)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}
