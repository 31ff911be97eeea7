//! Core configuration for reel-carousel-core.

use serde::{Deserialize, Serialize};

/// Configuration for playback gating and viewport classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Slides that must report loaded metadata before any play command is issued.
    pub min_ready_slides: usize,
    /// Viewport widths separating narrow/medium/wide dot layouts.
    pub breakpoints: Breakpoints,
    pub hero: HeroConfig,
}

/// Lower bounds (inclusive, CSS pixels) of the medium and wide classes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub medium_min_px: u32,
    pub wide_min_px: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Viewports narrower than this get the small hero video.
    pub small_below_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_ready_slides: 3,
            breakpoints: Breakpoints::default(),
            hero: HeroConfig::default(),
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            medium_min_px: 760,
            wide_min_px: 1200,
        }
    }
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self { small_below_px: 760 }
    }
}

impl Config {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
