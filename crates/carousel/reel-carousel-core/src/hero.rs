//! Hero video source selection.
//!
//! The hero loops one of two encodes depending on viewport width. The page
//! keys the element by its source, so a resize only reports a source when the
//! selection actually changes; otherwise the playing video would remount.

use serde::{Deserialize, Serialize};

use crate::config::HeroConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroSource {
    Small,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroVideo {
    pub large: String,
    pub small: String,
    #[serde(skip)]
    selected: Option<HeroSource>,
    #[serde(skip)]
    cfg: HeroConfig,
}

impl HeroVideo {
    pub fn new(large: impl Into<String>, small: impl Into<String>, cfg: HeroConfig) -> Self {
        Self {
            large: large.into(),
            small: small.into(),
            selected: None,
            cfg,
        }
    }

    /// Parse `{ "large": ..., "small": ... }`.
    pub fn from_json(json: &str, cfg: HeroConfig) -> crate::Result<Self> {
        let mut hero: HeroVideo = serde_json::from_str(json)?;
        hero.cfg = cfg;
        Ok(hero)
    }

    pub fn source_for_width(&self, width_px: u32) -> HeroSource {
        if width_px < self.cfg.small_below_px {
            HeroSource::Small
        } else {
            HeroSource::Large
        }
    }

    pub fn url(&self, source: HeroSource) -> &str {
        match source {
            HeroSource::Small => &self.small,
            HeroSource::Large => &self.large,
        }
    }

    #[inline]
    pub fn selected(&self) -> Option<HeroSource> {
        self.selected
    }

    /// Select the source for the initial viewport and return its URL.
    pub fn mount(&mut self, width_px: u32) -> &str {
        let source = self.source_for_width(width_px);
        self.selected = Some(source);
        self.url(source)
    }

    /// Returns the new URL only if the resize changes the selected source.
    pub fn on_resize(&mut self, width_px: u32) -> Option<&str> {
        let source = self.source_for_width(width_px);
        if self.selected == Some(source) {
            return None;
        }
        log::debug!("hero: switching to {source:?} source at {width_px}px");
        self.selected = Some(source);
        Some(self.url(source))
    }
}
