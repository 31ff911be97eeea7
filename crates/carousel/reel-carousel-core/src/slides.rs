//! Slide registry: the static, ordered deck the carousel plays through.
//!
//! JSON field names follow the landing page's constants (`video`,
//! `videoDuration`, `textLists`) so decks can be shared with the front end
//! unchanged.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::CarouselError;
use crate::ids::SlideId;

/// One carousel slide. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Slide {
    pub id: SlideId,
    /// Media reference handed to the host (usually a URL).
    #[serde(rename = "video")]
    pub video_ref: String,
    #[serde(rename = "videoDuration")]
    pub duration_secs: f32,
    #[serde(rename = "textLists", default)]
    pub caption_lines: Vec<String>,
}

#[derive(Deserialize)]
struct DeckDoc {
    slides: Vec<Slide>,
}

/// Validated, non-empty list of slides in display order.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SlideRegistry {
    slides: Vec<Slide>,
}

impl SlideRegistry {
    /// Validate and take ownership of a deck.
    pub fn new(slides: Vec<Slide>) -> crate::Result<Self> {
        if slides.is_empty() {
            return Err(CarouselError::EmptyRegistry);
        }
        let mut seen = HashSet::with_capacity(slides.len());
        for slide in &slides {
            if !slide.duration_secs.is_finite() || slide.duration_secs <= 0.0 {
                return Err(CarouselError::InvalidDuration {
                    id: slide.id.0,
                    duration: slide.duration_secs,
                });
            }
            if !seen.insert(slide.id) {
                return Err(CarouselError::DuplicateSlide { id: slide.id.0 });
            }
        }
        Ok(Self { slides })
    }

    /// Parse a deck document (`{"slides": [...]}`) or a bare slide array.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let slides: Vec<Slide> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            serde_json::from_value::<DeckDoc>(value)?.slides
        };
        Self::new(slides)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false for a constructed registry; kept for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.slides.len() - 1
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    pub fn index_of(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    /// Duration of the slide at `index`, if it exists.
    #[inline]
    pub fn duration_secs(&self, index: usize) -> Option<f32> {
        self.slides.get(index).map(|s| s.duration_secs)
    }
}

/// Horizontal offset of the slider track that brings `index` into view.
#[inline]
pub fn slide_offset_percent(index: usize) -> f32 {
    -100.0 * index as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(id: u32, duration: f32) -> Slide {
        Slide {
            id: SlideId(id),
            video_ref: format!("/v/{id}.mp4"),
            duration_secs: duration,
            caption_lines: vec![format!("caption {id}")],
        }
    }

    #[test]
    fn rejects_empty_deck() {
        assert_eq!(
            SlideRegistry::new(vec![]).unwrap_err(),
            CarouselError::EmptyRegistry
        );
    }

    #[test]
    fn rejects_non_positive_and_nan_durations() {
        let err = SlideRegistry::new(vec![slide(1, 3.0), slide(2, 0.0)]).unwrap_err();
        assert!(matches!(err, CarouselError::InvalidDuration { id: 2, .. }));
        let err = SlideRegistry::new(vec![slide(1, f32::NAN)]).unwrap_err();
        assert!(matches!(err, CarouselError::InvalidDuration { id: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = SlideRegistry::new(vec![slide(1, 3.0), slide(1, 2.0)]).unwrap_err();
        assert_eq!(err, CarouselError::DuplicateSlide { id: 1 });
    }

    #[test]
    fn parses_document_and_bare_array() {
        let doc = r#"{"slides":[{"id":1,"video":"a.mp4","videoDuration":4,"textLists":["x","y"]}]}"#;
        let reg = SlideRegistry::from_json(doc).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(0).unwrap().caption_lines, vec!["x", "y"]);

        let bare = r#"[{"id":7,"video":"b.mp4","videoDuration":2.5}]"#;
        let reg = SlideRegistry::from_json(bare).unwrap();
        assert_eq!(reg.index_of(SlideId(7)), Some(0));
        assert_eq!(reg.duration_secs(0), Some(2.5));
        assert!(reg.get(0).unwrap().caption_lines.is_empty());
    }

    #[test]
    fn offsets_move_one_viewport_per_slide() {
        assert_eq!(slide_offset_percent(0), 0.0);
        assert_eq!(slide_offset_percent(3), -300.0);
    }
}
