//! Control surface: the play/pause/replay button and the indicator dots.
//!
//! Both are pure functions of [`PlaybackState`]; clicks go back through
//! [`Carousel::on_control_click`](crate::Carousel::on_control_click).

use serde::{Deserialize, Serialize};

use crate::ids::SlideId;
use crate::machine::PlaybackState;
use crate::slides::SlideRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlIcon {
    Play,
    Pause,
    Replay,
}

impl ControlIcon {
    /// Icon name, also used as the image alt text.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Replay => "replay",
        }
    }
}

/// What a click on the control dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// Flip play/pause
    Toggle,
    /// Return to the first slide (the toggle's final-slide variant)
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub icon: ControlIcon,
    pub action: ControlAction,
}

impl ControlSurface {
    pub fn from_state(state: &PlaybackState) -> Self {
        if state.is_at_final_slide {
            Self {
                icon: ControlIcon::Replay,
                action: ControlAction::Reset,
            }
        } else if state.is_playing {
            Self {
                icon: ControlIcon::Pause,
                action: ControlAction::Toggle,
            }
        } else {
            Self {
                icon: ControlIcon::Play,
                action: ControlAction::Toggle,
            }
        }
    }
}

/// One dot per slide, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDot {
    pub index: usize,
    pub slide: SlideId,
    pub active: bool,
}

pub fn indicator_dots(registry: &SlideRegistry, state: &PlaybackState) -> Vec<IndicatorDot> {
    registry
        .iter()
        .enumerate()
        .map(|(index, slide)| IndicatorDot {
            index,
            slide: slide.id,
            active: index == state.current_index,
        })
        .collect()
}
