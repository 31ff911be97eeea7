//! Output contracts from the carousel core.
//!
//! Outputs carry the visual progress changes produced by one operation and a
//! separate list of semantic events. Adapters apply changes to the page and
//! forward events; both lists are cleared at the start of every operation.

use serde::{Deserialize, Serialize};

use crate::machine::Phase;
use crate::progress::{BarColor, DotWidth};

/// One visual update for an indicator dot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressChange {
    /// Resize the dot container
    DotWidth { index: usize, width: DotWidth },
    /// Set the inner bar to `percent` of the container in `color`
    Bar {
        index: usize,
        percent: u8,
        color: BarColor,
    },
    /// Change only the inner bar color
    Recolor { index: usize, color: BarColor },
}

/// Discrete semantic signals emitted by carousel operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CarouselEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    SlideEnded {
        index: usize,
    },
    SlideAdvanced {
        from: usize,
        to: usize,
    },
    SequenceEnded {
        index: usize,
    },
    SequenceReset {
        from: usize,
    },
    /// A play command went out to the media element
    PlayIssued {
        index: usize,
    },
    PauseIssued {
        index: usize,
    },
    /// Play intent recorded while too few slides are ready
    PlayDeferred {
        index: usize,
        ready: usize,
        required: usize,
    },
    PlaybackUnlocked {
        ready: usize,
    },
    TickAttached,
    TickDetached,
    /// Lifecycle event for a slide that is no longer current
    StaleEventDiscarded {
        index: usize,
        current: usize,
    },
    /// Media element call failed; state was kept as before the command
    MediaFailed {
        index: usize,
        message: String,
    },
}

/// Outputs returned by every Carousel operation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<ProgressChange>,
    #[serde(default)]
    pub events: Vec<CarouselEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: ProgressChange) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CarouselEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    pub fn has_event(&self, pred: impl Fn(&CarouselEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}
