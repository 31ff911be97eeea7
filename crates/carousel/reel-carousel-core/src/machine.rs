//! Playback state machine.
//!
//! Owns the current slide index and the play/end flags. Every operation
//! reports what changed as a [`Transition`]; side effects (media commands,
//! progress resets, scroll resync) belong to [`Carousel`](crate::Carousel).
//!
//! ```text
//! Idle ──visible──▶ Playing ◀──toggle──▶ Paused
//!                      │ ended(current), not last
//!                      ▼
//!                 EndedNotLast ──(same step)──▶ Playing @ index+1
//!                      │ ended(current), last
//!                      ▼
//!                   EndedLast ──toggle (reset)──▶ index 0, isPlaying unchanged
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CarouselError;

/// Coarse state derived from the playback flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing has been played yet
    Idle,
    Playing,
    Paused,
    /// Current slide finished and the next one is about to start
    EndedNotLast,
    /// Final slide finished; the control offers replay
    EndedLast,
}

impl Phase {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::EndedNotLast => "ended_not_last",
            Self::EndedLast => "ended_last",
        }
    }
}

/// Mutable playback flags. Single live instance per carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    /// Set once the visibility trigger fired; play commands need it.
    pub start_play: bool,
    pub has_reached_end_of_current: bool,
    pub is_at_final_slide: bool,
}

impl PlaybackState {
    pub fn phase(&self) -> Phase {
        if self.is_at_final_slide {
            Phase::EndedLast
        } else if self.has_reached_end_of_current {
            Phase::EndedNotLast
        } else if self.is_playing {
            Phase::Playing
        } else if self.start_play {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }

    /// Play intent that should reach the media element (subject to readiness).
    #[inline]
    pub fn wants_media_playing(&self) -> bool {
        self.is_playing && self.start_play
    }
}

/// What an operation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Unchanged,
    /// Visibility trigger recorded play intent
    Started,
    Advanced { from: usize, to: usize },
    ReachedEnd { index: usize },
    /// Replay control moved back to the first slide
    Reset { from: usize },
    Resumed,
    Paused,
    /// Media began rendering on its own (autoplay)
    ForcedPlaying,
}

#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    state: PlaybackState,
    last_index: usize,
}

impl PlaybackMachine {
    /// `slide_count` must be non-zero; a validated registry guarantees it.
    pub fn new(slide_count: usize) -> Self {
        Self {
            state: PlaybackState::default(),
            last_index: slide_count.saturating_sub(1),
        }
    }

    #[inline]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.last_index + 1
    }

    /// Put back a snapshot taken before a transition whose media command failed.
    pub fn restore(&mut self, snapshot: PlaybackState) {
        debug_assert!(snapshot.current_index <= self.last_index);
        self.state = snapshot;
    }

    pub fn on_slide_visible(&mut self) -> Transition {
        if self.state.is_playing && self.state.start_play {
            return Transition::Unchanged;
        }
        self.state.is_playing = true;
        self.state.start_play = true;
        Transition::Started
    }

    /// Honor the end of the current slide. Ends for any other index are stale.
    pub fn on_video_ended(&mut self, index: usize) -> crate::Result<Transition> {
        let current = self.state.current_index;
        if index != current {
            return Err(CarouselError::StaleEvent { index, current });
        }
        if self.state.is_at_final_slide {
            return Ok(Transition::Unchanged);
        }
        if index == self.last_index {
            self.state.is_at_final_slide = true;
            return Ok(Transition::ReachedEnd { index });
        }

        self.state.has_reached_end_of_current = true;
        let to = index + 1;
        self.state.current_index = to;
        self.state.is_playing = true;
        self.state.has_reached_end_of_current = false;
        Ok(Transition::Advanced { from: index, to })
    }

    pub fn on_toggle(&mut self) -> Transition {
        if self.state.is_at_final_slide {
            let from = self.state.current_index;
            self.state.current_index = 0;
            self.state.is_at_final_slide = false;
            return Transition::Reset { from };
        }
        self.state.is_playing = !self.state.is_playing;
        if self.state.is_playing {
            Transition::Resumed
        } else {
            Transition::Paused
        }
    }

    pub fn on_video_started_naturally(&mut self) -> Transition {
        if self.state.is_playing {
            return Transition::Unchanged;
        }
        self.state.is_playing = true;
        Transition::ForcedPlaying
    }
}
