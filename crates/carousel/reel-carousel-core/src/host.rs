//! Collaborator contracts and an in-memory host.
//!
//! The carousel never owns page resources. Media elements, the frame ticker,
//! the slide animator and the viewport are reached through [`CarouselHost`],
//! passed into each operation the same way a resolver is passed into a bind
//! step. [`MemoryHost`] implements every contract without a browser.

use serde::{Deserialize, Serialize};

use crate::config::Breakpoints;
use crate::error::MediaError;
use crate::ids::{IdAllocator, TickToken};
use crate::slides::SlideRegistry;

/// Viewport class used to pick the expanded dot width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Breakpoint {
    Narrow,
    Medium,
    Wide,
}

impl Breakpoint {
    pub fn classify(width_px: u32, breakpoints: &Breakpoints) -> Self {
        if width_px >= breakpoints.wide_min_px {
            Self::Wide
        } else if width_px >= breakpoints.medium_min_px {
            Self::Medium
        } else {
            Self::Narrow
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Medium => "medium",
            Self::Wide => "wide",
        }
    }
}

/// A slide's video element.
pub trait MediaElement {
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self) -> Result<(), MediaError>;
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
}

/// High-frequency scheduler (one callback per rendered frame).
pub trait Ticker {
    fn subscribe(&mut self) -> TickToken;
    fn unsubscribe(&mut self, token: TickToken);
}

/// Horizontal slider animation and the scroll/visibility trigger.
pub trait SlideAnimator {
    /// Translate the slider so `index` is in view.
    fn scroll_to(&mut self, index: usize);
    /// (Re)arm the trigger that reports `on_slide_visible` for `index`.
    fn arm_visibility_trigger(&mut self, index: usize);
}

/// Everything a carousel operation may touch outside its own state.
pub trait CarouselHost {
    fn media(&mut self, index: usize) -> Option<&mut dyn MediaElement>;
    fn ticker(&mut self) -> &mut dyn Ticker;
    fn animator(&mut self) -> &mut dyn SlideAnimator;
    fn breakpoint(&self) -> Breakpoint;
}

/// Fixed-size arena of per-slide handles, indexed by slide position.
#[derive(Debug, Clone)]
pub struct MediaArena<M> {
    slots: Vec<Option<M>>,
}

impl<M> MediaArena<M> {
    pub fn with_len(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self { slots }
    }

    /// Store `handle` for `index`, returning the handle it replaced.
    pub fn attach(&mut self, index: usize, handle: M) -> Result<Option<M>, MediaError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(MediaError::Detached { index })?;
        Ok(slot.replace(handle))
    }

    pub fn detach(&mut self, index: usize) -> Option<M> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&M> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut M> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn attached(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Single process-wide frame scheduler with add/remove subscriptions.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    ids: IdAllocator,
    subscribers: Vec<TickToken>,
    frame: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    pub fn is_subscribed(&self, token: TickToken) -> bool {
        self.subscribers.contains(&token)
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Start a frame; returns the subscriptions to call back for it.
    pub fn begin_frame(&mut self) -> Vec<TickToken> {
        self.frame = self.frame.wrapping_add(1);
        self.subscribers.clone()
    }
}

impl Ticker for FrameScheduler {
    fn subscribe(&mut self) -> TickToken {
        let token = self.ids.alloc_tick();
        self.subscribers.push(token);
        token
    }

    fn unsubscribe(&mut self, token: TickToken) {
        self.subscribers.retain(|t| *t != token);
    }
}

/// Headless media element: a clock that only runs while playing.
///
/// With a known `duration` it behaves like a browser element: the clock stops
/// at the end, and `play()` on an ended element restarts from zero.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedia {
    pub index: usize,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    /// Make every following command fail.
    pub failing: bool,
}

impl MemoryMedia {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_duration(index: usize, duration_secs: f64) -> Self {
        Self {
            index,
            duration: Some(duration_secs),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.duration.is_some_and(|d| self.current_time >= d)
    }

    /// Advance the clock by `dt` seconds if playing.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.current_time += dt;
        if let Some(d) = self.duration {
            if self.current_time >= d {
                self.current_time = d;
                self.playing = false;
            }
        }
    }

    fn fail(&self, command: &str) -> MediaError {
        MediaError::CommandFailed {
            index: self.index,
            command: command.to_string(),
            reason: "element rejected the command".to_string(),
        }
    }
}

impl MediaElement for MemoryMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        if self.failing {
            return Err(self.fail("play"));
        }
        if self.is_ended() {
            self.current_time = 0.0;
        }
        self.play_calls += 1;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        if self.failing {
            return Err(self.fail("pause"));
        }
        self.pause_calls += 1;
        self.playing = false;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }
}

/// Records animator calls in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingAnimator {
    pub scrolls: Vec<usize>,
    pub armed: Vec<usize>,
}

impl SlideAnimator for RecordingAnimator {
    fn scroll_to(&mut self, index: usize) {
        self.scrolls.push(index);
    }

    fn arm_visibility_trigger(&mut self, index: usize) {
        self.armed.push(index);
    }
}

/// In-memory implementation of every collaborator.
#[derive(Debug)]
pub struct MemoryHost {
    pub media: MediaArena<MemoryMedia>,
    pub scheduler: FrameScheduler,
    pub animator: RecordingAnimator,
    pub breakpoint: Breakpoint,
}

impl MemoryHost {
    /// Host with one attached element per slide.
    pub fn new(slide_count: usize) -> Self {
        let mut media = MediaArena::with_len(slide_count);
        for index in 0..slide_count {
            // Slots exist for every index below `slide_count`.
            let _ = media.attach(index, MemoryMedia::new(index));
        }
        Self {
            media,
            scheduler: FrameScheduler::new(),
            animator: RecordingAnimator::default(),
            breakpoint: Breakpoint::Wide,
        }
    }

    /// Host whose elements know their clip lengths, taken from the deck.
    pub fn for_registry(registry: &SlideRegistry) -> Self {
        let mut host = Self::new(registry.len());
        for (index, slide) in registry.iter().enumerate() {
            let _ = host.media.attach(
                index,
                MemoryMedia::with_duration(index, slide.duration_secs as f64),
            );
        }
        host
    }

    pub fn element(&self, index: usize) -> Option<&MemoryMedia> {
        self.media.get(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut MemoryMedia> {
        self.media.get_mut(index)
    }

    /// Advance every playing element's clock.
    pub fn advance(&mut self, dt: f64) {
        for index in 0..self.media.len() {
            if let Some(m) = self.media.get_mut(index) {
                m.advance(dt);
            }
        }
    }
}

impl CarouselHost for MemoryHost {
    fn media(&mut self, index: usize) -> Option<&mut dyn MediaElement> {
        self.media
            .get_mut(index)
            .map(|m| m as &mut dyn MediaElement)
    }

    fn ticker(&mut self) -> &mut dyn Ticker {
        &mut self.scheduler
    }

    fn animator(&mut self) -> &mut dyn SlideAnimator {
        &mut self.animator
    }

    fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }
}
