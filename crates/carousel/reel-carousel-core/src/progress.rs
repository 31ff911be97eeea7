//! Progress driver: one bar per indicator dot, only the active one advances.
//!
//! The active bar's fraction is `currentTime / duration` clamped to [0,1] and
//! never moves backwards within one activation. Visual updates are quantized
//! to whole percents; nothing is emitted while the rounded-up percent is
//! unchanged.
//!
//! Completion is two-phase. Reaching 1.0 schedules the collapse and freezes
//! whether the carousel was playing at that moment; the collapse resolves on
//! the next driver call (tick, settle or activation) using the frozen flag,
//! so a pause landing in between cannot suppress it.

use serde::{Deserialize, Serialize};

use crate::host::Breakpoint;
use crate::outputs::ProgressChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarWidthMode {
    Collapsed,
    /// First emission of this activation widened the dot
    Expanding,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarColor {
    Active,
    Inactive,
}

/// Width class of an indicator dot's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotWidth {
    Resting,
    Expanded(Breakpoint),
}

/// Progress state of a single indicator dot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressBar {
    fraction: f64,
    last_emitted_percent: u8,
    mode: BarWidthMode,
    color: BarColor,
    /// `Some(was_playing)` between scheduling and resolving completion.
    pending_completion: Option<bool>,
    completed: bool,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            last_emitted_percent: 0,
            mode: BarWidthMode::Collapsed,
            color: BarColor::Inactive,
            pending_completion: None,
            completed: false,
        }
    }
}

impl ProgressBar {
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    #[inline]
    pub fn mode(&self) -> BarWidthMode {
        self.mode
    }

    #[inline]
    pub fn color(&self) -> BarColor {
        self.color
    }

    #[inline]
    pub fn last_emitted_percent(&self) -> u8 {
        self.last_emitted_percent
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[inline]
    pub fn has_pending_completion(&self) -> bool {
        self.pending_completion.is_some()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn resolve_completion(&mut self, index: usize, out: &mut Vec<ProgressChange>) {
        let Some(was_playing) = self.pending_completion.take() else {
            return;
        };
        self.completed = true;
        if was_playing {
            self.mode = BarWidthMode::Collapsed;
            self.color = BarColor::Inactive;
            out.push(ProgressChange::DotWidth {
                index,
                width: DotWidth::Resting,
            });
            out.push(ProgressChange::Recolor {
                index,
                color: BarColor::Inactive,
            });
        }
    }
}

fn percent_of(fraction: f64) -> u8 {
    (fraction * 100.0).ceil().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone)]
pub struct ProgressDriver {
    bars: Vec<ProgressBar>,
    active: usize,
}

impl ProgressDriver {
    /// One bar per slide; slot 0 is active initially.
    pub fn new(slide_count: usize) -> Self {
        Self {
            bars: vec![ProgressBar::default(); slide_count.max(1)],
            active: 0,
        }
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn bar(&self, index: usize) -> Option<&ProgressBar> {
        self.bars.get(index)
    }

    #[inline]
    pub fn bars(&self) -> &[ProgressBar] {
        &self.bars
    }

    /// Fraction of the active bar.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.bars[self.active].fraction
    }

    /// Make `index` the active bar, starting it from zero.
    ///
    /// The previously active bar is finished first: a scheduled completion
    /// resolves with its frozen flag, an unfinished bar completes with
    /// `was_playing`. Index 0 is always force-restarted and announces the
    /// reset so hosts drop any stale width left from a previous cycle.
    pub fn activate(&mut self, index: usize, was_playing: bool, out: &mut Vec<ProgressChange>) {
        if index >= self.bars.len() {
            log::warn!("progress: activate({index}) outside {} bars", self.bars.len());
            return;
        }
        if self.active != index {
            self.finish(self.active, was_playing, out);
        }
        self.active = index;
        self.bars[index].reset();
        if index == 0 {
            self.bars[0].color = BarColor::Active;
            out.push(ProgressChange::Bar {
                index: 0,
                percent: 0,
                color: BarColor::Active,
            });
        }
    }

    fn finish(&mut self, index: usize, was_playing: bool, out: &mut Vec<ProgressChange>) {
        let bar = &mut self.bars[index];
        if bar.completed {
            return;
        }
        if bar.pending_completion.is_none() {
            bar.pending_completion = Some(was_playing);
        }
        bar.resolve_completion(index, out);
    }

    /// Resolve a completion scheduled on an earlier tick, if any.
    pub fn settle(&mut self, out: &mut Vec<ProgressChange>) {
        let index = self.active;
        self.bars[index].resolve_completion(index, out);
    }

    /// Feed the active slide's playback position.
    pub fn sample(
        &mut self,
        position_secs: f64,
        duration_secs: f32,
        is_playing: bool,
        breakpoint: Breakpoint,
        out: &mut Vec<ProgressChange>,
    ) {
        let index = self.active;
        let bar = &mut self.bars[index];
        bar.resolve_completion(index, out);
        if bar.completed {
            return;
        }
        if !position_secs.is_finite() || !duration_secs.is_finite() || duration_secs <= 0.0 {
            log::trace!("progress: unusable sample {position_secs}/{duration_secs} on {index}");
            return;
        }

        let fraction = (position_secs / duration_secs as f64).clamp(0.0, 1.0);
        bar.fraction = bar.fraction.max(fraction);

        let percent = percent_of(bar.fraction);
        if percent != bar.last_emitted_percent {
            bar.last_emitted_percent = percent;
            bar.mode = match bar.mode {
                BarWidthMode::Collapsed => BarWidthMode::Expanding,
                _ => BarWidthMode::Expanded,
            };
            bar.color = BarColor::Active;
            out.push(ProgressChange::DotWidth {
                index,
                width: DotWidth::Expanded(breakpoint),
            });
            out.push(ProgressChange::Bar {
                index,
                percent,
                color: BarColor::Active,
            });
            log::trace!("progress: slide {index} at {percent}%");
        }

        if bar.fraction >= 1.0 && bar.pending_completion.is_none() {
            bar.pending_completion = Some(is_playing);
        }
    }
}
