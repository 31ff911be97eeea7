//! Carousel: state machine, readiness gate, progress driver and tick
//! subscription behind one event-driven API.
//!
//! Every operation runs to completion on the caller's thread, receives the
//! host for collaborator access and returns the [`Outputs`] it produced.
//! Nothing here fails loudly: stale events and media errors are logged,
//! reported as events and otherwise ignored.

use crate::config::Config;
use crate::control::{indicator_dots, ControlSurface, IndicatorDot};
use crate::error::{CarouselError, MediaError};
use crate::host::CarouselHost;
use crate::ids::TickToken;
use crate::machine::{Phase, PlaybackMachine, PlaybackState, Transition};
use crate::outputs::{CarouselEvent, Outputs};
use crate::progress::ProgressDriver;
use crate::readiness::ReadinessTracker;
use crate::slides::SlideRegistry;

#[derive(Debug, Clone, Copy)]
enum MediaCommand {
    Play,
    Pause,
}

#[derive(Debug)]
pub struct Carousel {
    cfg: Config,
    registry: SlideRegistry,
    machine: PlaybackMachine,
    readiness: ReadinessTracker,
    progress: ProgressDriver,
    /// At most one live subscription.
    tick: Option<TickToken>,
    outputs: Outputs,
}

impl Carousel {
    pub fn new(registry: SlideRegistry, cfg: Config) -> Self {
        let count = registry.len();
        Self {
            machine: PlaybackMachine::new(count),
            readiness: ReadinessTracker::new(count, cfg.min_ready_slides),
            progress: ProgressDriver::new(count),
            tick: None,
            outputs: Outputs::default(),
            registry,
            cfg,
        }
    }

    /// Build from a deck JSON document.
    pub fn from_json(deck_json: &str, cfg: Config) -> crate::Result<Self> {
        Ok(Self::new(SlideRegistry::from_json(deck_json)?, cfg))
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn registry(&self) -> &SlideRegistry {
        &self.registry
    }

    #[inline]
    pub fn state(&self) -> &PlaybackState {
        self.machine.state()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.machine.current_index()
    }

    #[inline]
    pub fn readiness(&self) -> &ReadinessTracker {
        &self.readiness
    }

    #[inline]
    pub fn progress(&self) -> &ProgressDriver {
        &self.progress
    }

    #[inline]
    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    #[inline]
    pub fn tick_token(&self) -> Option<TickToken> {
        self.tick
    }

    /// Outputs of the most recent operation.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn control(&self) -> ControlSurface {
        ControlSurface::from_state(self.machine.state())
    }

    pub fn indicator_dots(&self) -> Vec<IndicatorDot> {
        indicator_dots(&self.registry, self.machine.state())
    }

    /// Visibility trigger fired for the current slide.
    pub fn on_slide_visible(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        let before = *self.machine.state();
        if self.machine.on_slide_visible() == Transition::Unchanged {
            return &self.outputs;
        }
        if !before.start_play {
            self.progress.activate(
                before.current_index,
                before.is_playing,
                &mut self.outputs.changes,
            );
        }
        self.sync_media(host, Some(before));
        self.sync_ticker(host);
        self.emit_phase(before.phase());
        &self.outputs
    }

    /// A slide's video reported loaded metadata.
    pub fn on_metadata_ready(&mut self, index: usize, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        let was_unlocked = self.readiness.is_playback_unlocked();
        match self.readiness.mark_ready(index) {
            Ok(true) => {}
            Ok(false) => return &self.outputs,
            Err(err) => {
                log::warn!("carousel: ignoring metadata: {err}");
                return &self.outputs;
            }
        }
        if was_unlocked || !self.readiness.is_playback_unlocked() {
            return &self.outputs;
        }

        let ready = self.readiness.ready_count();
        log::debug!("carousel: playback unlocked with {ready} slides ready");
        self.outputs
            .push_event(CarouselEvent::PlaybackUnlocked { ready });
        let state = *self.machine.state();
        if state.wants_media_playing() {
            self.command(host, state.current_index, MediaCommand::Play, None);
        }
        &self.outputs
    }

    /// A slide's video reached its end.
    pub fn on_video_ended(&mut self, index: usize, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        let before = *self.machine.state();
        let transition = match self.machine.on_video_ended(index) {
            Ok(t) => t,
            Err(CarouselError::StaleEvent { index, current }) => {
                log::debug!("carousel: discarding end of slide {index}, current is {current}");
                self.outputs
                    .push_event(CarouselEvent::StaleEventDiscarded { index, current });
                return &self.outputs;
            }
            Err(err) => {
                log::warn!("carousel: end of slide {index} rejected: {err}");
                return &self.outputs;
            }
        };

        match transition {
            Transition::ReachedEnd { index } => {
                self.outputs.push_event(CarouselEvent::SlideEnded { index });
                self.outputs
                    .push_event(CarouselEvent::SequenceEnded { index });
                self.progress.settle(&mut self.outputs.changes);
                self.resync(host);
            }
            Transition::Advanced { from, to } => {
                self.outputs
                    .push_event(CarouselEvent::SlideEnded { index: from });
                self.outputs
                    .push_event(CarouselEvent::SlideAdvanced { from, to });
                self.progress
                    .activate(to, before.is_playing, &mut self.outputs.changes);
                self.resync(host);
                // The old slide really ended; a failing play on the new one keeps the advance.
                self.sync_media(host, None);
                self.sync_ticker(host);
            }
            _ => return &self.outputs,
        }
        self.emit_phase(before.phase());
        &self.outputs
    }

    /// Play/pause, or reset to the first slide when the sequence has ended.
    pub fn on_toggle(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        let before = *self.machine.state();
        match self.machine.on_toggle() {
            Transition::Reset { from } => {
                self.outputs
                    .push_event(CarouselEvent::SequenceReset { from });
                self.progress
                    .activate(0, before.is_playing, &mut self.outputs.changes);
                self.resync(host);
                self.sync_media(host, None);
            }
            _ => {
                self.sync_media(host, Some(before));
            }
        }
        self.sync_ticker(host);
        self.emit_phase(before.phase());
        &self.outputs
    }

    /// Click on the control button; dispatches whatever the surface shows.
    pub fn on_control_click(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        log::trace!("carousel: control click as {:?}", self.control().action);
        self.on_toggle(host)
    }

    /// The current video began rendering frames without a play command.
    pub fn on_video_started_naturally(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        let before = *self.machine.state();
        if self.machine.on_video_started_naturally() == Transition::Unchanged {
            return &self.outputs;
        }
        self.sync_ticker(host);
        self.emit_phase(before.phase());
        &self.outputs
    }

    /// Frame callback from the ticker subscription.
    pub fn on_tick(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        if self.tick.is_none() {
            return &self.outputs;
        }
        let state = *self.machine.state();
        let index = state.current_index;
        let Some(duration) = self.registry.duration_secs(index) else {
            return &self.outputs;
        };
        let Some(position) = host.media(index).map(|m| m.current_time()) else {
            self.progress.settle(&mut self.outputs.changes);
            return &self.outputs;
        };
        let breakpoint = host.breakpoint();
        self.progress.sample(
            position,
            duration,
            state.is_playing,
            breakpoint,
            &mut self.outputs.changes,
        );
        &self.outputs
    }

    /// Drop the tick subscription (page teardown).
    pub fn shutdown(&mut self, host: &mut dyn CarouselHost) -> &Outputs {
        self.outputs.clear();
        if let Some(token) = self.tick.take() {
            host.ticker().unsubscribe(token);
            self.outputs.push_event(CarouselEvent::TickDetached);
        }
        &self.outputs
    }

    fn resync(&mut self, host: &mut dyn CarouselHost) {
        let index = self.machine.current_index();
        let animator = host.animator();
        animator.scroll_to(index);
        animator.arm_visibility_trigger(index);
    }

    /// Bring the current media element in line with the play intent.
    /// Commands only go out once enough slides are ready.
    fn sync_media(&mut self, host: &mut dyn CarouselHost, revert_to: Option<PlaybackState>) {
        let state = *self.machine.state();
        let index = state.current_index;
        if !self.readiness.is_playback_unlocked() {
            if state.wants_media_playing() {
                let ready = self.readiness.ready_count();
                let required = self.readiness.min_ready();
                log::debug!("carousel: deferring play of slide {index} ({ready}/{required} ready)");
                self.outputs.push_event(CarouselEvent::PlayDeferred {
                    index,
                    ready,
                    required,
                });
            }
            return;
        }
        if !state.is_playing {
            self.command(host, index, MediaCommand::Pause, revert_to);
        } else if state.start_play {
            self.command(host, index, MediaCommand::Play, revert_to);
        }
    }

    fn command(
        &mut self,
        host: &mut dyn CarouselHost,
        index: usize,
        cmd: MediaCommand,
        revert_to: Option<PlaybackState>,
    ) -> bool {
        let result = match host.media(index) {
            Some(media) => match cmd {
                MediaCommand::Play => media.play(),
                MediaCommand::Pause => media.pause(),
            },
            None => Err(MediaError::Detached { index }),
        };
        match result {
            Ok(()) => {
                self.outputs.push_event(match cmd {
                    MediaCommand::Play => CarouselEvent::PlayIssued { index },
                    MediaCommand::Pause => CarouselEvent::PauseIssued { index },
                });
                true
            }
            Err(err) => {
                log::warn!("carousel: {err}; keeping previous state");
                self.outputs.push_event(CarouselEvent::MediaFailed {
                    index,
                    message: err.to_string(),
                });
                if let Some(snapshot) = revert_to {
                    self.machine.restore(snapshot);
                }
                false
            }
        }
    }

    /// Keep exactly one subscription while playing and none otherwise.
    /// Progress is only sampled once the slide has been seen (`start_play`).
    fn sync_ticker(&mut self, host: &mut dyn CarouselHost) {
        let want = self.machine.state().wants_media_playing();
        match (want, self.tick) {
            (true, None) => {
                self.tick = Some(host.ticker().subscribe());
                self.outputs.push_event(CarouselEvent::TickAttached);
            }
            (false, Some(token)) => {
                host.ticker().unsubscribe(token);
                self.tick = None;
                self.progress.settle(&mut self.outputs.changes);
                self.outputs.push_event(CarouselEvent::TickDetached);
            }
            _ => {}
        }
    }

    fn emit_phase(&mut self, from: Phase) {
        let to = self.machine.phase();
        if from != to {
            self.outputs
                .push_event(CarouselEvent::PhaseChanged { from, to });
        }
    }
}
