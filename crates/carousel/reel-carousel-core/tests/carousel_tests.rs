use reel_carousel_core::{
    BarColor, CarouselEvent, Carousel, Config, ControlIcon, DotWidth, MemoryHost, Phase,
    ProgressChange, Slide, SlideId, SlideRegistry,
};

fn deck(durations: &[f32]) -> SlideRegistry {
    let slides = durations
        .iter()
        .enumerate()
        .map(|(i, d)| Slide {
            id: SlideId(i as u32 + 1),
            video_ref: format!("/videos/{i}.mp4"),
            duration_secs: *d,
            caption_lines: vec![format!("caption {i}")],
        })
        .collect();
    SlideRegistry::new(slides).unwrap()
}

fn setup(durations: &[f32]) -> (Carousel, MemoryHost) {
    let registry = deck(durations);
    let host = MemoryHost::new(registry.len());
    (Carousel::new(registry, Config::default()), host)
}

fn mark_ready(c: &mut Carousel, host: &mut MemoryHost, indices: &[usize]) {
    for i in indices {
        c.on_metadata_ready(*i, host);
    }
}

/// Every slide ready, not yet scrolled into view.
fn ready_not_visible(durations: &[f32]) -> (Carousel, MemoryHost) {
    let (mut c, mut host) = setup(durations);
    let all: Vec<usize> = (0..durations.len()).collect();
    mark_ready(&mut c, &mut host, &all);
    (c, host)
}

/// Visible + every slide ready: the usual steady state.
fn playing(durations: &[f32]) -> (Carousel, MemoryHost) {
    let (mut c, mut host) = setup(durations);
    let all: Vec<usize> = (0..durations.len()).collect();
    mark_ready(&mut c, &mut host, &all);
    c.on_slide_visible(&mut host);
    (c, host)
}

#[test]
fn visible_issues_play_once_three_slides_are_ready() {
    let (mut c, mut host) = setup(&[3.0, 3.0, 3.0, 3.0]);
    mark_ready(&mut c, &mut host, &[0, 1, 2]);
    assert!(c.readiness().is_playback_unlocked());

    let out = c.on_slide_visible(&mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::PlayIssued { index: 0 }));
    assert!(out.has_event(|e| *e == CarouselEvent::TickAttached));
    assert!(out.has_event(|e| *e
        == CarouselEvent::PhaseChanged {
            from: Phase::Idle,
            to: Phase::Playing
        }));
    assert_eq!(host.element(0).unwrap().play_calls, 1);
    assert!(c.state().is_playing && c.state().start_play);
}

#[test]
fn visible_defers_play_until_threshold_then_issues_it() {
    let (mut c, mut host) = setup(&[3.0, 3.0, 3.0, 3.0]);
    mark_ready(&mut c, &mut host, &[0, 1]);
    assert!(!c.readiness().is_playback_unlocked());

    let out = c.on_slide_visible(&mut host);
    assert!(out.has_event(|e| *e
        == CarouselEvent::PlayDeferred {
            index: 0,
            ready: 2,
            required: 3
        }));
    assert_eq!(host.element(0).unwrap().play_calls, 0);
    assert!(c.state().is_playing, "intent is recorded");

    let out = c.on_metadata_ready(3, &mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::PlaybackUnlocked { ready: 3 }));
    assert!(out.has_event(|e| *e == CarouselEvent::PlayIssued { index: 0 }));
    assert_eq!(host.element(0).unwrap().play_calls, 1);
}

#[test]
fn readiness_for_other_slides_leaves_playback_alone() {
    let (mut c, mut host) = playing(&[3.0, 3.0, 3.0]);
    let before = *c.state();
    let out = c.on_metadata_ready(2, &mut host);
    assert!(out.is_empty(), "duplicate readiness is a no-op");
    assert_eq!(*c.state(), before);
    assert_eq!(c.readiness().ready_count(), 3);
}

#[test]
fn metadata_for_unknown_slide_is_ignored() {
    let (mut c, mut host) = setup(&[3.0, 3.0, 3.0]);
    mark_ready(&mut c, &mut host, &[0, 1]);
    let out = c.on_metadata_ready(7, &mut host);
    assert!(out.is_empty());
    assert_eq!(c.readiness().ready_count(), 2);
    assert!(!c.readiness().is_playback_unlocked());
}

#[test]
fn stale_end_is_discarded() {
    let (mut c, mut host) = playing(&[3.0, 3.0, 3.0]);
    let before = *c.state();
    let out = c.on_video_ended(2, &mut host);
    assert_eq!(
        out.events,
        vec![CarouselEvent::StaleEventDiscarded {
            index: 2,
            current: 0
        }]
    );
    assert!(out.changes.is_empty());
    assert_eq!(*c.state(), before);
    assert!(host.animator.scrolls.is_empty());
}

#[test]
fn ends_advance_to_final_slide_and_resync_animator() {
    let (mut c, mut host) = playing(&[3.0, 3.0, 3.0, 3.0]);
    for i in 0..3 {
        let out = c.on_video_ended(i, &mut host);
        assert!(out.has_event(|e| *e == CarouselEvent::SlideEnded { index: i }));
        assert!(out.has_event(|e| *e
            == CarouselEvent::SlideAdvanced {
                from: i,
                to: i + 1
            }));
        assert!(out.has_event(|e| *e == CarouselEvent::PlayIssued { index: i + 1 }));
        assert!(!c.state().is_at_final_slide);
        assert_eq!(c.progress().active_index(), i + 1);
        assert_eq!(c.progress().fraction(), 0.0);
    }
    assert_eq!(c.current_index(), 3);

    let out = c.on_video_ended(3, &mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::SequenceEnded { index: 3 }));
    assert_eq!(c.phase(), Phase::EndedLast);
    assert_eq!(c.current_index(), 3);
    assert_eq!(c.control().icon, ControlIcon::Replay);

    assert_eq!(host.animator.scrolls, vec![1, 2, 3, 3]);
    assert_eq!(host.animator.armed, vec![1, 2, 3, 3]);
}

#[test]
fn last_of_three_ends_in_ended_last() {
    let (mut c, mut host) = playing(&[3.0, 3.0, 3.0]);
    c.on_video_ended(0, &mut host);
    c.on_video_ended(1, &mut host);
    assert_eq!(c.current_index(), 2);

    c.on_video_ended(2, &mut host);
    assert_eq!(c.phase(), Phase::EndedLast);
    assert!(c.state().is_at_final_slide);
    assert_eq!(c.current_index(), 2);
}

#[test]
fn replay_resets_to_first_slide_and_restarts_its_bar() {
    let (mut c, mut host) = playing(&[2.0, 2.0]);
    c.on_video_ended(0, &mut host);
    c.on_video_ended(1, &mut host);

    let out = c.on_control_click(&mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::SequenceReset { from: 1 }));
    assert!(out.changes.contains(&ProgressChange::Bar {
        index: 0,
        percent: 0,
        color: BarColor::Active
    }));
    // isPlaying stayed true, so the first slide is told to play again.
    assert!(out.has_event(|e| *e == CarouselEvent::PlayIssued { index: 0 }));
    assert_eq!(c.current_index(), 0);
    assert!(!c.state().is_at_final_slide);
    assert_eq!(c.control().icon, ControlIcon::Pause);
    assert_eq!(host.animator.scrolls.last(), Some(&0));
}

#[test]
fn reset_keeps_paused_flag() {
    let (mut c, mut host) = playing(&[2.0, 2.0]);
    c.on_video_ended(0, &mut host);
    c.on_toggle(&mut host); // pause on the last slide
    assert!(!c.state().is_playing);
    c.on_video_ended(1, &mut host); // end event racing the pause
    assert!(c.state().is_at_final_slide);

    let out = c.on_toggle(&mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::SequenceReset { from: 1 }));
    assert!(out.has_event(|e| *e == CarouselEvent::PauseIssued { index: 0 }));
    assert_eq!(c.current_index(), 0);
    assert!(!c.state().is_playing);
    assert_eq!(c.control().icon, ControlIcon::Play);
}

#[test]
fn progress_never_regresses_and_resets_on_advance() {
    let (mut c, mut host) = playing(&[4.0, 4.0]);
    host.advance(1.0);
    let out = c.on_tick(&mut host);
    assert!(out.changes.contains(&ProgressChange::Bar {
        index: 0,
        percent: 25,
        color: BarColor::Active
    }));
    assert!(out.changes.contains(&ProgressChange::DotWidth {
        index: 0,
        width: DotWidth::Expanded(host.breakpoint)
    }));
    assert_eq!(c.progress().fraction(), 0.25);

    host.element_mut(0).unwrap().current_time = 0.5;
    let out = c.on_tick(&mut host);
    assert!(out.changes.is_empty());
    assert_eq!(c.progress().fraction(), 0.25);

    c.on_video_ended(0, &mut host);
    assert_eq!(c.progress().active_index(), 1);
    assert_eq!(c.progress().fraction(), 0.0);
}

#[test]
fn pause_right_after_completion_still_collapses_the_dot() {
    let (mut c, mut host) = playing(&[3.0, 3.0]);
    host.element_mut(0).unwrap().current_time = 3.0;
    c.on_tick(&mut host);
    assert!(c.progress().bar(0).unwrap().has_pending_completion());

    let out = c.on_toggle(&mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::TickDetached));
    assert!(out.changes.contains(&ProgressChange::DotWidth {
        index: 0,
        width: DotWidth::Resting
    }));
    assert!(out.changes.contains(&ProgressChange::Recolor {
        index: 0,
        color: BarColor::Inactive
    }));
}

#[test]
fn tick_subscription_is_idempotent() {
    let (mut c, mut host) = playing(&[1.0, 1.0, 1.0]);
    assert_eq!(host.scheduler.subscriber_count(), 1);

    c.on_slide_visible(&mut host);
    c.on_video_started_naturally(&mut host);
    assert_eq!(host.scheduler.subscriber_count(), 1);

    c.on_toggle(&mut host);
    assert_eq!(host.scheduler.subscriber_count(), 0);
    assert!(!c.is_ticking());
    c.on_toggle(&mut host);
    assert_eq!(host.scheduler.subscriber_count(), 1);

    c.on_video_ended(0, &mut host);
    c.on_video_ended(1, &mut host);
    c.on_video_ended(2, &mut host);
    c.on_toggle(&mut host);
    assert_eq!(host.scheduler.subscriber_count(), 1);
    assert!(host.scheduler.is_subscribed(c.tick_token().unwrap()));

    c.shutdown(&mut host);
    assert_eq!(host.scheduler.subscriber_count(), 0);
}

#[test]
fn ticks_without_subscription_are_ignored() {
    let (mut c, mut host) = setup(&[3.0]);
    host.element_mut(0).unwrap().current_time = 1.0;
    assert!(c.on_tick(&mut host).is_empty());
}

#[test]
fn failed_pause_keeps_playing_state() {
    let (mut c, mut host) = playing(&[3.0, 3.0]);
    host.element_mut(0).unwrap().failing = true;

    let out = c.on_toggle(&mut host);
    assert!(out.has_event(|e| matches!(e, CarouselEvent::MediaFailed { index: 0, .. })));
    assert!(c.state().is_playing);
    assert!(c.is_ticking());
    assert_eq!(c.control().icon, ControlIcon::Pause);
}

#[test]
fn failed_play_on_visible_keeps_idle_state() {
    let (mut c, mut host) = setup(&[3.0, 3.0, 3.0]);
    mark_ready(&mut c, &mut host, &[0, 1, 2]);
    host.element_mut(0).unwrap().failing = true;

    let out = c.on_slide_visible(&mut host);
    assert!(out.has_event(|e| matches!(e, CarouselEvent::MediaFailed { index: 0, .. })));
    assert_eq!(c.phase(), Phase::Idle);
    assert!(!c.is_ticking());
}

#[test]
fn natural_start_forces_playing() {
    let (mut c, mut host) = setup(&[3.0, 3.0]);
    let out = c.on_video_started_naturally(&mut host);
    assert!(!out.has_event(|e| *e == CarouselEvent::TickAttached));
    assert!(c.state().is_playing);
    assert!(!c.is_ticking(), "no sampling before the slide is seen");
    assert_eq!(c.control().icon, ControlIcon::Pause);
    assert_eq!(host.element(0).unwrap().play_calls, 0);
}

#[test]
fn autoplay_before_visible_keeps_progress_monotonic() {
    let (mut c, mut host) = setup(&[4.0, 4.0, 4.0, 4.0]);
    mark_ready(&mut c, &mut host, &[0, 1, 2, 3]);
    host.element_mut(0).unwrap().playing = true;
    c.on_video_started_naturally(&mut host);

    host.advance(2.0);
    assert!(c.on_tick(&mut host).is_empty());

    let out = c.on_slide_visible(&mut host);
    assert!(out.has_event(|e| *e == CarouselEvent::TickAttached));
    assert_eq!(c.current_index(), 0);

    let out = c.on_tick(&mut host);
    assert!(out.changes.contains(&ProgressChange::Bar {
        index: 0,
        percent: 50,
        color: BarColor::Active
    }));
    assert_eq!(c.progress().fraction(), 0.5);

    host.advance(1.0);
    c.on_tick(&mut host);
    assert_eq!(c.progress().fraction(), 0.75);
}

#[test]
fn toggle_before_visible_does_not_sample() {
    let (mut c, mut host) = ready_not_visible(&[4.0, 4.0, 4.0]);
    c.on_toggle(&mut host);
    assert!(c.state().is_playing);
    assert!(!c.is_ticking());
    assert_eq!(host.scheduler.subscriber_count(), 0);

    c.on_slide_visible(&mut host);
    assert!(c.is_ticking());
    assert_eq!(host.scheduler.subscriber_count(), 1);
}

#[test]
fn indicator_dots_follow_current_slide() {
    let (mut c, mut host) = playing(&[3.0, 3.0, 3.0]);
    c.on_video_ended(0, &mut host);
    let dots = c.indicator_dots();
    assert_eq!(dots.len(), 3);
    let active: Vec<usize> = dots.iter().filter(|d| d.active).map(|d| d.index).collect();
    assert_eq!(active, vec![1]);
}

#[test]
fn frame_driven_run_completes_every_dot() {
    let (mut c, mut host) = playing(&[0.5, 0.25, 0.75]);
    let dt = 1.0 / 60.0;
    let mut changes = Vec::new();
    let mut max_subscribers = 0;
    let mut frames = 0;

    while !c.state().is_at_final_slide && frames < 10_000 {
        host.advance(dt);
        for _token in host.scheduler.begin_frame() {
            changes.extend(c.on_tick(&mut host).changes.iter().cloned());
        }
        let index = c.current_index();
        let duration = c.registry().duration_secs(index).unwrap() as f64;
        if host.element(index).unwrap().current_time >= duration {
            host.element_mut(index).unwrap().playing = false;
            changes.extend(c.on_video_ended(index, &mut host).changes.iter().cloned());
        }
        max_subscribers = max_subscribers.max(host.scheduler.subscriber_count());
        frames += 1;
    }

    assert!(c.state().is_at_final_slide, "run did not finish");
    assert_eq!(max_subscribers, 1);
    for index in 0..3 {
        assert!(
            changes.contains(&ProgressChange::DotWidth {
                index,
                width: DotWidth::Resting
            }),
            "dot {index} never collapsed"
        );
        assert!(c.progress().bar(index).unwrap().is_completed());
    }
}

#[test]
fn replay_restarts_first_clip_from_zero() {
    let registry = deck(&[0.5, 0.5]);
    let mut host = MemoryHost::for_registry(&registry);
    let cfg = Config {
        min_ready_slides: 2,
        ..Config::default()
    };
    let mut c = Carousel::new(registry, cfg);
    mark_ready(&mut c, &mut host, &[0, 1]);
    c.on_slide_visible(&mut host);

    host.advance(0.5);
    assert!(host.element(0).unwrap().is_ended());
    c.on_video_ended(0, &mut host);
    host.advance(0.5);
    c.on_video_ended(1, &mut host);
    assert!(c.state().is_at_final_slide);

    c.on_control_click(&mut host);
    assert_eq!(host.element(0).unwrap().current_time, 0.0);

    host.advance(0.1);
    c.on_tick(&mut host);
    assert!((c.progress().fraction() - 0.2).abs() < 1e-9);
    assert!(!c.progress().bar(0).unwrap().has_pending_completion());
}
