use super::*;
use crate::markup::WaveformBar;
use crate::media::fake::FakeFactory;
use crate::media::{MediaFactory, MediaRegistry};
use proptest::prelude::*;
use std::time::Duration;

struct Rig {
    registry: MediaRegistry,
    factory: FakeFactory,
    floating: FloatingHandle,
}

fn rig_with(immediate: bool, draggable: bool) -> Rig {
    let registry = MediaRegistry::new();
    let factory = FakeFactory::new(
        &[("a.mp3", 200.0), ("b.mp3", 100.0), ("c.mp3", 60.0)],
        immediate,
    );
    let floating = FloatingPlayer::mount(&registry, factory.create(None), draggable);
    Rig {
        registry,
        factory,
        floating,
    }
}

fn rig() -> Rig {
    rig_with(true, true)
}

fn bars(n: usize) -> Vec<WaveformBar> {
    vec![
        WaveformBar {
            height: 0.5,
            active: false,
        };
        n
    ]
}

fn widget(rig: &Rig, src: &str) -> TrackWidget {
    TrackWidget::new(
        TrackInfo::new(src).with_title(src.trim_end_matches(".mp3")),
        Some(rig.factory.create(Some(src))),
        &rig.registry,
        Some(&rig.floating),
        bars(10),
        true,
    )
}

#[test]
fn format_time_renders_minutes_and_padded_seconds() {
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(59.9), "0:59");
    assert_eq!(format_time(3600.0), "60:00");
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
    assert_eq!(format_time(-3.0), "0:00");
}

#[test]
fn sync_time_keeps_progress_derived() {
    let mut s = PlaybackState::default();
    s.sync_time(50.0, Some(200.0));
    assert_eq!(s.progress, 25.0);

    s.sync_time(50.0, None);
    assert_eq!(s.duration, 0.0);
    assert_eq!(s.progress, 0.0);

    s.sync_time(f64::NAN, Some(200.0));
    assert_eq!(s.current_time, 0.0);
    assert_eq!(s.progress, 0.0);
}

proptest! {
    #[test]
    fn progress_stays_within_bounds(current in -1e6f64..1e6, duration in -1e6f64..1e6) {
        let mut s = PlaybackState::default();
        s.sync_time(current, Some(duration));
        prop_assert!((0.0..=100.0).contains(&s.progress));
        if s.duration > 0.0 && s.current_time <= s.duration {
            let expected = s.current_time / s.duration * 100.0;
            prop_assert!((s.progress - expected).abs() < 1e-9);
        }
        if s.duration == 0.0 {
            prop_assert_eq!(s.progress, 0.0);
        }
    }

    #[test]
    fn drag_never_leaves_the_viewport(
        px in -5000i32..5000,
        py in -5000i32..5000,
        vw in 300i32..4000,
        vh in 60i32..4000,
    ) {
        let mut drag = DragState::default();
        drag.begin(Point::new(10, 10), Point::new(0, 0));
        let pos = drag.move_to(Point::new(px, py), Size::new(vw, vh), Size::new(300, 60)).unwrap();
        prop_assert!(pos.x >= 0 && pos.x <= vw - 300);
        prop_assert!(pos.y >= 0 && pos.y <= vh - 60);
    }
}

#[test]
fn loading_another_track_moves_the_detachment() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let mut b = widget(&rig, "b.mp3");

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 0.0, false);
    a.update_display();
    b.update_display();
    assert!(a.is_detached());
    assert!(!b.is_detached());

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("b.mp3"), 0.0, false);
    assert!(!a.is_detached());
    assert!(b.is_detached());
}

#[test]
fn starting_a_widget_pauses_every_other_handle() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let mut b = widget(&rig, "b.mp3");
    let mut c = widget(&rig, "c.mp3");

    a.toggle();
    assert!(a.local_state().playing);

    b.toggle();
    assert!(!a.local_state().playing);
    assert!(rig.factory.control_for("a.mp3").is_paused());
    assert!(b.local_state().playing);
    assert_eq!(rig.registry.playing_count(), 1);

    c.detach();
    // c was paused, so the floating player loads it without playing.
    assert!(!rig.floating.borrow().state().playing);
    rig.floating.borrow_mut().toggle();
    assert!(rig.floating.borrow().state().playing);
    assert!(!b.local_state().playing);
    assert_eq!(rig.registry.playing_count(), 1);
}

#[test]
fn starting_a_widget_pauses_the_floating_player_but_keeps_it_loaded() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let mut b = widget(&rig, "b.mp3");

    a.toggle();
    a.detach();
    assert!(rig.floating.borrow().state().playing);

    b.toggle();
    let floating = rig.floating.borrow();
    assert!(!floating.state().playing);
    assert!(floating.is_active());
    assert_eq!(floating.src(), Some("a.mp3"));
    assert!(rig.factory.empty_control().is_paused());
}

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    Seek(usize, f64),
    Detach(usize),
    FloatingToggle,
    FloatingSeek(f64),
    Close,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3).prop_map(Op::Toggle),
        (0usize..3, 0.0f64..=1.0).prop_map(|(i, f)| Op::Seek(i, f)),
        (0usize..3).prop_map(Op::Detach),
        Just(Op::FloatingToggle),
        (0.0f64..=1.0).prop_map(Op::FloatingSeek),
        Just(Op::Close),
    ]
}

proptest! {
    #[test]
    fn at_most_one_handle_plays_after_any_sequence(ops in prop::collection::vec(op(), 1..40)) {
        let rig = rig();
        let mut widgets = vec![widget(&rig, "a.mp3"), widget(&rig, "b.mp3"), widget(&rig, "c.mp3")];

        for op in ops {
            match op {
                Op::Toggle(i) => widgets[i].toggle(),
                Op::Seek(i, f) => widgets[i].seek(f),
                Op::Detach(i) => widgets[i].detach(),
                Op::FloatingToggle => rig.floating.borrow_mut().toggle(),
                Op::FloatingSeek(f) => rig.floating.borrow_mut().seek(f),
                Op::Close => rig.floating.borrow_mut().close(),
            }
            prop_assert!(rig.registry.playing_count() <= 1);

            let detached: Vec<&str> = widgets
                .iter()
                .filter(|w| w.is_detached())
                .map(|w| w.info().src.as_str())
                .collect();
            let floating_src = rig.floating.borrow().src().map(str::to_string);
            match floating_src {
                Some(src) => {
                    prop_assert_eq!(detached, vec![src.as_str()]);
                }
                None => {
                    prop_assert!(detached.is_empty());
                }
            }

            for w in &widgets {
                let p = w.effective_state().progress;
                prop_assert!((0.0..=100.0).contains(&p));
            }
        }
    }
}

#[test]
fn close_twice_equals_close_once() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.toggle();
    a.seek(0.25);
    a.detach();
    {
        let mut f = rig.floating.borrow_mut();
        assert!(f.pointer_down(Point::new(5, 5), Point::new(0, 0), false));
        f.pointer_move(Point::new(100, 100), Size::new(1000, 800), Size::new(300, 60));
        f.pointer_up();
    }

    rig.floating.borrow_mut().close();
    let once = {
        let f = rig.floating.borrow();
        (
            f.state(),
            f.is_active(),
            f.src().map(str::to_string),
            f.readiness(),
            f.placement(),
            f.markup().clone(),
        )
    };

    rig.floating.borrow_mut().close();
    let twice = {
        let f = rig.floating.borrow();
        (
            f.state(),
            f.is_active(),
            f.src().map(str::to_string),
            f.readiness(),
            f.placement(),
            f.markup().clone(),
        )
    };

    assert_eq!(once, twice);
    assert!(!twice.1);
    assert_eq!(twice.2, None);
    assert_eq!(twice.3, Readiness::Idle);
    assert_eq!(twice.4, Placement::Docked);
    assert_eq!(twice.0.current_time, 0.0);
    assert_eq!(twice.0.progress, 0.0);
    assert!(!twice.0.playing);
    assert!(!twice.5.visible);
}

#[test]
fn detach_then_close_restores_the_local_position() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.seek(0.3);
    a.toggle();
    let before = a.local_state().current_time;
    assert_eq!(before, 60.0);

    a.detach();
    assert!(a.is_detached());
    rig.factory.empty_control().advance(25.0);
    rig.floating.borrow_mut().pump();

    rig.floating.borrow_mut().close();
    a.update_display();
    assert!(!a.is_detached());
    assert!(!a.markup().detached);
    assert_eq!(a.local_state().current_time, before);
    assert_eq!(a.effective_state().current_time, before);
}

#[test]
fn detaching_a_playing_track_hands_playback_to_the_floating_player() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");

    a.seek(0.5);
    assert_eq!(a.local_state().current_time, 100.0);

    a.toggle();
    assert!(a.local_state().playing);

    a.detach();
    let floating = rig.floating.borrow();
    assert_eq!(floating.src(), Some("a.mp3"));
    assert_eq!(floating.readiness(), Readiness::Ready);
    assert!(floating.state().playing);
    assert_eq!(floating.state().current_time, 100.0);
    assert_eq!(floating.state().progress, 50.0);
    drop(floating);

    assert!(a.is_detached());
    assert!(!a.local_state().playing);
    assert!(rig.factory.control_for("a.mp3").is_paused());
    assert_eq!(a.effective_state().progress, 50.0);

    let active: Vec<bool> = a.markup().bars.iter().map(|b| b.active).collect();
    assert_eq!(active, [true, true, true, true, true, false, false, false, false, false]);
    assert_eq!(a.markup().time_label, "1:40");
    assert!(a.markup().detached);
    assert!(a.markup().playing);
}

#[test]
fn deferred_start_applies_exactly_once_when_ready() {
    let rig = rig_with(false, false);
    let ctl = rig.factory.empty_control();

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 42.0, true);
    {
        let f = rig.floating.borrow();
        assert!(f.is_active());
        assert!(matches!(f.readiness(), Readiness::Loading { .. }));
        assert!(!f.state().playing);
    }
    assert_eq!(ctl.current_time(), 0.0);

    ctl.become_ready();
    rig.floating.borrow_mut().pump();
    {
        let f = rig.floating.borrow();
        assert_eq!(f.readiness(), Readiness::Ready);
        assert!(f.state().playing);
        assert_eq!(f.state().current_time, 42.0);
        assert_eq!(f.state().duration, 200.0);
    }

    ctl.advance(10.0);
    ctl.become_ready();
    rig.floating.borrow_mut().pump();
    assert_eq!(rig.floating.borrow().state().current_time, 52.0);
}

#[test]
fn a_newer_load_replaces_the_pending_start() {
    let rig = rig_with(false, false);
    let ctl = rig.factory.empty_control();

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 42.0, true);
    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 7.0, false);

    ctl.become_ready();
    rig.floating.borrow_mut().pump();
    let f = rig.floating.borrow();
    assert_eq!(f.state().current_time, 7.0);
    assert!(!f.state().playing);
    assert_eq!(ctl.loads(), 1);
}

#[test]
fn pending_start_is_dropped_on_close() {
    let rig = rig_with(false, false);
    let ctl = rig.factory.empty_control();

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 42.0, true);
    rig.floating.borrow_mut().close();

    ctl.become_ready();
    rig.floating.borrow_mut().pump();
    let f = rig.floating.borrow();
    assert!(!f.state().playing);
    assert!(ctl.is_paused());
    assert_eq!(ctl.current_time(), 0.0);
}

#[test]
fn toggle_while_loading_flips_the_queued_autoplay() {
    let rig = rig_with(false, false);
    let ctl = rig.factory.empty_control();

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("b.mp3"), 0.0, false);
    rig.floating.borrow_mut().toggle();
    assert!(rig.floating.borrow().state().playing);

    ctl.become_ready();
    rig.floating.borrow_mut().pump();
    assert!(rig.floating.borrow().state().playing);
    assert!(!ctl.is_paused());
}

#[test]
fn ended_stops_at_zero_but_keeps_the_track_loaded() {
    let rig = rig();
    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("c.mp3"), 30.0, true);

    rig.factory.empty_control().finish();
    rig.floating.borrow_mut().pump();

    let f = rig.floating.borrow();
    assert!(f.is_active());
    assert_eq!(f.src(), Some("c.mp3"));
    assert!(!f.state().playing);
    assert_eq!(f.state().current_time, 0.0);
    assert_eq!(f.state().progress, 0.0);
    assert!(f.markup().visible);
    assert_eq!(rig.factory.empty_control().current_time(), 0.0);
}

#[test]
fn floating_toggle_and_seek_need_a_loaded_track() {
    let rig = rig();
    rig.floating.borrow_mut().toggle();
    rig.floating.borrow_mut().seek(0.5);
    let f = rig.floating.borrow();
    assert!(!f.state().playing);
    assert_eq!(f.state().current_time, 0.0);
    assert!(!f.markup().visible);
}

#[test]
fn seeks_without_a_duration_are_ignored() {
    let rig = rig_with(false, false);
    let mut a = widget(&rig, "a.mp3");
    a.seek(0.5);
    assert_eq!(a.local_state().current_time, 0.0);

    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("b.mp3"), 0.0, false);
    rig.floating.borrow_mut().seek(0.5);
    assert_eq!(rig.floating.borrow().state().current_time, 0.0);
}

#[test]
fn dragging_clamps_to_the_viewport() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.detach();

    let mut f = rig.floating.borrow_mut();
    assert_eq!(f.placement(), Placement::Docked);
    assert!(f.pointer_down(Point::new(350, 740), Point::new(350, 740), false));
    let pos = f.pointer_move(Point::new(1200, 10), Size::new(1000, 800), Size::new(300, 60));
    assert_eq!(pos, Some(Point::new(700, 10)));
    f.pointer_up();
    assert!(!f.is_dragging());
    assert_eq!(f.placement(), Placement::Absolute(Point::new(700, 10)));

    // Pausing keeps the pinned position; only closing resets it.
    f.toggle();
    assert_eq!(f.markup().placement, Placement::Absolute(Point::new(700, 10)));
    f.close();
    assert_eq!(f.placement(), Placement::Docked);
    assert_eq!(f.markup().placement, Placement::Docked);
}

#[test]
fn dragging_keeps_the_grab_offset_and_resumes_from_the_pinned_position() {
    let mut drag = DragState::default();
    drag.begin(Point::new(120, 700), Point::new(100, 690));
    let pos = drag.move_to(Point::new(220, 600), Size::new(1000, 800), Size::new(300, 60));
    assert_eq!(pos, Some(Point::new(200, 590)));
    drag.end();
    assert_eq!(drag.placement(), Placement::Absolute(Point::new(200, 590)));

    // The stale origin passed in is ignored once a position is pinned.
    drag.begin(Point::new(210, 600), Point::new(0, 0));
    let pos = drag.move_to(Point::new(230, 600), Size::new(1000, 800), Size::new(300, 60));
    assert_eq!(pos, Some(Point::new(220, 590)));
}

#[test]
fn drag_needs_a_draggable_active_player_and_a_non_button_target() {
    let pinned = rig_with(true, false);
    pinned
        .floating
        .borrow_mut()
        .load(TrackInfo::new("a.mp3"), 0.0, false);
    assert!(!pinned
        .floating
        .borrow_mut()
        .pointer_down(Point::new(1, 1), Point::new(0, 0), false));

    let movable = rig();
    let mut f = movable.floating.borrow_mut();
    assert!(!f.pointer_down(Point::new(1, 1), Point::new(0, 0), false));
    f.load(TrackInfo::new("a.mp3"), 0.0, false);
    assert!(!f.pointer_down(Point::new(1, 1), Point::new(0, 0), true));
    assert!(f.pointer_down(Point::new(1, 1), Point::new(0, 0), false));
    assert_eq!(
        f.pointer_move(Point::new(1, 1), Size::new(100, 100), Size::new(10, 10)),
        Some(Point::new(0, 0))
    );
}

#[test]
fn a_load_mid_drag_supersedes_the_track_but_keeps_the_position() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let mut b = widget(&rig, "b.mp3");
    a.detach();

    {
        let mut f = rig.floating.borrow_mut();
        f.pointer_down(Point::new(10, 10), Point::new(0, 0), false);
        f.pointer_move(Point::new(60, 60), Size::new(1000, 800), Size::new(300, 60));
    }

    b.detach();
    assert!(!a.is_detached());
    assert!(b.is_detached());

    let mut f = rig.floating.borrow_mut();
    assert_eq!(f.src(), Some("b.mp3"));
    assert!(f.is_dragging());
    let pos = f.pointer_move(Point::new(70, 70), Size::new(1000, 800), Size::new(300, 60));
    assert_eq!(pos, Some(Point::new(60, 60)));
}

#[test]
fn detach_without_a_floating_player_is_a_no_op() {
    let registry = MediaRegistry::new();
    let factory = FakeFactory::new(&[("a.mp3", 200.0)], true);
    let mut a = TrackWidget::new(
        TrackInfo::new("a.mp3"),
        Some(factory.create(Some("a.mp3"))),
        &registry,
        None,
        bars(4),
        true,
    );
    a.toggle();
    a.detach();
    assert!(!a.is_detached());
    assert!(a.local_state().playing);
}

#[test]
fn dropping_the_floating_player_leaves_widgets_attached() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.detach();
    assert!(a.is_detached());

    let Rig {
        registry, floating, ..
    } = rig;
    drop(floating);
    assert!(!a.is_detached());

    a.toggle();
    assert!(a.local_state().playing);
    assert_eq!(registry.playing_count(), 1);
    a.detach();
    assert!(!a.is_detached());
}

#[test]
fn detaching_twice_does_not_rewind_the_floating_player() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.seek(0.5);
    a.toggle();
    a.detach();

    let ctl = rig.factory.empty_control();
    ctl.advance(50.0);
    rig.floating.borrow_mut().pump();
    assert_eq!(rig.floating.borrow().state().current_time, 150.0);

    a.detach();
    assert_eq!(rig.floating.borrow().state().current_time, 150.0);
    assert_eq!(ctl.loads(), 1);
}

#[test]
fn detached_widgets_ignore_their_local_clock() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.seek(0.5);
    a.detach();

    rig.factory.control_for("a.mp3").finish();
    a.pump();
    assert_eq!(a.local_state().current_time, 100.0);
    assert_eq!(a.local_state().progress, 50.0);
}

#[test]
fn widget_controls_forward_to_the_floating_player_while_detached() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    a.toggle();
    a.detach();

    a.toggle();
    assert!(!rig.floating.borrow().state().playing);
    assert!(!a.markup().playing);

    a.seek(0.25);
    assert_eq!(rig.floating.borrow().state().current_time, 50.0);
    assert_eq!(a.local_state().current_time, 0.0);
}

#[test]
fn a_widget_mounted_after_its_track_was_loaded_starts_detached() {
    let rig = rig();
    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("b.mp3"), 0.0, false);
    let b = widget(&rig, "b.mp3");
    assert!(b.is_detached());
    assert!(b.markup().detached);
}

#[test]
fn dropped_widgets_are_pruned_from_broadcasts() {
    let rig = rig();
    {
        let _a = widget(&rig, "a.mp3");
    }
    let b = widget(&rig, "b.mp3");
    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("b.mp3"), 0.0, false);
    assert!(b.is_detached());
    assert_eq!(rig.registry.len(), 2);
}

#[test]
fn time_label_shows_the_pre_rendered_duration_until_playback() {
    let rig = rig();
    let mut a = TrackWidget::new(
        TrackInfo::new("a.mp3").with_duration(Duration::from_secs(200)),
        Some(rig.factory.create(Some("a.mp3"))),
        &rig.registry,
        Some(&rig.floating),
        bars(4),
        true,
    );
    assert_eq!(a.markup().time_label, "3:20");
    a.seek(0.5);
    assert_eq!(a.markup().time_label, "1:40");

    let ctl = rig.factory.control_for("a.mp3");
    a.toggle();
    ctl.finish();
    a.pump();
    assert_eq!(a.local_state().current_time, 0.0);
    assert_eq!(a.markup().time_label, "3:20");
}

#[test]
fn plays_count_starts_from_the_beginning() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let ctl = rig.factory.control_for("a.mp3");
    assert_eq!(a.markup().plays, None);

    a.toggle();
    assert_eq!(a.markup().plays, Some(1));

    ctl.advance(10.0);
    a.pump();
    a.toggle();
    a.toggle();
    assert_eq!(a.markup().plays, Some(1));

    ctl.finish();
    a.pump();
    a.toggle();
    assert_eq!(a.markup().plays, Some(2));
}

#[test]
fn forwarded_starts_count_as_plays() {
    let rig = rig();
    let mut b = widget(&rig, "b.mp3");
    b.detach();
    assert_eq!(b.markup().plays, None);

    b.toggle();
    assert!(rig.floating.borrow().state().playing);
    assert_eq!(b.markup().plays, Some(1));
}

#[test]
fn detaching_an_ended_track_starts_the_floating_player_at_zero() {
    let rig = rig();
    let mut a = widget(&rig, "a.mp3");
    let ctl = rig.factory.control_for("a.mp3");
    a.toggle();
    ctl.finish();
    a.pump();
    assert_eq!(ctl.current_time(), 0.0);

    a.detach();
    let f = rig.floating.borrow();
    assert_eq!(f.state().current_time, 0.0);
    assert_eq!(f.state().progress, 0.0);
    assert!(!f.state().playing);
}

#[test]
fn floating_markup_falls_back_to_unknown_labels() {
    let rig = rig();
    rig.floating
        .borrow_mut()
        .load(TrackInfo::new("c.mp3"), 15.0, false);
    let f = rig.floating.borrow();
    let m = f.markup();
    assert!(m.visible);
    assert_eq!(m.title, "Unknown Track");
    assert_eq!(m.artist, "Unknown Artist");
    assert_eq!(m.current_label, "0:15");
    assert_eq!(m.duration_label, "1:00");
    assert_eq!(m.progress_fill, 25.0);
    assert!(m.draggable);
}

#[test]
fn non_detachable_or_sourceless_tracks_stay_local() {
    let rig = rig();
    let mut a = TrackWidget::new(
        TrackInfo::new("a.mp3"),
        Some(rig.factory.create(Some("a.mp3"))),
        &rig.registry,
        Some(&rig.floating),
        bars(4),
        false,
    );
    a.detach();
    assert!(!a.is_detached());
    assert!(!rig.floating.borrow().is_active());

    let mut silent = TrackWidget::new(
        TrackInfo::new(""),
        None,
        &rig.registry,
        Some(&rig.floating),
        bars(4),
        true,
    );
    silent.toggle();
    silent.seek(0.5);
    silent.detach();
    assert!(!silent.local_state().playing);
    assert!(!rig.floating.borrow().is_active());
}
