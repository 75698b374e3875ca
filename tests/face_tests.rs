//! Integration tests for FaceState

mod common;
use common::*;

use emoface::{
    EmotionKind, EngineConfig, FaceAction, FaceGeometry, JsonFileStore, MemoryStore, Particle,
    Property, RenderOutcome, Spawn, StateError, StateStore, Status, StatusDelta, TimingProfile,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

fn eye(value: f32) -> StatusDelta {
    StatusDelta::from([(Property::EyeOpen, value)])
}

#[test]
fn blink_sequence_settles_after_both_halves() {
    let (face, clock, _, _) = test_face();

    face.trigger_animation(&eye(0.0), TestDuration(200), TimingProfile::EaseIn, false)
        .unwrap();
    face.trigger_animation(&eye(1.0), TestDuration(200), TimingProfile::EaseOut, false)
        .unwrap();

    run_for(&face, &clock, 200, 10);
    assert!(approx(face.get_current_state().unwrap().eye_open, 0.0));

    run_for(&face, &clock, 200, 10);
    let status = face.get_current_state().unwrap();
    assert_eq!(status.eye_open, 1.0);
    assert!(!face.is_animation_active().unwrap());
}

#[test]
fn chained_animations_start_at_running_sum() {
    let (face, _, _, _) = test_face();
    let durations = [120u64, 80, 300, 45];
    for (i, d) in durations.iter().enumerate() {
        face.trigger_animation(&eye(i as f32), TestDuration(*d), TimingProfile::Linear, false)
            .unwrap();
    }

    let starts = face
        .with_engine(|engine| {
            engine
                .scene
                .animator()
                .queued()
                .iter()
                .map(|d| d.scheduled_start.0)
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(starts, vec![0, 120, 200, 500]);
    assert_eq!(face.get_final_time().unwrap(), TestDuration(545));
}

#[test]
fn forced_animation_starts_within_one_tick() {
    let (face, clock, _, _) = test_face();
    face.trigger_animation(&eye(1.0), TestDuration(5000), TimingProfile::Linear, false)
        .unwrap();
    face.trigger_animation(&eye(0.0), TestDuration(5000), TimingProfile::Linear, false)
        .unwrap();

    clock.advance(100);
    let delta = StatusDelta::from([(Property::X, 160.0)]);
    face.trigger_animation(&delta, TestDuration(100), TimingProfile::Linear, true)
        .unwrap();

    clock.advance(10);
    face.advance_and_render(None).unwrap();
    let x = face.get_current_state().unwrap().x;
    assert!(x > 120.0 && x < 160.0, "x = {}", x);
}

#[test]
fn final_state_reflects_targets_immediately() {
    let (face, _, _, _) = test_face();
    let delta = StatusDelta::from([(Property::Smile, 1.0), (Property::MouthWidth, 60.0)]);
    face.trigger_animation(&delta, TestDuration(800), TimingProfile::EaseInOut, false)
        .unwrap();

    let finals = face.get_final_state().unwrap();
    assert_eq!(finals.smile, 1.0);
    assert_eq!(finals.mouth_width, 60.0);

    let current = face.get_current_state().unwrap();
    assert_eq!(current.smile, 0.0);
    assert_eq!(current.mouth_width, 40.0);
}

#[test]
fn final_state_rereads_light_ring() {
    let (face, _, _, _) = test_face();
    face.with_engine(|engine| {
        use emoface::LightDriver;
        engine
            .scene
            .light_mut()
            .set_hsv(emoface::Hsv::new(90.0, 0.5, 0.25));
    })
    .unwrap();

    let finals = face.get_final_state().unwrap();
    assert!(approx(finals.hue, 90.0));
    assert!(approx(finals.saturation, 0.5));
    assert!(approx(finals.value, 0.25));
}

#[test]
fn queued_particle_waits_for_its_delay() {
    let (face, clock, _, _) = test_face();
    let heart = Particle::heart(Spawn::new(120.0, 120.0, 0.0));
    face.queue_particle(heart, TestDuration(300)).unwrap();

    let count = |face: &TestFace| {
        face.with_engine(|engine| engine.scene.particles().len())
            .unwrap()
    };

    assert!(face.is_animation_active().unwrap());
    clock.advance(299);
    assert_eq!(count(&face), 0);
    clock.advance(1);
    assert_eq!(count(&face), 1);
}

#[test]
fn idle_face_skips_render() {
    let (face, clock, renderer, _) = test_face();
    clock.advance(50);
    assert_eq!(face.advance_and_render(None).unwrap(), RenderOutcome::Skipped);
    assert!(renderer.frames().lock().unwrap().is_empty());
    assert!(!face.is_animation_active().unwrap());
}

#[test]
fn active_particles_force_render_with_empty_change_set() {
    let (face, clock, renderer, _) = test_face();
    face.spawn_particle(Particle::tear(Spawn::new(100.0, 110.0, 1.5), false))
        .unwrap();

    clock.advance(16);
    assert_eq!(face.advance_and_render(None).unwrap(), RenderOutcome::Rendered);

    let frames = renderer.frames();
    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert!(frames[0].changed.is_empty());
    assert_eq!(frames[0].particles, 1);
}

#[test]
fn particles_past_configured_cutoff_are_dropped_on_render() {
    let config = EngineConfig {
        geometry: FaceGeometry {
            particle_cutoff: 10.0,
            ..Default::default()
        },
        ..EngineConfig::seeded(7)
    };
    let (face, clock, renderer, _) = test_face_with(config);
    face.spawn_particle(Particle::heart(Spawn::new(500.0, 500.0, 0.0)))
        .unwrap();
    assert!(face.is_animation_active().unwrap());

    clock.advance(16);
    assert_eq!(face.advance_and_render(None).unwrap(), RenderOutcome::Rendered);
    assert_eq!(renderer.frames().lock().unwrap()[0].particles, 0);
    assert_eq!(
        face.with_engine(|engine| engine.scene.particles().len())
            .unwrap(),
        0
    );
    assert!(!face.is_animation_active().unwrap());

    clock.advance(16);
    assert_eq!(face.advance_and_render(None).unwrap(), RenderOutcome::Skipped);
}

#[test]
fn light_commands_survive_skipped_frames() {
    let (face, _, renderer, light) = test_face();
    // Hue already matches, so the status does not change and the frame is skipped.
    let delta = StatusDelta::from([(Property::Hue, 0.0)]);
    assert_eq!(
        face.advance_and_render(Some(&delta)).unwrap(),
        RenderOutcome::Skipped
    );
    assert!(renderer.frames().lock().unwrap().is_empty());
    assert_eq!(light.history().lock().unwrap().len(), 1);
}

#[test]
fn override_is_merged_and_rendered() {
    let (face, _, renderer, light) = test_face();
    let delta = StatusDelta::from([(Property::Value, 1.0), (Property::Smirk, -1.0)]);
    assert_eq!(
        face.advance_and_render(Some(&delta)).unwrap(),
        RenderOutcome::Rendered
    );

    let status = face.get_current_state().unwrap();
    assert_eq!(status.smirk, -1.0);
    assert!(approx(status.value, 1.0));

    let frames = renderer.frames();
    assert_eq!(frames.lock().unwrap()[0].changed.len(), 2);
    let history = light.history();
    assert!(approx(history.lock().unwrap()[0].value, 1.0));
}

#[test]
fn reset_drops_animations_and_particles() {
    let (face, _, _, _) = test_face();
    face.trigger_animation(&eye(1.0), TestDuration(500), TimingProfile::Linear, false)
        .unwrap();
    face.queue_particle(
        Particle::heart(Spawn::new(120.0, 120.0, 0.0)),
        TestDuration(100),
    )
    .unwrap();
    assert!(face.is_animation_active().unwrap());

    face.reset_animation().unwrap();
    assert!(!face.is_animation_active().unwrap());
    assert_eq!(face.get_final_time().unwrap(), TestDuration(0));
}

#[test]
fn contending_caller_times_out_without_corrupting_status() {
    let (face, clock, _, _) = test_face_with(EngineConfig {
        lock_timeout_ms: 10,
        ..EngineConfig::seeded(1)
    });
    let (locked_tx, locked_rx) = mpsc::channel();

    thread::scope(|s| {
        let holder = s.spawn(|| {
            face.with_engine(|engine| {
                locked_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(60));
                use emoface::Stage;
                engine.scene.animate(eye(1.0), 100, TimingProfile::Linear);
            })
        });

        locked_rx.recv().unwrap();
        let contender = face.trigger_animation(
            &StatusDelta::from([(Property::EyeOpen, 0.0)]),
            TestDuration(100),
            TimingProfile::Linear,
            false,
        );
        assert!(matches!(contender, Err(StateError::LockTimeout)));
        assert!(holder.join().unwrap().is_ok());
    });

    run_for(&face, &clock, 100, 10);
    assert_eq!(face.get_current_state().unwrap().eye_open, 1.0);
    assert!(!face.is_animation_active().unwrap());
}

#[test]
fn emotion_switch_enqueues_single_entry_transition() {
    let (face, clock, _, _) = test_face();
    assert!(face.update_emotion("happy", Some(80.0), Some(10.0)).unwrap());
    run_for(&face, &clock, 3000, 50);
    assert!(!face.is_animation_active().unwrap());
    assert!(approx(face.get_current_state().unwrap().hue, 50.0));

    assert!(face.update_emotion("sad", None, None).unwrap());
    let (kind, mood) = face.emotion().unwrap();
    assert_eq!(kind, EmotionKind::Sad);
    assert_eq!(mood.social, 80.0);
    assert_eq!(mood.tired, 10.0);

    let queued = face
        .with_engine(|engine| engine.scene.animator().queued().to_vec())
        .unwrap();
    let start = queued[0].scheduled_start;
    assert!(queued.iter().all(|d| d.scheduled_start == start));
    assert!(queued.iter().all(|d| d.duration == TestDuration(3000)));
    assert!(
        queued
            .iter()
            .any(|d| d.property == Property::Hue && d.target == 240.0)
    );
    assert_eq!(face.get_final_state().unwrap().y, 140.0);
}

#[test]
fn mood_only_update_has_no_animation_side_effect() {
    let (face, clock, _, _) = test_face();
    face.update_emotion("love", None, None).unwrap();
    run_for(&face, &clock, 3000, 100);
    assert!(!face.is_animation_active().unwrap());

    assert!(face.update_emotion("love", Some(90.0), None).unwrap());
    assert!(!face.is_animation_active().unwrap());
    assert!(!face.update_emotion("love", Some(90.0), None).unwrap());
    assert_eq!(face.emotion().unwrap().1.social, 90.0);
}

#[test]
fn unknown_emotion_is_rejected() {
    let (face, _, _, _) = test_face();
    let result = face.update_emotion("grumpy", None, None);
    assert!(matches!(result, Err(StateError::UnknownEmotion(ref name)) if name == "grumpy"));
    assert_eq!(face.emotion().unwrap().0, EmotionKind::StartUp);
    assert!(!face.is_animation_active().unwrap());
}

#[test]
fn triggers_fire_only_while_screen_is_on() {
    let (face, clock, _, _) = test_face();
    clock.advance(60_000);

    face.set_screen_on(false).unwrap();
    assert!(!face.is_screen_on().unwrap());
    assert!(face.check_animation_triggers().unwrap().is_empty());
    assert!(!face.is_animation_active().unwrap());

    face.set_screen_on(true).unwrap();
    let fired = face.check_animation_triggers().unwrap();
    assert!(fired.contains(&emoface::Behavior::Blink));
    assert!(face.is_animation_active().unwrap());
}

#[test]
fn save_and_restore_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("face.json"));

    let (face, _, _, _) = test_face();
    let delta = StatusDelta::from([(Property::Smile, -1.0), (Property::X, 100.0)]);
    face.advance_and_render(Some(&delta)).unwrap();
    face.save_state(&mut store).unwrap();
    let saved = face.get_current_state().unwrap();

    let (restored, _, renderer, _) = test_face();
    assert!(restored.load_state(&store, true).unwrap());
    assert_eq!(restored.get_current_state().unwrap(), saved);

    let frames = renderer.frames();
    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].changed.len(), Property::ALL.len());
}

/// Subscriber that counts info-level events.
struct InfoCounter(Arc<AtomicUsize>);

impl tracing::Subscriber for InfoCounter {
    fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
        tracing::span::Id::from_u64(1)
    }

    fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

    fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

    fn event(&self, event: &tracing::Event<'_>) {
        if *event.metadata().level() == tracing::Level::INFO {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &tracing::span::Id) {}

    fn exit(&self, _: &tracing::span::Id) {}
}

#[test]
fn saving_to_file_logs_once_at_info() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("face.json"));
    let (face, _, _, _) = test_face();

    let count = Arc::new(AtomicUsize::new(0));
    tracing::subscriber::with_default(InfoCounter(Arc::clone(&count)), || {
        face.save_state(&mut store).unwrap();
    });
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn corrupt_or_missing_state_falls_back_to_happy() {
    let corrupt = MemoryStore::with_raw("{\"smile\": \"wide\"");
    let (face, _, _, _) = test_face();
    assert!(!face.load_state(&corrupt, true).unwrap());
    assert_eq!(face.emotion().unwrap().0, EmotionKind::Happy);
    assert_eq!(face.get_final_state().unwrap().hue, 50.0);

    let (face, _, _, _) = test_face();
    assert!(!face.load_state(&MemoryStore::new(), true).unwrap());
    assert_eq!(face.emotion().unwrap().0, EmotionKind::Happy);
}

#[test]
fn load_without_reset_ignores_stored_record() {
    let mut store = MemoryStore::new();
    let mut status = Status::default();
    status.hue = 300.0;
    store.save(&status).unwrap();

    let (face, _, renderer, _) = test_face();
    assert!(!face.load_state(&store, false).unwrap());
    assert!(renderer.frames().lock().unwrap().is_empty());
    assert_eq!(face.get_final_state().unwrap().hue, 50.0);
}

#[test]
fn handle_action_dispatches_all_action_types() {
    let (face, clock, _, _) = test_face();

    let animate = FaceAction::animate(eye(0.5), TestDuration(100), TimingProfile::Linear);
    assert_eq!(face.handle_action(animate).unwrap(), None);
    assert_eq!(
        face.handle_action(FaceAction::Wait(TestDuration(50))).unwrap(),
        None
    );
    face.handle_action(FaceAction::Queue {
        particle: Particle::heart(Spawn::new(120.0, 120.0, 0.0)),
        delay: TestDuration(10),
    })
    .unwrap();
    face.handle_action(FaceAction::Spawn(Particle::tear(
        Spawn::new(100.0, 120.0, 1.5),
        true,
    )))
    .unwrap();

    clock.advance(20);
    assert_eq!(
        face.handle_action(FaceAction::Render).unwrap(),
        Some(RenderOutcome::Rendered)
    );

    face.handle_action(FaceAction::set_emotion("okay")).unwrap();
    assert_eq!(face.emotion().unwrap().0, EmotionKind::Okay);
    assert!(matches!(
        face.handle_action(FaceAction::set_emotion("bored")),
        Err(StateError::UnknownEmotion(_))
    ));

    face.handle_action(FaceAction::Reset).unwrap();
    assert!(!face.is_animation_active().unwrap());
}
