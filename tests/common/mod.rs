//! Shared test infrastructure for emoface integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use emoface::{
    EngineConfig, FaceGeometry, FaceState, Hsv, LightDriver, Particle, Renderer, Status,
    StatusDelta, TimeDuration, TimeInstant, TimeSource, retain_within,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_add(duration.0).map(TestInstant)
    }

    fn checked_sub(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_sub(duration.0).map(TestInstant)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement.
///
/// Atomic so one clock can be shared with the face across threads.
#[derive(Debug, Default)]
pub struct MockClock {
    millis: AtomicU64,
}

impl MockClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource<TestInstant> for MockClock {
    fn now(&self) -> TestInstant {
        TestInstant(self.millis.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Mock Light
// ============================================================================

/// Light ring that records every colour it is given.
///
/// The history handle is shared so tests can inspect it after the light has
/// been moved into the face.
#[derive(Debug, Clone)]
pub struct MockLight {
    current: Hsv,
    history: Arc<Mutex<Vec<Hsv>>>,
}

impl MockLight {
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            current: Hsv::new(hue, saturation, value),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn off() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub fn history(&self) -> Arc<Mutex<Vec<Hsv>>> {
        Arc::clone(&self.history)
    }
}

impl LightDriver for MockLight {
    fn hsv(&self) -> Hsv {
        self.current
    }

    fn set_hsv(&mut self, color: Hsv) {
        self.current = color;
        self.history.lock().unwrap().push(color);
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// One recorded render call.
#[derive(Debug, Clone)]
pub struct Frame {
    pub changed: StatusDelta,
    pub status: Status,
    pub particles: usize,
}

/// Renderer that records every frame it is asked to draw.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Arc<Mutex<Vec<Frame>>> {
        Arc::clone(&self.frames)
    }
}

impl Renderer<TestInstant> for MockRenderer {
    fn render(
        &mut self,
        changed: &StatusDelta,
        status: &Status,
        particles: &mut Vec<Particle<TestInstant>>,
        geometry: &FaceGeometry,
        now: TestInstant,
    ) {
        for particle in particles.iter_mut() {
            particle.frame(now);
        }
        retain_within(particles, geometry.center, geometry.particle_cutoff);
        self.frames.lock().unwrap().push(Frame {
            changed: *changed,
            status: *status,
            particles: particles.len(),
        });
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestFace = FaceState<TestInstant, Arc<MockClock>, MockLight, MockRenderer>;

/// A seeded face on a mock clock at t=0, with the light off.
pub fn test_face() -> (TestFace, Arc<MockClock>, MockRenderer, MockLight) {
    test_face_with(EngineConfig::seeded(7))
}

pub fn test_face_with(
    config: EngineConfig,
) -> (TestFace, Arc<MockClock>, MockRenderer, MockLight) {
    let clock = MockClock::new();
    let renderer = MockRenderer::new();
    let light = MockLight::off();
    let face = FaceState::new(Arc::clone(&clock), light.clone(), renderer.clone(), config);
    (face, clock, renderer, light)
}

/// Advances the clock in `step_ms` ticks for `total_ms`, rendering each tick.
pub fn run_for(face: &TestFace, clock: &MockClock, total_ms: u64, step_ms: u64) {
    let mut elapsed = 0;
    while elapsed < total_ms {
        clock.advance(step_ms);
        elapsed += step_ms;
        face.advance_and_render(None).unwrap();
    }
}

/// Compare two floats with tolerance
pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
