//! The unlocked animation engine and its hardware seams.
//!
//! [`Scene`] owns the live [`Status`], the [`StatusAnimator`], the
//! [`ParticleQueue`], the light driver and the random source. It is only ever
//! reached through [`FaceState`](crate::FaceState), which holds the lock, so
//! every method here assumes exclusive access. Composite behaviours (the
//! animation bank, emotion triggers) are written against the [`Stage`] trait
//! and run entirely inside one lock acquisition.

use crate::animator::StatusAnimator;
use crate::config::FaceGeometry;
use crate::particle::{Particle, ParticleQueue};
use crate::status::Status;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::{Property, StatusDelta, TimingProfile};
use palette::Hsv;
use rand::rngs::StdRng;

/// Trait for abstracting the RGB light ring.
///
/// The light ring is the source of truth for hue, saturation and value: it can
/// be changed out-of-band (for example by a touch gesture), so the engine
/// re-reads it before treating those fields as authoritative.
pub trait LightDriver {
    /// Returns the colour currently shown.
    fn hsv(&self) -> Hsv;

    /// Shows `color`. Handle hardware errors internally; this cannot fail.
    fn set_hsv(&mut self, color: Hsv);
}

/// Trait for the pixel renderer that rasterizes a status snapshot.
pub trait Renderer<I: TimeInstant> {
    /// Draws one frame.
    ///
    /// `changed` holds the properties touched this tick and may be empty when
    /// only particles are moving. The renderer advances each particle with
    /// [`Particle::frame`] and expires particles in place by calling
    /// [`retain_within`](crate::particle::retain_within) with
    /// `geometry.center` and `geometry.particle_cutoff`.
    fn render(
        &mut self,
        changed: &StatusDelta,
        status: &Status,
        particles: &mut Vec<Particle<I>>,
        geometry: &FaceGeometry,
        now: I,
    );
}

/// Primitive operations composite animations are built from.
///
/// Implemented by [`Scene`]; everything in [`bank`](crate::bank) and
/// [`emotion`](crate::emotion) is written against this trait.
pub trait Stage {
    type Instant: TimeInstant;

    fn now(&self) -> Self::Instant;

    /// Live status, with hue/saturation/value re-read from the light ring.
    fn current_status(&mut self) -> Status;

    /// Status once all scheduled motion completes.
    fn final_status(&mut self) -> Status;

    /// Milliseconds until all scheduled motion completes.
    fn final_time_ms(&self) -> u64;

    fn trigger_animation(
        &mut self,
        delta: &StatusDelta,
        duration_ms: u64,
        profile: TimingProfile,
        force: bool,
    );

    fn trigger_wait_animation(&mut self, duration_ms: u64);

    fn spawn_particle(&mut self, particle: Particle<Self::Instant>);

    fn queue_particle(&mut self, particle: Particle<Self::Instant>, delay_ms: u64);

    fn rng(&mut self) -> &mut StdRng;

    fn geometry(&self) -> &FaceGeometry;

    /// Chains a non-forced animation.
    fn animate(&mut self, delta: StatusDelta, duration_ms: u64, profile: TimingProfile) {
        self.trigger_animation(&delta, duration_ms, profile, false);
    }
}

/// The engine state guarded by the façade lock.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `L` - Light driver implementation type
pub struct Scene<I: TimeInstant, T: TimeSource<I>, L: LightDriver> {
    clock: T,
    status: Status,
    animator: StatusAnimator<I>,
    particles: ParticleQueue<I>,
    light: L,
    rng: StdRng,
    geometry: FaceGeometry,
}

impl<I: TimeInstant, T: TimeSource<I>, L: LightDriver> Scene<I, T, L> {
    pub fn new(clock: T, light: L, rng: StdRng, geometry: FaceGeometry) -> Self {
        let now = clock.now();
        let mut status = Status::default();
        status.set_hsv(light.hsv());
        Self {
            clock,
            status,
            animator: StatusAnimator::new(now),
            particles: ParticleQueue::new(),
            light,
            rng,
            geometry,
        }
    }

    /// Re-reads hue, saturation and value from the light ring.
    pub fn sync_light(&mut self) {
        self.status.set_hsv(self.light.hsv());
    }

    /// Status as last drawn, without re-reading the light ring.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    pub fn animator(&self) -> &StatusAnimator<I> {
        &self.animator
    }

    pub fn light(&self) -> &L {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut L {
        &mut self.light
    }

    /// Promotes due particles and returns the active list.
    pub fn particles(&mut self) -> &mut Vec<Particle<I>> {
        let now = self.clock.now();
        self.particles.particles(now)
    }

    /// Everything a renderer needs for one frame: the status, the promoted
    /// particle list, the display geometry and the frame time.
    pub fn frame(&mut self) -> (&Status, &mut Vec<Particle<I>>, &FaceGeometry, I) {
        let now = self.clock.now();
        (&self.status, self.particles.particles(now), &self.geometry, now)
    }

    /// Active or pending particles exist.
    pub fn has_particles(&mut self) -> bool {
        let now = self.clock.now();
        self.particles.is_running(now) || self.particles.has_pending()
    }

    /// Advances the animator and writes the result into the live status.
    ///
    /// Returns the sparse update and whether any value actually changed.
    pub fn advance(&mut self) -> (StatusDelta, bool) {
        let now = self.clock.now();
        let updates = self.animator.advance(&self.status, now);
        let changed = self.status.merge_changed(&updates);
        (updates, changed)
    }

    /// Forwards any hue/saturation/value present in `updates` to the light ring.
    pub fn push_light(&mut self, updates: &StatusDelta) {
        if !updates.touches_light() {
            return;
        }
        let current = self.light.hsv();
        let color = Hsv::new(
            updates
                .get(Property::Hue)
                .unwrap_or_else(|| current.hue.into_positive_degrees()),
            updates.get(Property::Saturation).unwrap_or(current.saturation),
            updates.get(Property::Value).unwrap_or(current.value),
        );
        self.light.set_hsv(color);
    }

    /// True if any animation is queued or active, or any particle is
    /// active or pending.
    pub fn is_animation_active(&mut self) -> bool {
        self.animator.is_active() || self.has_particles()
    }

    /// Drops all animations and particles.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.animator.reset(now);
        self.particles.clear();
    }
}

impl<I: TimeInstant, T: TimeSource<I>, L: LightDriver> Stage for Scene<I, T, L> {
    type Instant = I;

    fn now(&self) -> I {
        self.clock.now()
    }

    fn current_status(&mut self) -> Status {
        self.sync_light();
        self.status
    }

    fn final_status(&mut self) -> Status {
        self.sync_light();
        self.animator.final_status(&self.status)
    }

    fn final_time_ms(&self) -> u64 {
        self.animator.final_time(self.clock.now()).as_millis()
    }

    fn trigger_animation(
        &mut self,
        delta: &StatusDelta,
        duration_ms: u64,
        profile: TimingProfile,
        force: bool,
    ) {
        let now = self.clock.now();
        self.animator
            .trigger_animation(delta, I::Duration::from_millis(duration_ms), profile, force, now);
    }

    fn trigger_wait_animation(&mut self, duration_ms: u64) {
        let now = self.clock.now();
        self.animator
            .trigger_wait_animation(I::Duration::from_millis(duration_ms), now);
    }

    fn spawn_particle(&mut self, particle: Particle<I>) {
        let now = self.clock.now();
        self.particles.spawn(particle, now);
    }

    fn queue_particle(&mut self, particle: Particle<I>, delay_ms: u64) {
        let now = self.clock.now();
        self.particles
            .queue(particle, I::Duration::from_millis(delay_ms), now);
    }

    fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn geometry(&self) -> &FaceGeometry {
        &self.geometry
    }
}
