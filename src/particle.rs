//! Kinematic particles (tears, hearts) and their delayed-spawn queue.

use crate::time::{TimeDuration, TimeInstant};
use heapless::Vec as ShapeVec;

/// Maximum number of outline points in a particle shape.
pub const MAX_SHAPE_POINTS: usize = 8;

/// Default distance from the display centre beyond which particles expire.
pub const DEFAULT_PARTICLE_CUTOFF: f32 = 150.0;

/// Spawn location and initial heading (radians, 0 = +x, π/2 = down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl Spawn {
    pub const fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }
}

/// Immutable outline template: points with per-point corner radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    points: ShapeVec<(i32, i32), MAX_SHAPE_POINTS>,
    radii: ShapeVec<i32, MAX_SHAPE_POINTS>,
    center: (f32, f32),
    colour: u8,
}

impl Shape {
    fn from_template(points: &[(i32, i32)], radii: &[i32], center: (f32, f32), colour: u8) -> Self {
        let mut shape = Self {
            points: ShapeVec::new(),
            radii: ShapeVec::new(),
            center,
            colour,
        };
        for (point, radius) in points.iter().zip(radii).take(MAX_SHAPE_POINTS) {
            // Capacity is checked by `take`.
            let _ = shape.points.push(*point);
            let _ = shape.radii.push(*radius);
        }
        shape
    }

    fn heart() -> Self {
        const R: f32 = 30.0;
        let points = [
            (0, 0),
            ((0.34 * R) as i32, (-0.93 * R) as i32),
            ((0.8 * R) as i32, (0.2 * R) as i32),
            (0, R as i32),
            ((-0.8 * R) as i32, (0.2 * R) as i32),
            ((-0.34 * R) as i32, (-0.93 * R) as i32),
        ];
        Self::from_template(&points, &[0, 10, 15, 0, 15, 10], (30.0, 30.0), 2)
    }

    fn tear() -> Self {
        const R: f32 = 15.0;
        let points = [
            (15, 0),
            ((R + 15.0) as i32, (1.8 * R) as i32),
            (15, (2.5 * R) as i32),
            (0, (1.8 * R) as i32),
        ];
        Self::from_template(&points, &[0, 10, 5, 10], (15.0, 2.5 / 2.0 * R), 1)
    }

    /// Returns a copy scaled about the shape centre.
    fn scaled(&self, factor: f32) -> Self {
        let (cx, cy) = self.center;
        let mut out = Self {
            points: ShapeVec::new(),
            radii: ShapeVec::new(),
            center: self.center,
            colour: self.colour,
        };
        for (&(px, py), &r) in self.points.iter().zip(self.radii.iter()) {
            let x = cx + (px as f32 - cx) * factor;
            let y = cy + (py as f32 - cy) * factor;
            let _ = out.points.push((x as i32, y as i32));
            let _ = out.radii.push((r as f32 * factor) as i32);
        }
        out
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    pub fn radii(&self) -> &[i32] {
        &self.radii
    }

    pub fn colour(&self) -> u8 {
        self.colour
    }
}

/// Particle kinds differ only in outline and velocity functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Falls and sways; `phase` is 0 or π.
    Tear { phase: f32 },
    /// Drifts with an oscillating heading.
    Heart,
}

impl ParticleKind {
    /// Forward speed in units per second at particle-local time `t`.
    pub fn speed(&self, _t: f32) -> f32 {
        match self {
            ParticleKind::Tear { .. } => 60.0,
            ParticleKind::Heart => 40.0,
        }
    }

    /// Angular velocity in radians per second at particle-local time `t`.
    pub fn angular_velocity(&self, t: f32) -> f32 {
        match self {
            ParticleKind::Tear { phase } => (t * 4.0 + phase).sin(),
            ParticleKind::Heart => (t * 4.0).sin(),
        }
    }
}

/// What a renderer needs to draw one particle this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFrame<'a> {
    /// Top-left anchor of the outline on the display.
    pub origin: (i32, i32),
    pub points: &'a [(i32, i32)],
    pub radii: &'a [i32],
    pub colour: u8,
}

/// A lightweight kinematic visual entity.
#[derive(Debug, Clone)]
pub struct Particle<I: TimeInstant> {
    kind: ParticleKind,
    template: Shape,
    shape: Shape,
    scale: f32,
    position: (f32, f32),
    heading: f32,
    age: I::Duration,
    last_frame: Option<I>,
}

impl<I: TimeInstant> Particle<I> {
    fn new(kind: ParticleKind, template: Shape, spawn: Spawn) -> Self {
        Self {
            kind,
            shape: template.clone(),
            template,
            scale: 1.0,
            position: (spawn.x, spawn.y),
            heading: spawn.heading,
            age: I::Duration::ZERO,
            last_frame: None,
        }
    }

    /// A tear drop. `swing_left` picks the sway phase (0 or π).
    pub fn tear(spawn: Spawn, swing_left: bool) -> Self {
        let phase = if swing_left { core::f32::consts::PI } else { 0.0 };
        Self::new(ParticleKind::Tear { phase }, Shape::tear(), spawn)
    }

    pub fn heart(spawn: Spawn) -> Self {
        Self::new(ParticleKind::Heart, Shape::heart(), spawn)
    }

    /// Scales the outline about its centre (relative to the unscaled template).
    pub fn scale(&mut self, factor: f32) {
        self.scale = factor;
        self.shape = self.template.scaled(factor);
    }

    /// Builder-style [`scale`](Self::scale).
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale(factor);
        self
    }

    /// Restarts the particle-local clock at `now`; the next frame integrates
    /// the time elapsed since then.
    pub fn reset_clock(&mut self, now: I) {
        self.age = I::Duration::ZERO;
        self.last_frame = Some(now);
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Time since the particle's clock was last reset, as of its last frame.
    pub fn age(&self) -> I::Duration {
        self.age
    }

    /// Distance from `center`.
    pub fn distance_from(&self, center: (f32, f32)) -> f32 {
        let dx = self.position.0 - center.0;
        let dy = self.position.1 - center.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Advances the particle to `now` and returns its drawable frame.
    ///
    /// Explicit Euler step over the wall-clock time since the previous frame,
    /// or since the clock was reset. A particle that was never spawned
    /// through a queue takes a zero step on its first frame.
    pub fn frame(&mut self, now: I) -> ParticleFrame<'_> {
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or(I::Duration::ZERO);
        self.last_frame = Some(now);
        self.age = self.age.saturating_add(dt);

        let t = self.age.as_secs_f32();
        let step = dt.as_secs_f32();
        self.heading += self.kind.angular_velocity(t) * step;
        let speed = self.kind.speed(t);
        self.position.0 += speed * self.heading.cos() * step;
        self.position.1 += speed * self.heading.sin() * step;

        let (cx, cy) = self.shape.center;
        ParticleFrame {
            origin: (
                (self.position.0 - cx * self.scale) as i32,
                (self.position.1 - cy * self.scale) as i32,
            ),
            points: self.shape.points(),
            radii: self.shape.radii(),
            colour: self.shape.colour(),
        }
    }
}

/// Drops particles further than `cutoff` from `center`.
///
/// Renderers call this on the list returned by
/// [`ParticleQueue::particles`] to expire particles that left the display.
pub fn retain_within<I: TimeInstant>(
    particles: &mut Vec<Particle<I>>,
    center: (f32, f32),
    cutoff: f32,
) {
    particles.retain(|p| p.distance_from(center) <= cutoff);
}

#[derive(Debug, Clone)]
struct Pending<I: TimeInstant> {
    particle: Particle<I>,
    delay: I::Duration,
    queued_at: I,
}

/// Active particles plus particles waiting for their spawn delay.
#[derive(Debug, Clone)]
pub struct ParticleQueue<I: TimeInstant> {
    active: Vec<Particle<I>>,
    pending: Vec<Pending<I>>,
}

impl<I: TimeInstant> ParticleQueue<I> {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Makes `particle` active immediately, starting its clock at `now`.
    pub fn spawn(&mut self, mut particle: Particle<I>, now: I) {
        particle.reset_clock(now);
        self.active.push(particle);
    }

    /// Activates `particle` once `delay` has elapsed since `now`.
    pub fn queue(&mut self, particle: Particle<I>, delay: I::Duration, now: I) {
        self.pending.push(Pending {
            particle,
            delay,
            queued_at: now,
        });
    }

    /// Promotes due particles and returns the active list.
    ///
    /// The list is handed out mutably so a renderer can drop expired
    /// particles in place.
    pub fn particles(&mut self, now: I) -> &mut Vec<Particle<I>> {
        self.promote_due(now);
        &mut self.active
    }

    /// True if any particle is active after promoting due ones.
    pub fn is_running(&mut self, now: I) -> bool {
        self.promote_due(now);
        !self.active.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }

    fn promote_due(&mut self, now: I) {
        let mut i = 0;
        while i < self.pending.len() {
            let entry = &self.pending[i];
            if now.duration_since(entry.queued_at) >= entry.delay {
                let mut due = self.pending.remove(i);
                due.particle.reset_clock(now);
                self.active.push(due.particle);
            } else {
                i += 1;
            }
        }
    }
}

impl<I: TimeInstant> Default for ParticleQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}
