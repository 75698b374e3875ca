//! Stochastic event sources.
//!
//! A [`Trigger`] fires its [`Behavior`] with a probability that grows with the
//! time since it last fired. Each poll draws one uniform number and compares
//! it against the [`Hazard`] curve, so triggers form a discrete-time hazard
//! process rather than fixed-period timers.

use crate::time::{TimeDuration, TimeInstant};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Offset added to the elapsed time so `1/t` terms stay finite right after a
/// trigger fires.
const ELAPSED_OFFSET_SECS: f32 = 0.001;

/// Named behaviour a trigger invokes on the active emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Blink,
    FaceMove,
    Background,
    Tired,
}

impl Behavior {
    /// Poll order used by [`Emotion::check_triggers`](crate::Emotion::check_triggers).
    pub const ALL: [Behavior; 4] = [
        Behavior::Blink,
        Behavior::FaceMove,
        Behavior::Background,
        Behavior::Tired,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Behavior::Blink => "blink",
            Behavior::FaceMove => "face_move",
            Behavior::Background => "background",
            Behavior::Tired => "tired",
        }
    }
}

/// Per-poll firing probability as a function of seconds since the last fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hazard {
    /// Never fires.
    Never,
    /// `coeff · t²`
    Quadratic { coeff: f32 },
    /// `coeff · t² + decay / t`: likely right after firing, then quiet, then
    /// increasingly likely again.
    QuadraticWithDecay { coeff: f32, decay: f32 },
}

impl Hazard {
    /// Probability of firing in this poll after `secs` seconds (not clamped).
    pub fn probability(&self, secs: f32) -> f32 {
        let t = secs.max(0.0) + ELAPSED_OFFSET_SECS;
        match *self {
            Hazard::Never => 0.0,
            Hazard::Quadratic { coeff } => coeff * t * t,
            Hazard::QuadraticWithDecay { coeff, decay } => coeff * t * t + decay / t,
        }
    }
}

/// A single stochastic event source.
#[derive(Debug, Clone, Copy)]
pub struct Trigger<I: TimeInstant> {
    behavior: Behavior,
    hazard: Hazard,
    last_fire: I,
}

impl<I: TimeInstant> Trigger<I> {
    /// Creates a trigger whose clock starts at `now`.
    pub fn new(behavior: Behavior, hazard: Hazard, now: I) -> Self {
        Self {
            behavior,
            hazard,
            last_fire: now,
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn hazard(&self) -> Hazard {
        self.hazard
    }

    /// Replaces the hazard curve without touching the fire clock.
    pub fn set_hazard(&mut self, hazard: Hazard) {
        self.hazard = hazard;
    }

    pub fn last_fire(&self) -> I {
        self.last_fire
    }

    /// Current firing probability at `now`.
    pub fn probability(&self, now: I) -> f32 {
        self.hazard
            .probability(now.duration_since(self.last_fire).as_secs_f32())
    }

    /// Draws once; on success resets the fire clock to `now` and returns true.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: I, rng: &mut R) -> bool {
        let draw: f32 = rng.gen_range(0.0..1.0);
        if draw < self.probability(now) {
            self.last_fire = now;
            true
        } else {
            false
        }
    }
}

/// Picks one option by cumulative weight.
///
/// Returns `None` for an empty menu or when every weight is zero.
pub fn weighted_choice<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[(T, f32)]) -> Option<T> {
    let index = WeightedIndex::new(options.iter().map(|(_, w)| *w)).ok()?;
    Some(options[index.sample(rng)].0)
}
