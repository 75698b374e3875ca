//! Library of composite animation sequences.
//!
//! Every sequence reads the final status first and returns the face there
//! afterwards, so sequences stack on top of whatever is already scheduled
//! instead of fighting it.

use crate::particle::{Particle, Spawn};
use crate::scene::Stage;
use crate::status::Status;
use crate::types::{Property, StatusDelta};
use core::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use rand::Rng;

use crate::types::Property::*;
use crate::types::TimingProfile::*;

/// Scale applied to tears and kiss hearts.
const TEAR_SCALE: f32 = 0.75;
/// Scale applied to hearts in the flying-hearts burst.
const FLYING_HEART_SCALE: f32 = 0.45;

fn delta<const N: usize>(entries: [(Property, f32); N]) -> StatusDelta {
    StatusDelta::from(entries)
}

/// Closes and reopens the eyes.
pub fn blink<S: Stage + ?Sized>(stage: &mut S) {
    let saved = stage.final_status();
    stage.animate(delta([(EyeOpen, 0.0)]), 200, EaseIn);
    stage.animate(delta([(EyeOpen, saved.eye_open)]), 200, EaseOut);
}

/// Several blinks in a row.
pub fn fast_blinking<S: Stage + ?Sized>(stage: &mut S, count: u32) {
    for _ in 0..count {
        blink(stage);
    }
}

/// Winks one eye. `side` is -1 (left) or 1 (right); `None` picks at random.
pub fn wink<S: Stage + ?Sized>(stage: &mut S, side: Option<f32>) {
    let side = side.unwrap_or_else(|| if stage.rng().gen_bool(0.5) { -1.0 } else { 1.0 });
    stage.animate(delta([(LeftRight, side)]), 250, EaseIn);
    stage.animate(delta([(LeftRight, 0.0)]), 250, EaseOut);
}

/// Nods `amount` times.
pub fn shake_yes<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    for _ in 0..amount {
        stage.animate(delta([(Y, 140.0)]), 400, EaseInOut);
        stage.animate(delta([(Y, 100.0)]), 400, EaseInOut);
    }
    stage.animate(delta([(Y, saved.y)]), 400, EaseOut);
}

/// Shakes the head `amount` times.
pub fn shake_no<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    for _ in 0..amount {
        stage.animate(delta([(X, 140.0)]), 400, EaseInOut);
        stage.animate(delta([(X, 100.0)]), 400, EaseInOut);
    }
    stage.animate(delta([(X, saved.x)]), 400, EaseOut);
}

/// Short, sharp head shakes with a pause at each extreme.
pub fn angry_shake<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    for _ in 0..amount {
        stage.animate(delta([(X, 140.0)]), 100, EaseInOut);
        stage.trigger_wait_animation(200);
        stage.animate(delta([(X, 100.0)]), 100, EaseInOut);
    }
    stage.animate(delta([(X, saved.x)]), 200, EaseOut);
}

/// Bounces around while pulsing the light.
pub fn dance<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    let dim = saved.value * 0.4;
    for _ in 0..amount {
        stage.animate(delta([(X, 140.0), (Y, 100.0), (Value, dim)]), 400, EaseInOut);
        stage.animate(delta([(X, 120.0), (Y, 140.0), (Value, saved.value)]), 400, EaseInOut);
        stage.animate(delta([(X, 100.0), (Y, 100.0), (Value, dim)]), 400, EaseInOut);
        stage.animate(delta([(X, 120.0), (Y, 140.0), (Value, saved.value)]), 400, EaseInOut);
    }
    stage.animate(
        delta([(X, saved.x), (Y, saved.y), (Value, saved.value)]),
        600,
        EaseOut,
    );
}

/// Purses the lips and blows a heart once current motion has finished.
pub fn kiss<S: Stage + ?Sized>(stage: &mut S) {
    let saved = stage.final_status();
    let heart = Particle::heart(Spawn::new(saved.x, saved.y + 45.0, FRAC_PI_4)).scaled(TEAR_SCALE);
    let delay = stage.final_time_ms() + 200;
    stage.queue_particle(heart, delay);
    stage.animate(delta([(MouthWidth, 10.0)]), 200, EaseInOut);
    stage.animate(delta([(MouthWidth, saved.mouth_width)]), 200, EaseInOut);
}

/// Raises the eyebrows `amount` times.
pub fn eyebrow_raise<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    for _ in 0..amount {
        stage.animate(delta([(EyeOpen, 1.0), (EyebrowAngle, 0.0)]), 200, EaseIn);
        stage.animate(
            delta([(EyeOpen, saved.eye_open), (EyebrowAngle, saved.eyebrow_angle)]),
            200,
            EaseOut,
        );
    }
}

pub fn yawn<S: Stage + ?Sized>(stage: &mut S) {
    let saved = stage.final_status();
    stage.animate(
        delta([(MouthWidth, 0.0), (Yawn, 0.8), (EyeOpen, 0.2), (UnderEyeLid, 0.5)]),
        1200,
        EaseIn,
    );
    stage.animate(
        delta([(MouthWidth, 0.0), (Yawn, 1.0), (EyeOpen, 0.1), (UnderEyeLid, 0.7)]),
        800,
        EaseOut,
    );
    stage.animate(
        delta([
            (MouthWidth, saved.mouth_width),
            (Yawn, 0.0),
            (EyeOpen, saved.eye_open),
            (UnderEyeLid, saved.under_eye_lid),
        ]),
        800,
        EaseInOut,
    );
}

/// Nods off and jerks awake `amount` times.
pub fn falling_asleep<S: Stage + ?Sized>(stage: &mut S, amount: u32) {
    let saved = stage.final_status();
    for i in 0..amount {
        let drift = stage.rng().gen_range(1500..=3000);
        stage.animate(
            delta([(EyeOpen, 0.0), (Y, saved.y + 20.0), (Value, 0.1)]),
            drift,
            EaseIn,
        );
        stage.animate(
            delta([(EyeOpen, saved.eye_open), (Y, saved.y), (Value, saved.value)]),
            100,
            EaseOut,
        );
        if i + 1 < amount {
            let pause = stage.rng().gen_range(500..=1500);
            stage.trigger_wait_animation(pause);
        }
    }
}

/// Moves the face to a random spot inside the given ranges.
pub fn face_move<S: Stage + ?Sized>(
    stage: &mut S,
    x_range: (u32, u32),
    y_range: (u32, u32),
    duration_range: (u64, u64),
) {
    let rng = stage.rng();
    let x = rng.gen_range(x_range.0..=x_range.1) as f32;
    let y = rng.gen_range(y_range.0..=y_range.1) as f32;
    let duration = rng.gen_range(duration_range.0..=duration_range.1);
    stage.animate(delta([(X, x), (Y, y)]), duration, EaseInOut);
}

/// Height just below the lower eye lid, where tears appear.
fn tear_line<S: Stage + ?Sized>(stage: &S, status: &Status) -> f32 {
    let eye_height = stage.geometry().eye_height;
    eye_height - status.under_eye_lid * eye_height / 2.0 + status.y - 65.0 + 5.0
}

fn make_tear<S: Stage + ?Sized>(stage: &mut S, status: &Status, side: f32) -> Particle<S::Instant> {
    let x = status.x + stage.geometry().eye_offset * side;
    let y = tear_line(stage, status);
    let swing_left = stage.rng().gen_bool(0.5);
    Particle::tear(Spawn::new(x, y, FRAC_PI_2), swing_left).scaled(TEAR_SCALE)
}

/// A single tear from a random eye.
pub fn tear<S: Stage + ?Sized>(stage: &mut S) {
    let status = stage.current_status();
    let side = if stage.rng().gen_bool(0.5) { -1.0 } else { 1.0 };
    let particle = make_tear(stage, &status, side);
    stage.spawn_particle(particle);
}

/// Sobbing: the face bobs `sobs` times with a pair of tears per sob.
pub fn crying<S: Stage + ?Sized>(stage: &mut S, sobs: u32) {
    let status = stage.current_status();
    stage.trigger_animation(&delta([(Y, 140.0)]), 250, EaseInOut, true);
    for i in 0..=sobs {
        if i < sobs {
            stage.animate(delta([(Y, 120.0)]), 500, EaseInOut);
            stage.animate(delta([(Y, 140.0)]), 250, EaseInOut);
        } else {
            stage.animate(delta([(Y, status.y)]), 200, EaseOut);
        }
        for side in [-1.0, 1.0] {
            let particle = make_tear(stage, &status, side);
            stage.queue_particle(particle, 750 * u64::from(i));
        }
    }
}

/// A burst of `count` hearts floating upward with growing gaps.
pub fn hearts_flying<S: Stage + ?Sized>(stage: &mut S, count: u32) {
    for i in 0..count {
        let rng = stage.rng();
        let spawn = Spawn::new(
            rng.gen_range(60..=180) as f32,
            rng.gen_range(40..=80) as f32,
            rng.gen_range(-3.0 * FRAC_PI_4..-FRAC_PI_4),
        );
        let delay = ((i as f32).powf(1.4) * 100.0) as u64;
        let heart = Particle::heart(spawn).scaled(FLYING_HEART_SCALE);
        stage.queue_particle(heart, delay);
    }
}
