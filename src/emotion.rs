//! Emotions: named behaviour modes bundling an entry expression and triggers.
//!
//! Each [`EmotionKind`] maps to a zero-sized type implementing
//! [`EmotionBehavior`], the capability interface every emotion exposes
//! (entry expression, hazard curves, blink, face move, background and tired
//! behaviours). [`Emotion`] holds the live triggers for one kind and
//! [`EmotionManager`] switches between kinds.

use crate::bank;
use crate::scene::Stage;
use crate::time::TimeInstant;
use crate::trigger::{Behavior, Hazard, Trigger, weighted_choice};
use crate::types::{Property, StatusDelta, TimingProfile};
use core::str::FromStr;
use rand::Rng;
use tracing::{debug, info};

/// Every emotion the face knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionKind {
    Happy,
    Angry,
    Sad,
    Okay,
    Horny,
    Love,
    /// Neutral mode the device boots into. Has no entry expression.
    StartUp,
}

impl EmotionKind {
    pub const ALL: [EmotionKind; 7] = [
        EmotionKind::Happy,
        EmotionKind::Angry,
        EmotionKind::Sad,
        EmotionKind::Okay,
        EmotionKind::Horny,
        EmotionKind::Love,
        EmotionKind::StartUp,
    ];

    /// Wire name used by the remote mood service.
    pub const fn name(self) -> &'static str {
        match self {
            EmotionKind::Happy => "happy",
            EmotionKind::Angry => "angry",
            EmotionKind::Sad => "sad",
            EmotionKind::Okay => "okay",
            EmotionKind::Horny => "horny",
            EmotionKind::Love => "love",
            EmotionKind::StartUp => "start_up",
        }
    }

    /// Resting expression applied when this emotion is entered.
    pub fn entry<R: Rng + ?Sized>(self, rng: &mut R) -> Option<StatusDelta> {
        match self {
            EmotionKind::Happy => Happy.entry(rng),
            EmotionKind::Angry => Angry.entry(rng),
            EmotionKind::Sad => Sad.entry(rng),
            EmotionKind::Okay => Okay.entry(rng),
            EmotionKind::Horny => Horny.entry(rng),
            EmotionKind::Love => Love.entry(rng),
            EmotionKind::StartUp => StartUp.entry(rng),
        }
    }

    /// Hazard curve for `behavior` under `mood`.
    pub fn hazard(self, behavior: Behavior, mood: Mood) -> Hazard {
        match self {
            EmotionKind::Happy => Happy.hazard(behavior, mood),
            EmotionKind::Angry => Angry.hazard(behavior, mood),
            EmotionKind::Sad => Sad.hazard(behavior, mood),
            EmotionKind::Okay => Okay.hazard(behavior, mood),
            EmotionKind::Horny => Horny.hazard(behavior, mood),
            EmotionKind::Love => Love.hazard(behavior, mood),
            EmotionKind::StartUp => StartUp.hazard(behavior, mood),
        }
    }

    /// Runs `behavior` for this emotion.
    pub fn perform<S: Stage + ?Sized>(self, behavior: Behavior, stage: &mut S, mood: Mood) {
        match self {
            EmotionKind::Happy => Happy.perform(behavior, stage, mood),
            EmotionKind::Angry => Angry.perform(behavior, stage, mood),
            EmotionKind::Sad => Sad.perform(behavior, stage, mood),
            EmotionKind::Okay => Okay.perform(behavior, stage, mood),
            EmotionKind::Horny => Horny.perform(behavior, stage, mood),
            EmotionKind::Love => Love.perform(behavior, stage, mood),
            EmotionKind::StartUp => StartUp.perform(behavior, stage, mood),
        }
    }
}

impl core::fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an emotion name outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEmotion(pub String);

impl core::fmt::Display for UnknownEmotion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown emotion '{}'", self.0)
    }
}

impl std::error::Error for UnknownEmotion {}

impl FromStr for EmotionKind {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Social and tiredness levels, both on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mood {
    pub social: f32,
    pub tired: f32,
}

impl Mood {
    pub const fn new(social: f32, tired: f32) -> Self {
        Self { social, tired }
    }

    /// Multiplier on background activity: 1.0 at social 50.
    pub fn social_factor(&self) -> f32 {
        (0.5 + self.social / 100.0).max(0.0)
    }

    /// Tiredness as a fraction in 0.0-1.0.
    pub fn tired_fraction(&self) -> f32 {
        (self.tired / 100.0).clamp(0.0, 1.0)
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

/// Canned background sequences an emotion can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flourish {
    Wink,
    ShakeYes,
    ShakeNo,
    AngryShake,
    Dance,
    EyebrowRaise,
    FastBlinking,
    Kiss,
    Tear,
    Crying,
    HeartsFlying,
}

impl Flourish {
    /// Plays the sequence with its randomized repeat count.
    pub fn play<S: Stage + ?Sized>(self, stage: &mut S) {
        match self {
            Flourish::Wink => bank::wink(stage, None),
            Flourish::ShakeYes => {
                let n = stage.rng().gen_range(2..=4);
                bank::shake_yes(stage, n);
            }
            Flourish::ShakeNo => {
                let n = stage.rng().gen_range(2..=4);
                bank::shake_no(stage, n);
            }
            Flourish::AngryShake => {
                let n = stage.rng().gen_range(1..=2);
                bank::angry_shake(stage, n);
            }
            Flourish::Dance => {
                let n = stage.rng().gen_range(2..=5);
                bank::dance(stage, n);
            }
            Flourish::EyebrowRaise => {
                let n = stage.rng().gen_range(2..=5);
                bank::eyebrow_raise(stage, n);
            }
            Flourish::FastBlinking => {
                let n = stage.rng().gen_range(4..=6);
                bank::fast_blinking(stage, n);
            }
            Flourish::Kiss => bank::kiss(stage),
            Flourish::Tear => bank::tear(stage),
            Flourish::Crying => {
                let n = stage.rng().gen_range(3..=6);
                bank::crying(stage, n);
            }
            Flourish::HeartsFlying => {
                let n = stage.rng().gen_range(10..=50);
                bank::hearts_flying(stage, n);
            }
        }
    }
}

/// Tired band thresholds on [`Mood::tired_fraction`].
const TIRED_YAWN: f32 = 0.5;
const TIRED_SLEEPY: f32 = 0.8;

/// Capability interface every emotion implements.
///
/// Defaults describe the shared baseline; emotions override what differs.
pub trait EmotionBehavior {
    fn kind(&self) -> EmotionKind;

    /// Resting expression and light colour.
    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        None
    }

    /// Weighted menu sampled by the background behaviour.
    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[]
    }

    fn hazard(&self, behavior: Behavior, mood: Mood) -> Hazard {
        match behavior {
            Behavior::Blink => Hazard::Quadratic { coeff: 1e-2 },
            Behavior::FaceMove => Hazard::QuadraticWithDecay {
                coeff: 10f32.powf(-3.5),
                decay: 1.0,
            },
            Behavior::Background => Hazard::Quadratic {
                coeff: 10f32.powf(-2.8) * mood.social_factor(),
            },
            Behavior::Tired => {
                let t = mood.tired_fraction();
                Hazard::Quadratic {
                    coeff: 10f32.powf(-2.8 - (1.0 - t * t) * 3.0),
                }
            }
        }
    }

    fn blink<S: Stage + ?Sized>(&self, stage: &mut S) {
        bank::blink(stage);
    }

    fn face_move<S: Stage + ?Sized>(&self, stage: &mut S) {
        bank::face_move(stage, (100, 140), (100, 140), (500, 1500));
    }

    fn background<S: Stage + ?Sized>(&self, stage: &mut S) {
        let menu = self.menu();
        if let Some(choice) = weighted_choice(stage.rng(), menu) {
            debug!(emotion = %self.kind(), ?choice, "background animation");
            choice.play(stage);
        }
    }

    fn tired<S: Stage + ?Sized>(&self, stage: &mut S, mood: Mood) {
        let t = mood.tired_fraction();
        if t < TIRED_YAWN {
            return;
        }
        if t < TIRED_SLEEPY {
            bank::yawn(stage);
            return;
        }
        let menu = [(false, 0.6), (true, 0.4)];
        if weighted_choice(stage.rng(), &menu) == Some(true) {
            let n = stage.rng().gen_range(1..=3);
            bank::falling_asleep(stage, n);
        } else {
            bank::yawn(stage);
        }
    }

    fn perform<S: Stage + ?Sized>(&self, behavior: Behavior, stage: &mut S, mood: Mood) {
        match behavior {
            Behavior::Blink => self.blink(stage),
            Behavior::FaceMove => self.face_move(stage),
            Behavior::Background => self.background(stage),
            Behavior::Tired => self.tired(stage, mood),
        }
    }
}

fn expression(
    eye_open: f32,
    eyebrow_angle: f32,
    under_eye_lid: f32,
    smile: f32,
    cheeks: f32,
    mouth_width: f32,
    hue: f32,
    value: f32,
) -> StatusDelta {
    StatusDelta::from([
        (Property::EyeOpen, eye_open),
        (Property::EyebrowAngle, eyebrow_angle),
        (Property::UnderEyeLid, under_eye_lid),
        (Property::Smile, smile),
        (Property::Smirk, 0.0),
        (Property::Cheeks, cheeks),
        (Property::MouthWidth, mouth_width),
        (Property::Yawn, 0.0),
        (Property::Hue, hue),
        (Property::Saturation, 1.0),
        (Property::Value, value),
    ])
}

pub struct Happy;

impl EmotionBehavior for Happy {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Happy
    }

    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        Some(expression(1.0, 0.0, 0.0, 1.0, 0.0, 40.0, 50.0, 1.0).with(Property::Y, 120.0))
    }

    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[
            (Flourish::Wink, 0.4),
            (Flourish::ShakeYes, 0.4),
            (Flourish::Dance, 0.2),
        ]
    }
}

pub struct Angry;

impl EmotionBehavior for Angry {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Angry
    }

    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        Some(expression(0.8, 1.0, 0.3, -1.0, 0.0, 40.0, 0.0, 1.0))
    }

    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[(Flourish::AngryShake, 1.0)]
    }

    fn face_move<S: Stage + ?Sized>(&self, stage: &mut S) {
        bank::face_move(stage, (100, 140), (100, 130), (500, 1000));
    }
}

pub struct Sad;

impl EmotionBehavior for Sad {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Sad
    }

    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        Some(expression(0.65, -1.0, 0.0, -1.0, 0.0, 40.0, 240.0, 1.0).with(Property::Y, 140.0))
    }

    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[
            (Flourish::ShakeNo, 0.25),
            (Flourish::Tear, 0.5),
            (Flourish::Crying, 0.25),
        ]
    }

    fn hazard(&self, behavior: Behavior, mood: Mood) -> Hazard {
        match behavior {
            Behavior::Background => Hazard::Quadratic {
                coeff: 1e-2 * mood.social_factor(),
            },
            _ => baseline_hazard(behavior, mood),
        }
    }

    fn face_move<S: Stage + ?Sized>(&self, stage: &mut S) {
        bank::face_move(stage, (100, 140), (125, 150), (500, 1000));
    }
}

/// The default hazard set, reachable from overriding impls.
fn baseline_hazard(behavior: Behavior, mood: Mood) -> Hazard {
    StartUp.hazard(behavior, mood)
}

pub struct Okay;

impl EmotionBehavior for Okay {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Okay
    }

    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        Some(expression(1.0, 0.0, 0.4, 0.0, 0.0, 55.0, 120.0, 0.0))
    }
}

pub struct Horny;

impl EmotionBehavior for Horny {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Horny
    }

    fn entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<StatusDelta> {
        let smirk = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        let mut delta = expression(0.7, 0.3, 0.2, 1.0, 0.0, 60.0, 275.0, 1.0);
        delta.insert(Property::Smirk, smirk);
        delta.remove(Property::Yawn);
        Some(delta)
    }

    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[
            (Flourish::Wink, 0.2),
            (Flourish::ShakeYes, 0.05),
            (Flourish::Dance, 0.05),
            (Flourish::EyebrowRaise, 0.3),
            (Flourish::FastBlinking, 0.2),
            (Flourish::Kiss, 0.2),
        ]
    }
}

pub struct Love;

impl EmotionBehavior for Love {
    fn kind(&self) -> EmotionKind {
        EmotionKind::Love
    }

    fn entry<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<StatusDelta> {
        Some(expression(1.0, 0.0, 0.5, 1.0, 1.0, 40.0, 300.0, 1.0))
    }

    fn menu(&self) -> &'static [(Flourish, f32)] {
        &[
            (Flourish::FastBlinking, 0.2),
            (Flourish::Wink, 0.2),
            (Flourish::Kiss, 0.25),
            (Flourish::ShakeYes, 0.1),
            (Flourish::Dance, 0.1),
            (Flourish::HeartsFlying, 0.25),
        ]
    }
}

pub struct StartUp;

impl EmotionBehavior for StartUp {
    fn kind(&self) -> EmotionKind {
        EmotionKind::StartUp
    }
}

/// The live instance of one emotion: its mood and its triggers.
#[derive(Debug, Clone)]
pub struct Emotion<I: TimeInstant> {
    kind: EmotionKind,
    mood: Mood,
    triggers: [Trigger<I>; 4],
}

impl<I: TimeInstant> Emotion<I> {
    /// Creates an emotion whose trigger clocks start at `now`.
    pub fn new(kind: EmotionKind, mood: Mood, now: I) -> Self {
        let triggers = Behavior::ALL.map(|b| Trigger::new(b, kind.hazard(b, mood), now));
        Self {
            kind,
            mood,
            triggers,
        }
    }

    pub fn kind(&self) -> EmotionKind {
        self.kind
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn trigger(&self, behavior: Behavior) -> &Trigger<I> {
        &self.triggers[Self::slot(behavior)]
    }

    /// Changes the mood and re-derives every hazard curve.
    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
        self.rederive();
    }

    /// Polls every trigger once and runs the behaviours that fire.
    ///
    /// Returns the behaviours that fired, in poll order.
    pub fn check_triggers<S>(&mut self, stage: &mut S) -> heapless::Vec<Behavior, 4>
    where
        S: Stage<Instant = I> + ?Sized,
    {
        let mut fired = heapless::Vec::new();
        for i in 0..self.triggers.len() {
            let now = stage.now();
            if self.triggers[i].poll(now, stage.rng()) {
                let behavior = self.triggers[i].behavior();
                debug!(emotion = %self.kind, trigger = behavior.name(), "trigger fired");
                self.kind.perform(behavior, &mut *stage, self.mood);
                let _ = fired.push(behavior);
            }
        }
        fired
    }

    /// Enqueues the entry expression, if this emotion has one.
    pub fn enter<S>(&self, stage: &mut S, duration_ms: u64)
    where
        S: Stage<Instant = I> + ?Sized,
    {
        if let Some(entry) = self.kind.entry(stage.rng()) {
            stage.trigger_animation(&entry, duration_ms, TimingProfile::EaseInOut, false);
        }
    }

    fn rederive(&mut self) {
        for trigger in &mut self.triggers {
            trigger.set_hazard(self.kind.hazard(trigger.behavior(), self.mood));
        }
    }

    fn slot(behavior: Behavior) -> usize {
        match behavior {
            Behavior::Blink => 0,
            Behavior::FaceMove => 1,
            Behavior::Background => 2,
            Behavior::Tired => 3,
        }
    }
}

/// Owns the active emotion and switches between kinds.
#[derive(Debug, Clone)]
pub struct EmotionManager<I: TimeInstant> {
    emotion: Emotion<I>,
    entry_duration_ms: u64,
}

impl<I: TimeInstant> EmotionManager<I> {
    /// Starts in [`EmotionKind::StartUp`].
    pub fn new(mood: Mood, entry_duration_ms: u64, now: I) -> Self {
        Self {
            emotion: Emotion::new(EmotionKind::StartUp, mood, now),
            entry_duration_ms,
        }
    }

    pub fn emotion(&self) -> &Emotion<I> {
        &self.emotion
    }

    /// Switches to `kind` and/or updates the mood.
    ///
    /// A different kind replaces the emotion (carrying the mood over) and
    /// enqueues its entry expression. A changed social or tired value only
    /// re-derives hazards. `None` keeps the current value. Returns true if
    /// anything changed.
    pub fn update<S>(
        &mut self,
        kind: EmotionKind,
        social: Option<f32>,
        tired: Option<f32>,
        stage: &mut S,
    ) -> bool
    where
        S: Stage<Instant = I> + ?Sized,
    {
        let mut changed = false;
        if self.emotion.kind() != kind {
            self.emotion = Emotion::new(kind, self.emotion.mood(), stage.now());
            self.emotion.enter(stage, self.entry_duration_ms);
            changed = true;
        }

        let mut mood = self.emotion.mood();
        if let Some(social) = social.filter(|s| *s != mood.social) {
            mood.social = social;
            changed = true;
        }
        if let Some(tired) = tired.filter(|t| *t != mood.tired) {
            mood.tired = tired;
            changed = true;
        }
        if mood != self.emotion.mood() {
            self.emotion.set_mood(mood);
        }

        if changed {
            info!(
                emotion = %self.emotion.kind(),
                social = mood.social,
                tired = mood.tired,
                "emotion updated"
            );
        }
        changed
    }

    /// Polls the active emotion's triggers.
    pub fn check_triggers<S>(&mut self, stage: &mut S) -> heapless::Vec<Behavior, 4>
    where
        S: Stage<Instant = I> + ?Sized,
    {
        self.emotion.check_triggers(stage)
    }
}
