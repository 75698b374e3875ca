//! The shared face state and its lock.
//!
//! [`FaceState`] is the single owner of the status, animator, particles and
//! emotion manager. It is shared between the input loop and the sync loop;
//! every public method acquires the lock exactly once, with a bounded wait,
//! and then works on the unlocked [`Engine`]. Nothing inside the engine ever
//! takes the lock again.

use crate::command::FaceAction;
use crate::config::EngineConfig;
use crate::emotion::{EmotionKind, EmotionManager, Mood, UnknownEmotion};
use crate::particle::Particle;
use crate::persist::{StateStore, StoreError};
use crate::scene::{LightDriver, Renderer, Scene, Stage};
use crate::status::Status;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::trigger::Behavior;
use crate::types::{StatusDelta, TimingProfile};
use parking_lot::{Mutex, MutexGuard};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

/// Errors returned by [`FaceState`] operations.
#[derive(Debug)]
pub enum StateError {
    /// The lock was not acquired within the configured timeout.
    ///
    /// Transient: skip the operation for this tick and retry on the next.
    LockTimeout,
    /// A collaborator asked for an emotion that does not exist.
    UnknownEmotion(String),
    /// Saving the state failed.
    Store(StoreError),
}

impl core::fmt::Display for StateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StateError::LockTimeout => write!(f, "face state lock not acquired in time"),
            StateError::UnknownEmotion(name) => write!(f, "unknown emotion '{}'", name),
            StateError::Store(err) => write!(f, "state store failed: {}", err),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnknownEmotion> for StateError {
    fn from(err: UnknownEmotion) -> Self {
        StateError::UnknownEmotion(err.0)
    }
}

impl From<StoreError> for StateError {
    fn from(err: StoreError) -> Self {
        StateError::Store(err)
    }
}

/// Result of one [`FaceState::advance_and_render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Nothing changed and no particle is active; the renderer was not called.
    Skipped,
    /// The renderer drew a frame.
    Rendered,
}

/// Everything guarded by the façade lock.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `L` - Light driver implementation type
/// * `R` - Renderer implementation type
pub struct Engine<I: TimeInstant, T: TimeSource<I>, L: LightDriver, R: Renderer<I>> {
    pub scene: Scene<I, T, L>,
    pub emotions: EmotionManager<I>,
    renderer: R,
    screen_on: bool,
}

impl<I, T, L, R> Engine<I, T, L, R>
where
    I: TimeInstant,
    T: TimeSource<I>,
    L: LightDriver,
    R: Renderer<I>,
{
    /// Advances one tick and draws it unless nothing moved.
    pub fn advance_and_render(&mut self, status_override: Option<&StatusDelta>) -> RenderOutcome {
        let (updates, changed) = match status_override {
            Some(delta) => {
                let changed = self.scene.status_mut().merge_changed(delta);
                (*delta, changed)
            }
            None => self.scene.advance(),
        };

        // Light commands go out even when the frame itself is skipped.
        self.scene.push_light(&updates);

        let (status, particles, geometry, now) = self.scene.frame();
        if !changed && particles.is_empty() {
            return RenderOutcome::Skipped;
        }
        let changed_set = if changed { updates } else { StatusDelta::new() };
        self.renderer
            .render(&changed_set, status, particles, geometry, now);
        RenderOutcome::Rendered
    }

    /// Polls the emotion triggers while the screen is on.
    pub fn check_triggers(&mut self) -> heapless::Vec<Behavior, 4> {
        if !self.screen_on {
            return heapless::Vec::new();
        }
        self.emotions.check_triggers(&mut self.scene)
    }

    pub fn set_emotion(&mut self, kind: EmotionKind, social: Option<f32>, tired: Option<f32>) -> bool {
        self.emotions.update(kind, social, tired, &mut self.scene)
    }

    /// Restores `status` wholesale and draws it.
    fn restore(&mut self, status: Status) {
        self.scene.reset();
        *self.scene.status_mut() = status;
        self.scene.light_mut().set_hsv(status.hsv());
        let (status, particles, geometry, now) = self.scene.frame();
        let all = status.to_delta();
        self.renderer.render(&all, status, particles, geometry, now);
    }

    /// Enters the happy expression from wherever the face currently is.
    fn enter_default(&mut self, entry_duration_ms: u64) {
        if !self.set_emotion(EmotionKind::Happy, None, None) {
            self.emotions
                .emotion()
                .enter(&mut self.scene, entry_duration_ms);
        }
    }
}

/// The lock-guarded face shared between threads.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `L` - Light driver implementation type
/// * `R` - Renderer implementation type
///
/// # Errors
/// Every method returns [`StateError::LockTimeout`] if another caller holds
/// the lock for longer than [`EngineConfig::lock_timeout_ms`].
pub struct FaceState<I: TimeInstant, T: TimeSource<I>, L: LightDriver, R: Renderer<I>> {
    engine: Mutex<Engine<I, T, L, R>>,
    config: EngineConfig,
}

impl<I, T, L, R> FaceState<I, T, L, R>
where
    I: TimeInstant,
    T: TimeSource<I>,
    L: LightDriver,
    R: Renderer<I>,
{
    /// Creates the face in the start-up emotion with the screen on.
    ///
    /// The initial hue, saturation and value are read from `light`.
    pub fn new(clock: T, light: L, renderer: R, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = clock.now();
        let scene = Scene::new(clock, light, rng, config.geometry);
        let emotions = EmotionManager::new(
            Mood::new(config.initial_social, config.initial_tired),
            config.entry_duration_ms,
            now,
        );
        Self {
            engine: Mutex::new(Engine {
                scene,
                emotions,
                renderer,
                screen_on: true,
            }),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, Engine<I, T, L, R>>, StateError> {
        self.engine
            .try_lock_for(self.config.lock_timeout())
            .ok_or_else(|| {
                warn!(
                    timeout_ms = self.config.lock_timeout_ms,
                    "face state lock timed out"
                );
                StateError::LockTimeout
            })
    }

    /// Runs `f` with the lock held.
    ///
    /// Use this to compose several engine operations into one acquisition.
    pub fn with_engine<U>(&self, f: impl FnOnce(&mut Engine<I, T, L, R>) -> U) -> Result<U, StateError> {
        let mut engine = self.lock()?;
        Ok(f(&mut *engine))
    }

    /// Advances the animations and draws a frame.
    ///
    /// With `status_override`, those values are merged into the status
    /// directly and the animator is not advanced.
    pub fn advance_and_render(
        &self,
        status_override: Option<&StatusDelta>,
    ) -> Result<RenderOutcome, StateError> {
        Ok(self.lock()?.advance_and_render(status_override))
    }

    /// True while any animation is queued or active, or any particle is
    /// active or pending.
    pub fn is_animation_active(&self) -> Result<bool, StateError> {
        Ok(self.lock()?.scene.is_animation_active())
    }

    /// Schedules `delta` over `duration`. See
    /// [`StatusAnimator::trigger_animation`](crate::StatusAnimator::trigger_animation).
    pub fn trigger_animation(
        &self,
        delta: &StatusDelta,
        duration: I::Duration,
        profile: TimingProfile,
        force: bool,
    ) -> Result<(), StateError> {
        self.lock()?
            .scene
            .trigger_animation(delta, duration.as_millis(), profile, force);
        Ok(())
    }

    pub fn trigger_wait_animation(&self, duration: I::Duration) -> Result<(), StateError> {
        self.lock()?
            .scene
            .trigger_wait_animation(duration.as_millis());
        Ok(())
    }

    pub fn spawn_particle(&self, particle: Particle<I>) -> Result<(), StateError> {
        self.lock()?.scene.spawn_particle(particle);
        Ok(())
    }

    pub fn queue_particle(&self, particle: Particle<I>, delay: I::Duration) -> Result<(), StateError> {
        self.lock()?
            .scene
            .queue_particle(particle, delay.as_millis());
        Ok(())
    }

    /// Live status, with hue/saturation/value re-read from the light.
    pub fn get_current_state(&self) -> Result<Status, StateError> {
        Ok(self.lock()?.scene.current_status())
    }

    /// Status once all scheduled motion completes.
    pub fn get_final_state(&self) -> Result<Status, StateError> {
        Ok(self.lock()?.scene.final_status())
    }

    /// Time until all scheduled motion completes.
    pub fn get_final_time(&self) -> Result<I::Duration, StateError> {
        let ms = self.lock()?.scene.final_time_ms();
        Ok(I::Duration::from_millis(ms))
    }

    /// Writes the live status to `store`.
    pub fn save_state<S: StateStore + ?Sized>(&self, store: &mut S) -> Result<(), StateError> {
        let status = self.lock()?.scene.current_status();
        store.save(&status)?;
        info!("face state saved");
        Ok(())
    }

    /// Restores the face after a restart.
    ///
    /// With `reset`, the stored record replaces the status and is drawn
    /// immediately. Without `reset`, or when the record is missing or
    /// corrupt, the face enters the happy expression instead.
    ///
    /// # Returns
    /// `true` if the stored record was restored.
    pub fn load_state<S: StateStore + ?Sized>(&self, store: &S, reset: bool) -> Result<bool, StateError> {
        let stored = if reset {
            match store.load() {
                Ok(stored) => stored,
                Err(err) => {
                    warn!(error = %err, "ignoring stored face state");
                    None
                }
            }
        } else {
            None
        };

        let mut engine = self.lock()?;
        match stored {
            Some(status) => {
                engine.restore(status);
                info!("face state restored");
                Ok(true)
            }
            None => {
                engine.enter_default(self.config.entry_duration_ms);
                info!("face state defaulted to happy");
                Ok(false)
            }
        }
    }

    /// Drops every animation and particle.
    pub fn reset_animation(&self) -> Result<(), StateError> {
        self.lock()?.scene.reset();
        Ok(())
    }

    /// Polls the active emotion's triggers once.
    ///
    /// Does nothing while the screen is off.
    ///
    /// # Returns
    /// The behaviours that fired.
    pub fn check_animation_triggers(&self) -> Result<heapless::Vec<Behavior, 4>, StateError> {
        Ok(self.lock()?.check_triggers())
    }

    /// Switches emotion by wire name and/or updates the mood.
    ///
    /// The name is validated before the lock is taken.
    ///
    /// # Returns
    /// `true` if the emotion or mood changed.
    pub fn update_emotion(
        &self,
        name: &str,
        social: Option<f32>,
        tired: Option<f32>,
    ) -> Result<bool, StateError> {
        let kind: EmotionKind = name.parse()?;
        Ok(self.lock()?.set_emotion(kind, social, tired))
    }

    /// Active emotion and mood.
    pub fn emotion(&self) -> Result<(EmotionKind, Mood), StateError> {
        let engine = self.lock()?;
        let emotion = engine.emotions.emotion();
        Ok((emotion.kind(), emotion.mood()))
    }

    pub fn set_screen_on(&self, on: bool) -> Result<(), StateError> {
        self.lock()?.screen_on = on;
        Ok(())
    }

    pub fn is_screen_on(&self) -> Result<bool, StateError> {
        Ok(self.lock()?.screen_on)
    }

    /// Applies `action`.
    ///
    /// # Returns
    /// The render outcome for [`FaceAction::Render`], `None` otherwise.
    pub fn handle_action(&self, action: FaceAction<I>) -> Result<Option<RenderOutcome>, StateError> {
        let mut engine = self.lock()?;
        match action {
            FaceAction::Animate {
                delta,
                duration,
                profile,
                force,
            } => {
                engine
                    .scene
                    .trigger_animation(&delta, duration.as_millis(), profile, force);
            }
            FaceAction::Wait(duration) => {
                engine.scene.trigger_wait_animation(duration.as_millis());
            }
            FaceAction::Spawn(particle) => engine.scene.spawn_particle(particle),
            FaceAction::Queue { particle, delay } => {
                engine.scene.queue_particle(particle, delay.as_millis());
            }
            FaceAction::Reset => engine.scene.reset(),
            FaceAction::SetEmotion { name, social, tired } => {
                let kind: EmotionKind = name.parse()?;
                engine.set_emotion(kind, social, tired);
            }
            FaceAction::Render => return Ok(Some(engine.advance_and_render(None))),
        }
        Ok(None)
    }
}
