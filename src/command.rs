//! Command-based control of the face.
//!
//! Lets a collaborator such as the remote sync loop describe its changes as
//! data and hand them to [`FaceState::handle_action`](crate::FaceState::handle_action).

use crate::particle::Particle;
use crate::time::TimeInstant;
use crate::types::{StatusDelta, TimingProfile};

/// Actions accepted by the face.
#[derive(Debug, Clone)]
pub enum FaceAction<I: TimeInstant> {
    /// Schedule a multi-property animation.
    Animate {
        delta: StatusDelta,
        duration: I::Duration,
        profile: TimingProfile,
        force: bool,
    },
    /// Hold the face still before the next chained animation.
    Wait(I::Duration),
    /// Show a particle now.
    Spawn(Particle<I>),
    /// Show a particle after a delay.
    Queue { particle: Particle<I>, delay: I::Duration },
    /// Switch emotion and/or update its mood. `None` keeps the current value.
    SetEmotion {
        name: String,
        social: Option<f32>,
        tired: Option<f32>,
    },
    /// Drop every animation and particle.
    Reset,
    /// Advance and draw one frame.
    Render,
}

impl<I: TimeInstant> FaceAction<I> {
    /// Non-forced animation with the given profile.
    pub fn animate(delta: StatusDelta, duration: I::Duration, profile: TimingProfile) -> Self {
        FaceAction::Animate {
            delta,
            duration,
            profile,
            force: false,
        }
    }

    /// Emotion switch without touching the mood.
    pub fn set_emotion(name: impl Into<String>) -> Self {
        FaceAction::SetEmotion {
            name: name.into(),
            social: None,
            tired: None,
        }
    }
}
