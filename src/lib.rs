#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Status`**: Every face and light property as one fixed-field record
//! - **`StatusDelta`**: A sparse set of property targets, used for animations and per-tick updates
//! - **`TimingProfile`**: How a property moves between values (`Linear`, `EaseIn`, `EaseOut`, `EaseInOut`)
//! - **`StatusAnimator`**: Chains and interleaves per-property animations over time
//! - **`Particle`** / **`ParticleQueue`**: Tears and hearts that fly off the face, optionally after a delay
//! - **`Trigger`**: A stochastic event source with a time-dependent hazard curve
//! - **`EmotionKind`** / **`EmotionManager`**: Named moods with an entry expression and their own triggers
//! - **`FaceState`**: The lock-guarded owner of all of the above, shared between threads
//! - **`Renderer`** / **`LightDriver`**: Traits to implement for your display and light ring
//! - **`TimeSource`**: Trait to implement for your timing system
//! - **`FaceAction`**: Commands that can be sent to the face
//!
//! Hue is in degrees (0-360); saturation and value are 0.0-1.0. The light ring
//! is the source of truth for those three fields and is re-read before they
//! are used.

pub use palette::{Hsv, Srgb};

pub mod time;
pub mod types;
pub mod status;
pub mod colors;
pub mod particle;
pub mod animator;
pub mod trigger;
pub mod scene;
pub mod bank;
pub mod emotion;
pub mod config;
pub mod persist;
pub mod state;
pub mod command;

pub use animator::{ActiveAnimation, AnimationDescriptor, StatusAnimator};
pub use colors::{COLOR_OFF, RgbLed, RgbRing};
pub use command::FaceAction;
pub use config::{EngineConfig, FaceGeometry};
pub use emotion::{Emotion, EmotionBehavior, EmotionKind, EmotionManager, Flourish, Mood, UnknownEmotion};
pub use particle::{Particle, ParticleFrame, ParticleKind, ParticleQueue, Spawn, retain_within};
pub use persist::{JsonFileStore, MemoryStore, StateStore, StoreError};
pub use scene::{LightDriver, Renderer, Scene, Stage};
pub use state::{Engine, FaceState, RenderOutcome, StateError};
pub use status::Status;
pub use time::{StdClock, TimeDuration, TimeInstant, TimeSource};
pub use trigger::{Behavior, Hazard, Trigger, weighted_choice};
pub use types::{Property, PropertyMap, StatusDelta, TimingProfile, UnknownProperty};
