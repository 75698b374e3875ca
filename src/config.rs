//! Engine configuration.
//!
//! Every field has a default matching the round 240x240 display the face was
//! designed for, so an empty JSON object is a valid configuration.

use crate::particle::DEFAULT_PARTICLE_CUTOFF;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display geometry the animation bank needs to place particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceGeometry {
    /// Display centre, used for particle expiry.
    pub center: (f32, f32),
    /// Eye height in pixels; tears spawn just below the lower lid.
    pub eye_height: f32,
    /// Horizontal distance from the face centre to each eye.
    pub eye_offset: f32,
    /// Particles further than this from `center` are dropped by the renderer.
    pub particle_cutoff: f32,
}

impl Default for FaceGeometry {
    fn default() -> Self {
        Self {
            center: (120.0, 120.0),
            eye_height: 90.0,
            eye_offset: 45.0,
            particle_cutoff: DEFAULT_PARTICLE_CUTOFF,
        }
    }
}

/// Tunables for [`FaceState`](crate::FaceState).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a caller waits for the state lock before skipping its tick.
    pub lock_timeout_ms: u64,
    /// Duration of the transition into an emotion's resting expression.
    pub entry_duration_ms: u64,
    /// Social value the start-up emotion begins with (0-100).
    pub initial_social: f32,
    /// Tired value the start-up emotion begins with (0-100).
    pub initial_tired: f32,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub geometry: FaceGeometry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 10,
            entry_duration_ms: 3000,
            initial_social: 50.0,
            initial_tired: 50.0,
            rng_seed: None,
            geometry: FaceGeometry::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Deterministic configuration for tests and simulations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.geometry.particle_cutoff, 150.0);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = EngineConfig::from_json_str(
            r#"{"lock_timeout_ms": 50, "rng_seed": 3, "geometry": {"eye_height": 80.0}}"#,
        )
        .unwrap();
        assert_eq!(config.lock_timeout(), Duration::from_millis(50));
        assert_eq!(config.rng_seed, Some(3));
        assert_eq!(config.geometry.eye_height, 80.0);
        assert_eq!(config.geometry.center, (120.0, 120.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json_str("{\"lock_timeout_ms\": \"soon\"}").is_err());
    }
}
