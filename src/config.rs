// config.rs - Simulation and reveal parameters
//
// Hosts pass a JSON object of overrides; anything omitted falls back to the
// defaults below. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// Defaults
const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_MIN_VELOCITY: f32 = 0.01;
const DEFAULT_MAX_VELOCITY: f32 = 0.05;
const DEFAULT_LIFETIME: f32 = 120.0; // steps; 2s at 60fps
const DEFAULT_DENSITY: f32 = 8.0;
const DEFAULT_FILL: &str = "#000000";
const DEFAULT_FPS: f64 = 60.0;
const DEFAULT_REVEAL_MS: f64 = 500.0;
const MIN_FPS: f64 = 1.0;

/// Parameters shared by every particle a field creates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Size multiplier applied to the 1x1..2x2 templates
    pub scale: f32,
    /// Speed bounds in units per step
    pub min_velocity: f32,
    pub max_velocity: f32,
    /// Base lifetime in steps (each particle varies +-50%)
    pub particle_lifetime: f32,
    /// Target particles per 100 square units
    pub density: f32,
    #[serde(alias = "textColor")]
    pub fill_color: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            min_velocity: DEFAULT_MIN_VELOCITY,
            max_velocity: DEFAULT_MAX_VELOCITY,
            particle_lifetime: DEFAULT_LIFETIME,
            density: DEFAULT_DENSITY,
            fill_color: DEFAULT_FILL.to_string(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        finite("scale", self.scale)?;
        finite("minVelocity", self.min_velocity)?;
        finite("maxVelocity", self.max_velocity)?;
        finite("particleLifetime", self.particle_lifetime)?;
        finite("density", self.density)?;

        if self.scale <= 0.0 {
            return Err(Error::invalid("scale", "must be positive"));
        }
        if self.min_velocity < 0.0 {
            return Err(Error::invalid("minVelocity", "must not be negative"));
        }
        if self.min_velocity > self.max_velocity {
            return Err(Error::invalid(
                "maxVelocity",
                format!("{} is below minVelocity {}", self.max_velocity, self.min_velocity),
            ));
        }
        if self.particle_lifetime <= 0.0 {
            return Err(Error::invalid("particleLifetime", "must be positive"));
        }
        if self.density < 0.0 {
            return Err(Error::invalid("density", "must not be negative"));
        }
        if self.fill_color.trim().is_empty() {
            return Err(Error::invalid("fillColor", "must not be empty"));
        }
        Ok(())
    }
}

/// Timing of the frame loop and of the reveal sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    pub fps: f64,
    /// Duration of the host's text fade-in, passed through on `reveal_started`
    pub reveal_duration_ms: f64,
    /// Delay between activation and stopping particle spawning
    pub spawn_stop_delay_ms: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            reveal_duration_ms: DEFAULT_REVEAL_MS,
            spawn_stop_delay_ms: 0.0,
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fps.is_nan() {
            return Err(Error::invalid("fps", "must be a number"));
        }
        if !self.reveal_duration_ms.is_finite() || self.reveal_duration_ms < 0.0 {
            return Err(Error::invalid("revealDurationMs", "must be a non-negative number"));
        }
        if !self.spawn_stop_delay_ms.is_finite() || self.spawn_stop_delay_ms < 0.0 {
            return Err(Error::invalid("spawnStopDelayMs", "must be a non-negative number"));
        }
        Ok(())
    }

    /// Target milliseconds between simulation steps; fps is clamped to >= 1
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps.max(MIN_FPS)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoilerConfig {
    #[serde(flatten)]
    pub sim: SimConfig,
    #[serde(flatten)]
    pub reveal: RevealConfig,
}

impl SpoilerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SpoilerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sim.validate()?;
        self.reveal.validate()
    }
}

fn finite(field: &'static str, v: f32) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(field, "must be a finite number"))
    }
}
