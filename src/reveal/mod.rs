// reveal/ - Hidden -> Revealing -> Revealed state machine
//
// Drives every particle field from host ticks, throttled to the configured
// fps. Activation stops spawning (after an optional delay) and the loop keeps
// going until every field has run dry on its own.

mod host;
mod pacer;

pub use host::{Host, PendingTimer, QueuedHost, RevealEvent, TickToken, TimerToken};
pub use pacer::FramePacer;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::config::SpoilerConfig;
use crate::error::Result;
use crate::render::Surface;
use crate::sim::{ParticleField, entropy_seed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealing,
    Revealed,
}

impl RevealState {
    /// CSS class name for the host element
    pub fn as_str(self) -> &'static str {
        match self {
            RevealState::Hidden => "hidden",
            RevealState::Revealing => "revealing",
            RevealState::Revealed => "revealed",
        }
    }
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys that activate the reveal when the element has focus
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// One text rectangle as handed over by the host
pub struct Region<S> {
    pub surface: S,
    pub width: f32,
    pub height: f32,
}

impl<S> Region<S> {
    pub fn new(surface: S, width: f32, height: f32) -> Self {
        Self { surface, width, height }
    }
}

struct Slot<S> {
    field: ParticleField,
    surface: S,
}

pub struct RevealController<S: Surface, H: Host> {
    config: SpoilerConfig,
    host: H,
    state: RevealState,
    slots: Vec<Slot<S>>,
    pacer: FramePacer,
    tick: Option<TickToken>,
    stop_timer: Option<TimerToken>,
    spawning_stopped: bool,
    disposed: bool,
    rng: SmallRng,
}

impl<S: Surface, H: Host> RevealController<S, H> {
    pub fn new(config: SpoilerConfig, host: H) -> Result<Self> {
        Self::with_seed(config, host, entropy_seed())
    }

    /// Deterministic particle fields, for tests and reproducible demos
    pub fn with_seed(config: SpoilerConfig, host: H, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pacer: FramePacer::new(config.reveal.frame_interval_ms()),
            config,
            host,
            state: RevealState::Hidden,
            slots: Vec::new(),
            tick: None,
            stop_timer: None,
            spawning_stopped: false,
            disposed: false,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Replace all fields after a layout pass. Regions whose surface could
    /// not be acquired are skipped.
    pub fn set_regions<I>(&mut self, regions: I)
    where
        I: IntoIterator<Item = Result<Region<S>>>,
    {
        if self.disposed || self.state == RevealState::Revealed {
            log::debug!("layout ignored in state {}", self.state);
            return;
        }

        self.slots.clear();
        for (i, region) in regions.into_iter().enumerate() {
            let region = match region {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("skipping region {i}: {e}");
                    continue;
                }
            };

            let rng = SmallRng::seed_from_u64(self.rng.r#gen());
            let mut field =
                ParticleField::with_rng(self.config.sim.clone(), region.width, region.height, rng);
            if self.spawning_stopped {
                field.stop_spawning();
            }
            self.slots.push(Slot { field, surface: region.surface });
        }

        log::debug!("layout: {} active regions", self.slots.len());
        self.ensure_ticking();
    }

    /// Forward a size change to one field. Returns false for unknown indices.
    pub fn resize_region(&mut self, index: usize, width: f32, height: f32) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.field.update_dimensions(width, height);
                true
            }
            None => false,
        }
    }

    /// Begin the reveal. Repeated calls are no-ops.
    pub fn activate(&mut self) {
        if self.disposed || self.state != RevealState::Hidden {
            return;
        }

        self.state = RevealState::Revealing;
        log::info!("spoiler revealing ({} regions)", self.slots.len());

        self.host.reveal_started(self.config.reveal.reveal_duration_ms);
        self.stop_timer = Some(self.host.after(self.config.reveal.spawn_stop_delay_ms));
        self.ensure_ticking();
    }

    /// Deferred stop-spawn callback
    pub fn on_timer(&mut self, token: TimerToken) {
        if self.stop_timer != Some(token) {
            log::debug!("ignoring stale timer {token:?}");
            return;
        }
        self.stop_timer = None;

        if self.disposed || self.state != RevealState::Revealing {
            return;
        }

        self.spawning_stopped = true;
        for slot in &mut self.slots {
            slot.field.stop_spawning();
        }
        log::debug!("spawning stopped");
    }

    /// Display tick. Steps and draws every field if a frame interval has passed.
    pub fn on_tick(&mut self, token: TickToken, now_ms: f64) {
        if self.tick != Some(token) {
            log::warn!("ignoring stale tick {token:?}");
            return;
        }
        self.tick = None;

        if self.disposed || self.state == RevealState::Revealed {
            return;
        }

        if !self.pacer.ready(now_ms) {
            self.ensure_ticking();
            return;
        }

        for slot in &mut self.slots {
            let (w, h) = (slot.field.width(), slot.field.height());
            slot.surface.clear(w, h);
            slot.field.update();
            slot.field.draw(&mut slot.surface);
        }

        if self.state == RevealState::Revealing && self.all_fields_empty() {
            self.finish();
        } else {
            self.ensure_ticking();
        }
    }

    /// Tear down from any state. Later ticks, timers and activations do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cancel_tick();
        self.stop_timer = None;
        self.slots.clear();
        log::debug!("spoiler disposed in state {}", self.state);
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealing(&self) -> bool {
        self.state == RevealState::Revealing
    }

    pub fn is_revealed(&self) -> bool {
        self.state == RevealState::Revealed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn region_count(&self) -> usize {
        self.slots.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &ParticleField> {
        self.slots.iter().map(|s| &s.field)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &S> {
        self.slots.iter().map(|s| &s.surface)
    }

    pub fn all_fields_empty(&self) -> bool {
        self.slots.iter().all(|s| !s.field.has_particles())
    }

    /// Upper bound, in steps, on how long the current particles can live
    pub fn max_remaining_lifetime(&self) -> f32 {
        self.fields().map(|f| f.max_particle_lifetime()).fold(0.0, f32::max)
    }

    pub fn config(&self) -> &SpoilerConfig {
        &self.config
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn finish(&mut self) {
        self.state = RevealState::Revealed;
        self.cancel_tick();
        self.stop_timer = None;
        self.slots.clear();
        self.host.reveal_finished();
        log::info!("spoiler revealed");
    }

    fn ensure_ticking(&mut self) {
        if self.tick.is_none() && !self.disposed && self.state != RevealState::Revealed {
            self.tick = Some(self.host.request_tick());
        }
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.tick.take() {
            self.host.cancel_tick(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(RevealState::Hidden.to_string(), "hidden");
        assert_eq!(RevealState::Revealing.as_str(), "revealing");
        assert_eq!(RevealState::Revealed.to_string(), "revealed");
    }

    #[test]
    fn activation_keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("a"));
        assert!(!is_activation_key("Escape"));
        assert!(!is_activation_key("Space"));
    }
}
