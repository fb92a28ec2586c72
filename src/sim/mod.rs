// sim/ - Particle field simulation
//
// One field per text region. The field keeps its population near a
// density-derived target until spawning is stopped, after which it only
// shrinks as particles die or wander off.

mod particle;

pub use particle::{Particle, fade_alpha};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::render::Surface;

// Fraction of the target population present right after construction
const PREPOPULATE_FRACTION: f32 = 0.5;

// Out-of-bounds margin as a fraction of the larger dimension
const BOUNDS_MARGIN: f32 = 0.5;

/// Desired live population for a `width` x `height` area
#[inline]
pub fn target_count(width: f32, height: f32, density: f32) -> usize {
    let n = (width * height / 100.0 * density).ceil();
    if n > 0.0 { n as usize } else { 0 }
}

/// Seed for production generators: browser entropy on wasm, clock elsewhere
pub fn entropy_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0xDEADBEEF)
    }
}

pub struct ParticleField<R: Rng = SmallRng> {
    particles: Vec<Particle>,
    config: SimConfig,
    width: f32,
    height: f32,
    spawning: bool,
    rng: R,
}

impl ParticleField<SmallRng> {
    pub fn new(config: SimConfig, width: f32, height: f32) -> Self {
        Self::with_rng(config, width, height, SmallRng::seed_from_u64(entropy_seed()))
    }
}

impl<R: Rng> ParticleField<R> {
    /// Build a field and pre-populate half its target, at staggered life stages
    pub fn with_rng(config: SimConfig, width: f32, height: f32, rng: R) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            config,
            width,
            height,
            spawning: true,
            rng,
        };

        let initial = (field.target_count() as f32 * PREPOPULATE_FRACTION).ceil() as usize;
        field.particles.reserve(field.target_count());
        for _ in 0..initial {
            let mut p = field.spawn_one();
            p.life = field.rng.r#gen::<f32>() * p.max_life;
            field.particles.push(p);
        }

        log::debug!(
            "particle field {}x{}: target {}, prepopulated {}",
            width,
            height,
            field.target_count(),
            initial
        );
        field
    }

    /// Bounds used by later steps; existing particles are left where they are
    pub fn update_dimensions(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// One simulation step
    pub fn update(&mut self) {
        let (w, h) = (self.width, self.height);
        let margin = w.max(h) * BOUNDS_MARGIN;

        self.particles.retain_mut(|p| {
            p.step();
            !(p.is_dead() || p.is_out_of_bounds(w, h, margin))
        });

        if self.spawning {
            let target = self.target_count();
            while self.particles.len() < target {
                let p = self.spawn_one();
                self.particles.push(p);
            }
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_fill_color(&self.config.fill_color);
        for p in self.particles.iter().filter(|p| p.alpha > 0.0) {
            surface.fill_rect(p.x.round(), p.y.round(), p.w.ceil(), p.h.ceil(), p.alpha);
        }
        surface.reset_alpha();
    }

    /// Stop replenishing. One-way.
    pub fn stop_spawning(&mut self) {
        self.spawning = false;
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn has_particles(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Largest remaining life in the population, 0 when empty
    pub fn max_particle_lifetime(&self) -> f32 {
        self.particles.iter().map(|p| p.life).fold(0.0, f32::max)
    }

    /// Drop every particle at once
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn target_count(&self) -> usize {
        target_count(self.width, self.height, self.config.density)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn spawn_one(&mut self) -> Particle {
        Particle::spawn(&self.config, self.width, self.height, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn field(width: f32, height: f32, density: f32, seed: u64) -> ParticleField {
        let config = SimConfig { density, ..Default::default() };
        ParticleField::with_rng(config, width, height, SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn construction_prepopulates_half_the_target() {
        let f = field(100.0, 50.0, 8.0, 1);
        assert_eq!(f.target_count(), 400);
        assert_eq!(f.len(), 200);
        assert!(f.particles().iter().all(|p| p.life >= 0.0 && p.life <= p.max_life));
    }

    #[test]
    fn target_count_rounds_up() {
        assert_eq!(target_count(10.0, 10.0, 0.5), 1);
        assert_eq!(target_count(7.0, 3.0, 1.0), 1);
        assert_eq!(target_count(0.0, 30.0, 8.0), 0);
        assert_eq!(target_count(30.0, 30.0, 0.0), 0);
    }

    #[test]
    fn same_seed_same_population() {
        let mut a = field(80.0, 20.0, 8.0, 42);
        let mut b = field(80.0, 20.0, 8.0, 42);
        for _ in 0..30 {
            a.update();
            b.update();
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn population_holds_at_target_while_spawning() {
        let mut f = field(60.0, 20.0, 8.0, 3);
        let target = f.target_count();
        for _ in 0..1000 {
            f.update();
            assert_eq!(f.len(), target);
        }
    }

    #[test]
    fn stop_spawning_drains_the_field() {
        let mut f = field(60.0, 20.0, 8.0, 4);
        for _ in 0..50 {
            f.update();
        }
        f.stop_spawning();
        let bound = f.max_particle_lifetime().ceil() as usize;

        let mut prev = f.len();
        let mut steps = 0;
        while f.has_particles() {
            f.update();
            steps += 1;
            assert!(f.len() <= prev);
            prev = f.len();
            assert!(steps <= bound, "field outlived its longest particle");
        }
        assert_eq!(f.max_particle_lifetime(), 0.0);
    }

    #[test]
    fn stop_spawning_is_a_latch() {
        let mut f = field(30.0, 30.0, 1.0, 5);
        f.stop_spawning();
        f.update_dimensions(300.0, 300.0);
        f.update();
        assert!(!f.is_spawning());
        assert!(f.len() <= 5);
    }

    #[test]
    fn max_particle_lifetime_matches_population() {
        let mut f = field(40.0, 40.0, 2.0, 6);
        f.update();
        let expected = f.particles().iter().map(|p| p.life).fold(f32::MIN, f32::max);
        assert_eq!(f.max_particle_lifetime(), expected);

        f.clear();
        assert!(!f.has_particles());
        assert_eq!(f.max_particle_lifetime(), 0.0);
    }

    #[test]
    fn resize_rebalances_on_next_step() {
        let mut f = field(50.0, 20.0, 4.0, 8);
        f.update();
        assert_eq!(f.len(), 40);

        f.update_dimensions(100.0, 20.0);
        assert_eq!(f.len(), 40);
        f.update();
        assert_eq!(f.len(), 80);
    }

    #[test]
    fn update_evicts_particles_that_drift_out_of_bounds() {
        let config = SimConfig {
            min_velocity: 100.0,
            max_velocity: 100.0,
            particle_lifetime: 1000.0,
            ..Default::default()
        };
        let mut f = ParticleField::with_rng(config, 40.0, 10.0, SmallRng::seed_from_u64(10));
        f.stop_spawning();
        assert!(f.has_particles());
        assert!(f.particles().iter().all(|p| p.max_life >= 500.0));

        // One step moves every particle 100 units, well past the 20 unit margin
        f.update();
        assert!(!f.has_particles());
    }

    #[test]
    fn draw_emits_visible_particles_only() {
        let mut f = field(40.0, 10.0, 8.0, 9);
        f.update();
        let mut list = DrawList::new();
        f.draw(&mut list);

        let visible = f.particles().iter().filter(|p| p.alpha > 0.0).count();
        let cmds = list.commands();
        assert_eq!(cmds.first(), Some(&DrawCommand::FillColor("#000000".to_string())));
        assert_eq!(cmds.last(), Some(&DrawCommand::ResetAlpha));
        assert_eq!(list.rect_count(), visible);

        for cmd in cmds {
            if let DrawCommand::Rect { x, y, w, h, alpha } = *cmd {
                assert_eq!(x, x.round());
                assert_eq!(y, y.round());
                assert!(w >= 1.0 && h >= 1.0);
                assert!(alpha > 0.0 && alpha <= 1.0);
            }
        }
    }

    proptest! {
        #[test]
        fn life_and_alpha_stay_in_range(
            seed in any::<u64>(),
            width in 1.0f32..200.0,
            height in 1.0f32..60.0,
            lifetime in 1.0f32..200.0,
            density in 0.0f32..10.0,
            steps in 1usize..120,
        ) {
            let config = SimConfig { particle_lifetime: lifetime, density, ..Default::default() };
            let mut f = ParticleField::with_rng(config, width, height, SmallRng::seed_from_u64(seed));
            for i in 0..steps {
                if i == steps / 2 {
                    f.stop_spawning();
                }
                f.update();
                for p in f.particles() {
                    prop_assert!(p.life > 0.0 && p.life <= p.max_life);
                    prop_assert!(p.alpha >= 0.0 && p.alpha <= p.max_alpha);
                    prop_assert!(p.max_alpha > 0.0 && p.max_alpha <= 1.0);
                }
            }
        }
    }
}
