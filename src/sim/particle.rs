// particle.rs - A single obscuring rectangle
//
// Particles drift in a straight line, fade in over the first 20% of their
// life, hold, then fade out over the last 20%.

use rand::Rng;
use std::f32::consts::TAU;

use crate::config::SimConfig;

// Base footprints in abstract units, scaled by SimConfig::scale
const SIZE_TEMPLATES: [(f32, f32); 4] = [(1.0, 1.0), (1.0, 2.0), (2.0, 1.0), (2.0, 2.0)];

// Keep spawned particles this far inside every edge
const SPAWN_PADDING: f32 = 2.0;

const LIFETIME_VARIATION: f32 = 0.5;
const FADE_FRACTION: f32 = 0.2;

// Half of all particles are dimmer, with max alpha in [DIM_MIN, DIM_MAX]
const DIM_CHANCE: f32 = 0.5;
const DIM_MIN: f32 = 0.3;
const DIM_MAX: f32 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    // Position (field-local, origin top-left)
    pub x: f32,
    pub y: f32,

    // Velocity per step
    pub vx: f32,
    pub vy: f32,

    // Extent
    pub w: f32,
    pub h: f32,

    // Lifetime in steps
    pub life: f32,
    pub max_life: f32,

    // Opacity
    pub alpha: f32,
    pub max_alpha: f32,
}

impl Particle {
    /// Spawn a particle somewhere inside a `width` x `height` area
    pub fn spawn<R: Rng>(config: &SimConfig, width: f32, height: f32, rng: &mut R) -> Self {
        let (tw, th) = SIZE_TEMPLATES[rng.gen_range(0..SIZE_TEMPLATES.len())];
        let w = tw * config.scale;
        let h = th * config.scale;

        // Usable span collapses to zero when the area is smaller than particle + padding
        let span_x = (width - w - 2.0 * SPAWN_PADDING).max(0.0);
        let span_y = (height - h - 2.0 * SPAWN_PADDING).max(0.0);
        let x = SPAWN_PADDING + rng.r#gen::<f32>() * span_x;
        let y = SPAWN_PADDING + rng.r#gen::<f32>() * span_y;

        let angle = rng.r#gen::<f32>() * TAU;
        let speed = lerp(config.min_velocity, config.max_velocity, rng.r#gen::<f32>());

        let base = config.particle_lifetime;
        let life = lerp(
            base * (1.0 - LIFETIME_VARIATION),
            base * (1.0 + LIFETIME_VARIATION),
            rng.r#gen::<f32>(),
        );

        let max_alpha = if rng.r#gen::<f32>() < DIM_CHANCE {
            1.0
        } else {
            lerp(DIM_MIN, DIM_MAX, rng.r#gen::<f32>())
        };

        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            w,
            h,
            life,
            max_life: life,
            alpha: 0.0,
            max_alpha,
        }
    }

    /// Advance one step: move, age, re-ease opacity
    #[inline]
    pub fn step(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.life -= 1.0;
        self.alpha = fade_alpha(self.life, self.max_life, self.max_alpha);
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// True once the particle has drifted more than `margin` past any edge
    #[inline]
    pub fn is_out_of_bounds(&self, width: f32, height: f32, margin: f32) -> bool {
        self.x < -margin || self.x > width + margin || self.y < -margin || self.y > height + margin
    }
}

/// Three-phase opacity: ramp up, hold, ramp down.
/// Fade-in is checked first, so it wins where the two windows overlap.
pub fn fade_alpha(life: f32, max_life: f32, max_alpha: f32) -> f32 {
    let fade = max_life * FADE_FRACTION;
    let a = if life > max_life - fade {
        max_alpha * (max_life - life) / fade
    } else if life < fade {
        max_alpha * life / fade
    } else {
        max_alpha
    };
    a.clamp(0.0, max_alpha)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn spawn_respects_config_ranges() {
        let config = SimConfig { scale: 3.0, ..Default::default() };
        let mut rng = rng();
        for _ in 0..500 {
            let p = Particle::spawn(&config, 200.0, 40.0, &mut rng);
            assert!([3.0, 6.0].contains(&p.w) && [3.0, 6.0].contains(&p.h));
            assert!(p.x >= SPAWN_PADDING && p.x + p.w <= 200.0 - SPAWN_PADDING + 1e-3);
            assert!(p.y >= SPAWN_PADDING && p.y + p.h <= 40.0 - SPAWN_PADDING + 1e-3);

            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!(speed >= config.min_velocity - 1e-6 && speed <= config.max_velocity + 1e-6);

            assert!(p.max_life >= 60.0 && p.max_life <= 180.0);
            assert_eq!(p.life, p.max_life);
            assert_eq!(p.alpha, 0.0);
            assert!(p.max_alpha == 1.0 || (DIM_MIN..=DIM_MAX).contains(&p.max_alpha));
        }
    }

    #[test]
    fn tiny_area_pins_to_padding_corner() {
        let config = SimConfig::default();
        let mut rng = rng();
        for _ in 0..50 {
            let p = Particle::spawn(&config, 3.0, 1.0, &mut rng);
            assert_eq!((p.x, p.y), (SPAWN_PADDING, SPAWN_PADDING));
        }
    }

    #[test]
    fn max_alpha_is_bimodal() {
        let config = SimConfig::default();
        let mut rng = rng();
        let full = (0..2000)
            .filter(|_| Particle::spawn(&config, 100.0, 100.0, &mut rng).max_alpha == 1.0)
            .count();
        assert!((800..1200).contains(&full), "full-opacity count {full}");
    }

    #[test]
    fn fade_phases() {
        let max = 100.0;
        assert_eq!(fade_alpha(100.0, max, 0.8), 0.0);
        assert!((fade_alpha(90.0, max, 0.8) - 0.4).abs() < 1e-6);
        assert_eq!(fade_alpha(80.0, max, 0.8), 0.8);
        assert_eq!(fade_alpha(50.0, max, 0.8), 0.8);
        assert_eq!(fade_alpha(20.0, max, 0.8), 0.8);
        assert!((fade_alpha(10.0, max, 0.8) - 0.4).abs() < 1e-6);
        assert_eq!(fade_alpha(0.0, max, 0.8), 0.0);
    }

    #[test]
    fn alpha_rises_holds_then_falls() {
        let mut p = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.5,
            vy: -0.25,
            w: 1.0,
            h: 1.0,
            life: 50.0,
            max_life: 50.0,
            alpha: 0.0,
            max_alpha: 0.5,
        };
        let mut prev = p.alpha;
        // Fade-in: life 49..=41
        while p.life > 41.0 {
            p.step();
            assert!(p.alpha > prev);
            prev = p.alpha;
        }
        // Hold
        while p.life > 11.0 {
            p.step();
            assert_eq!(p.alpha, 0.5);
        }
        // Fade-out: life 9..=0
        prev = p.alpha;
        while !p.is_dead() {
            p.step();
            if p.life < 10.0 {
                assert!(p.alpha < prev);
            }
            prev = p.alpha;
        }
        assert_eq!(p.alpha, 0.0);
        assert!((p.x - 25.0).abs() < 1e-4 && (p.y + 12.5).abs() < 1e-4);
    }

    #[test]
    fn out_of_bounds_uses_margin() {
        let mut p = Particle::spawn(&SimConfig::default(), 100.0, 20.0, &mut rng());
        p.x = -49.0;
        assert!(!p.is_out_of_bounds(100.0, 20.0, 50.0));
        p.x = -51.0;
        assert!(p.is_out_of_bounds(100.0, 20.0, 50.0));
        p.x = 10.0;
        p.y = 71.0;
        assert!(p.is_out_of_bounds(100.0, 20.0, 50.0));
    }
}
