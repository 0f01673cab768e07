//! ParticleEmitter — фонтан частиц без физического движка
//!
//! Частицы вылетают конусом вверх из origin, интегрируются Verlet'ом
//! (позиция + прошлая позиция, скорость неявная) и умирают по возрасту.
//! Управление: `speed`, `size`, `saturation` (0..=100), мышь двигает origin.

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{Emitter, EmitterId, EmitterKind, EmitterStats, ParticleParams, StepContext};
use crate::config::MAX_PARTICLES_LIMIT;
use crate::physics::{BodyState, DEFAULT_GRAVITY};
use crate::random::random_unit;
use crate::render::Color;

/// Половина угла конуса (радианы)
const SPREAD: f32 = 0.35;
/// size (условные единицы) → радиус в метрах
const SIZE_TO_RADIUS: f32 = 0.01;
const MAX_SATURATION: u32 = 100;
const BASE_COLOR: Color = Color::rgb(1.0, 0.45, 0.1);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub enabled: bool,
    pub origin: [f32; 2],
    /// Частиц за шаг
    pub rate: u32,
    /// Секунды
    pub lifetime: f32,
    pub max_particles: usize,
    pub params: ParticleParams,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origin: [-20.0, 5.0],
            rate: 4,
            lifetime: 2.0,
            max_particles: 1000,
            params: ParticleParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    position: Vec2,
    previous: Vec2,
    age: f32,
}

impl Particle {
    fn velocity(&self, dt: f32) -> Vec2 {
        if dt > 0.0 {
            (self.position - self.previous) / dt
        } else {
            Vec2::ZERO
        }
    }
}

pub struct ParticleEmitter {
    id: EmitterId,
    name: String,
    origin: Vec2,
    params: ParticleParams,
    rate: u32,
    lifetime: f32,
    max_particles: usize,
    particles: Vec<Particle>,
    rng: ChaCha8Rng,
    step_count: u32,
    last_dt: f32,
}

impl ParticleEmitter {
    pub fn new(name: &str, config: &ParticleConfig, seed: u64) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            origin: Vec2::from(config.origin),
            params: config.params,
            rate: config.rate,
            lifetime: config.lifetime.max(0.0),
            max_particles: config.max_particles.min(MAX_PARTICLES_LIMIT),
            particles: Vec::with_capacity(config.max_particles.min(MAX_PARTICLES_LIMIT)),
            rng: ChaCha8Rng::seed_from_u64(seed),
            step_count: 0,
            last_dt: 0.0,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn radius(&self) -> f32 {
        self.params.size as f32 * SIZE_TO_RADIUS
    }

    /// Цвет частицы: насыщенность от серого к базовому, прозрачность по возрасту
    pub fn color(&self, age: f32) -> Color {
        let saturation = self.params.saturation.min(MAX_SATURATION) as f32 / MAX_SATURATION as f32;
        let gray = 0.299 * BASE_COLOR.r + 0.587 * BASE_COLOR.g + 0.114 * BASE_COLOR.b;
        let life = if self.lifetime > 0.0 {
            (1.0 - age / self.lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Color::rgba(
            gray + (BASE_COLOR.r - gray) * saturation,
            gray + (BASE_COLOR.g - gray) * saturation,
            gray + (BASE_COLOR.b - gray) * saturation,
            life,
        )
    }

    fn emit(&mut self, dt: f32) {
        let speed = self.params.speed as f32;
        for _ in 0..self.rate {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let angle = std::f32::consts::FRAC_PI_2 + SPREAD * random_unit(&mut self.rng);
            let velocity = Vec2::from_angle(angle) * speed;
            self.particles.push(Particle {
                position: self.origin,
                previous: self.origin - velocity * dt,
                age: 0.0,
            });
        }
    }

    fn integrate(&mut self, dt: f32) {
        let acceleration = DEFAULT_GRAVITY * dt * dt;
        for particle in &mut self.particles {
            let displacement = particle.position - particle.previous;
            particle.previous = particle.position;
            particle.position += displacement + acceleration;
            particle.age += dt;
        }

        let lifetime = self.lifetime;
        self.particles.retain(|p| p.age < lifetime);
    }
}

impl Emitter for ParticleEmitter {
    fn id(&self) -> EmitterId {
        self.id
    }

    fn set_id(&mut self, id: EmitterId) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn kind(&self) -> EmitterKind {
        EmitterKind::Particles
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) {
        let dt = ctx.settings.take_frame_step();
        if dt > 0.0 {
            self.integrate(dt);
            self.emit(dt);
            self.step_count += 1;
            self.last_dt = dt;
        }

        if !ctx.settings.draw_shapes {
            return;
        }
        let radius = self.radius();
        for particle in &self.particles {
            let color = self.color(particle.age);
            ctx.draw.draw_solid_circle(particle.position, radius, Vec2::X, color);
        }
    }

    fn mouse_down(&mut self, p: Vec2) {
        self.origin = p;
    }

    fn shift_origin(&mut self, origin: Vec2) {
        self.origin -= origin;
        for particle in &mut self.particles {
            particle.position -= origin;
            particle.previous -= origin;
        }
    }

    fn bodies(&self) -> Vec<BodyState> {
        self.particles
            .iter()
            .map(|p| BodyState {
                position: p.position,
                angle: 0.0,
                linear_velocity: p.velocity(self.last_dt),
                awake: true,
                dynamic: true,
            })
            .collect()
    }

    fn stats(&self) -> EmitterStats {
        EmitterStats {
            bodies: self.particles.len(),
            steps: self.step_count,
            ..Default::default()
        }
    }

    fn particles(&self) -> Option<&ParticleParams> {
        Some(&self.params)
    }

    fn particles_mut(&mut self) -> Option<&mut ParticleParams> {
        Some(&mut self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Settings;
    use crate::render::{Camera, NullDraw};

    fn run(emitter: &mut ParticleEmitter, settings: &mut Settings, steps: usize) {
        let camera = Camera::default();
        let mut draw = NullDraw;
        for _ in 0..steps {
            let mut ctx = StepContext {
                settings: &mut *settings,
                camera: &camera,
                draw: &mut draw,
            };
            emitter.step(&mut ctx);
        }
    }

    #[test]
    fn test_huge_max_particles_is_clamped() {
        let config = ParticleConfig {
            max_particles: usize::MAX,
            ..Default::default()
        };
        let mut emitter = ParticleEmitter::new("fountain", &config, 3);
        let mut settings = Settings::default();

        run(&mut emitter, &mut settings, 2);
        assert_eq!(emitter.particle_count(), 2 * config.rate as usize);
    }

    #[test]
    fn test_particles_rise_then_fall() {
        let config = ParticleConfig {
            rate: 1,
            max_particles: 1,
            lifetime: 10.0,
            ..Default::default()
        };
        let mut emitter = ParticleEmitter::new("fountain", &config, 3);
        let mut settings = Settings::default();

        run(&mut emitter, &mut settings, 1);
        let start = emitter.bodies()[0].position;

        run(&mut emitter, &mut settings, 10);
        let rising = emitter.bodies()[0];
        assert!(rising.position.y > start.y);

        // speed 12, g = 10: вершина через ~1.2s
        run(&mut emitter, &mut settings, 120);
        let falling = emitter.bodies()[0];
        assert!(falling.linear_velocity.y < 0.0);
    }

    #[test]
    fn test_lifetime_and_cap() {
        let config = ParticleConfig {
            rate: 10,
            max_particles: 25,
            lifetime: 0.1,
            ..Default::default()
        };
        let mut emitter = ParticleEmitter::new("fountain", &config, 3);
        let mut settings = Settings::default();

        run(&mut emitter, &mut settings, 3);
        assert_eq!(emitter.particle_count(), 25);

        // 0.1s = 6 шагов, частицы обновляются партиями
        run(&mut emitter, &mut settings, 30);
        assert!(emitter.particle_count() <= 25);
        assert!(emitter.bodies().iter().all(|b| b.position.y > -100.0));
    }

    #[test]
    fn test_paused_emitter_does_not_move() {
        let mut emitter = ParticleEmitter::new("fountain", &ParticleConfig::default(), 3);
        let mut settings = Settings::default();
        run(&mut emitter, &mut settings, 5);
        let before = emitter.bodies();

        settings.toggle_pause();
        run(&mut emitter, &mut settings, 5);
        assert_eq!(emitter.bodies().len(), before.len());
        for (a, b) in before.iter().zip(emitter.bodies()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn test_mouse_down_moves_origin() {
        let mut emitter = ParticleEmitter::new("fountain", &ParticleConfig::default(), 3);
        emitter.mouse_down(Vec2::new(4.0, 2.0));
        assert_eq!(emitter.origin(), Vec2::new(4.0, 2.0));

        emitter.shift_origin(Vec2::new(1.0, 1.0));
        assert_eq!(emitter.origin(), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_saturation_and_fade() {
        let mut emitter = ParticleEmitter::new("fountain", &ParticleConfig::default(), 3);
        if let Some(params) = emitter.particles_mut() {
            params.saturation = 0;
        }
        let gray = emitter.color(0.0);
        assert!((gray.r - gray.g).abs() < 1e-6 && (gray.g - gray.b).abs() < 1e-6);
        assert_eq!(gray.a, 1.0);

        let faded = emitter.color(emitter.lifetime);
        assert_eq!(faded.a, 0.0);

        if let Some(params) = emitter.particles_mut() {
            params.saturation = 500;
        }
        let full = emitter.color(0.0);
        assert!((full.r - BASE_COLOR.r).abs() < 1e-5);
    }
}
