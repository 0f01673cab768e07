//! Falling Figures Simulation Core
//!
//! 2D физическое демо на Bevy 0.16 + rapier2d:
//! - emitter'ы (физические сцены, фонтан частиц) шагаются в FixedUpdate
//! - debug draw мира превращается в батчи треугольников (`FrameTriangles`)
//! - клиент только рендерит батчи и пробрасывает ввод в `EmitterList`

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

// Публичные модули
pub mod config;
pub mod emitter;
pub mod figures;
pub mod logger;
pub mod physics;
pub mod random;
pub mod render;

// Re-export для удобства
pub use config::{ConfigError, DemoConfig};
pub use emitter::{
    Emitter, EmitterId, EmitterKind, EmitterList, EmitterStats, ParticleConfig, ParticleEmitter,
    ParticleParams, StepContext,
};
pub use figures::{FigureKind, Figures, FiguresConfig, FloatRange};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::{PhysicsEmitter, PhysicsScene, Settings};
pub use random::DeterministicRng;
pub use render::{Camera, Color, DebugDraw, RenderTriangles, TriangleBatch, TriangleDebugDraw};

/// Частота fixed-тика, если в settings шаг выключен (hz <= 0)
const FALLBACK_TICK_HZ: f64 = 60.0;

/// Камера сцены (общая для debug draw и спавна фигур)
#[derive(Resource, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct SceneCamera(pub Camera);

/// Debug renderer, копящий треугольники за кадр
#[derive(Resource, Debug)]
pub struct SceneDrawer(pub TriangleDebugDraw);

/// Треугольники последнего шага (забирает клиент)
#[derive(Resource, Debug, Default)]
pub struct FrameTriangles {
    pub batches: Vec<TriangleBatch>,
    /// Номер шага, в котором батчи собраны
    pub frame: u64,
}

impl FrameTriangles {
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(TriangleBatch::vertex_count).sum()
    }
}

/// Главный plugin симуляции
pub struct SimulationPlugin {
    pub config: DemoConfig,
}

impl SimulationPlugin {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let camera = Camera::from(self.config.camera);

        app.insert_resource(Time::<Fixed>::from_hz(tick_hz(&self.config.settings)))
            .insert_resource(self.config.settings)
            .insert_resource(build_emitters(&self.config))
            .insert_resource(SceneCamera(camera))
            .insert_resource(SceneDrawer(TriangleDebugDraw::new(camera)))
            .insert_resource(FrameTriangles::default())
            .insert_resource(self.config.clone())
            .add_systems(PreUpdate, sync_fixed_timestep)
            .add_systems(FixedUpdate, step_emitters);
    }
}

/// Частота fixed-тика следует за `Settings.hz`
pub fn sync_fixed_timestep(settings: Res<Settings>, mut fixed: ResMut<Time<Fixed>>) {
    if !settings.is_changed() {
        return;
    }

    let hz = tick_hz(&settings);
    if fixed.timestep() != Duration::from_secs_f64(1.0 / hz) {
        fixed.set_timestep_hz(hz);
        log_info(&format!("Fixed timestep: {} Hz", hz));
    }
}

fn tick_hz(settings: &Settings) -> f64 {
    if settings.hz > 0.0 {
        settings.hz as f64
    } else {
        FALLBACK_TICK_HZ
    }
}

/// Emitter'ы сцены по конфигу: Figures (+ фонтан частиц, если включён).
///
/// Seed'ы emitter'ов выводятся из `config.seed`, так что одинаковый конфиг
/// даёт одинаковую сцену.
pub fn build_emitters(config: &DemoConfig) -> EmitterList {
    let mut seeds = DeterministicRng::new(config.seed);
    let mut list = EmitterList::new();

    if config.particles.enabled {
        list.add(Box::new(ParticleEmitter::new(
            "Particles",
            &config.particles,
            seeds.next_seed(),
        )));
    }

    // Figures добавляется последним — активный для ввода
    list.add(Box::new(Figures::new(
        "Figures",
        config.figures.clone(),
        seeds.next_seed(),
    )));

    list
}

/// Один fixed-тик: шаг всех emitter'ов + сбор треугольников
pub fn step_emitters(
    mut emitters: ResMut<EmitterList>,
    mut settings: ResMut<Settings>,
    camera: Res<SceneCamera>,
    mut drawer: ResMut<SceneDrawer>,
    mut frame: ResMut<FrameTriangles>,
) {
    let drawer = &mut drawer.0;
    drawer.set_camera(camera.0);

    let mut ctx = StepContext {
        settings: &mut *settings,
        camera: &camera.0,
        draw: &mut *drawer,
    };
    emitters.step_all(&mut ctx);

    frame.batches = drawer.flush();
    frame.frame += 1;
}

/// Создаёт minimal Bevy App для headless симуляции.
///
/// Время двигается вручную на 1/hz за каждый `app.update()`.
pub fn create_headless_app(config: DemoConfig) -> App {
    let mut app = App::new();
    init_logger();

    let tick = Duration::from_secs_f64(1.0 / tick_hz(&config.settings));
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .add_plugins(SimulationPlugin::new(config));

    app
}

/// Snapshot всех emitter'ов для сравнения детерминизма
pub fn emitter_snapshot(emitters: &EmitterList) -> Vec<u8> {
    let mut snapshot = Vec::new();

    for emitter in emitters.iter() {
        snapshot.extend_from_slice(&emitter.id().to_le_bytes());
        for body in emitter.bodies() {
            snapshot.extend_from_slice(&body.position.x.to_bits().to_le_bytes());
            snapshot.extend_from_slice(&body.position.y.to_bits().to_le_bytes());
            snapshot.extend_from_slice(&body.angle.to_bits().to_le_bytes());
            snapshot.push(body.awake as u8);
        }
    }

    snapshot
}

/// Snapshot прямо из App (для тестов и headless бинаря)
pub fn world_snapshot(world: &World) -> Vec<u8> {
    world
        .get_resource::<EmitterList>()
        .map(emitter_snapshot)
        .unwrap_or_default()
}
