//! Figures — сцена, которая каждый шаг роняет случайную фигуру
//!
//! Фигуры появляются у верхнего края камеры, пока счётчик меньше
//! `max_figures`. Тип выбирается равновероятно среди включённых
//! (треугольник / квадрат / круг), размер — из `FloatRange`.

use std::f32::consts::PI;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::emitter::StepContext;
use crate::logger::{log, log_warning};
use crate::physics::{BodyDef, FixtureDef, PhysicsEmitter, PhysicsScene, Shape};
use crate::random::random_in;
use crate::render::{Camera, Color, Pose};

/// Поворот треугольника (доля π)
const TRIANGLE_TURN: f32 = 0.3524;

/// Отрезок [lower, upper] для размеров фигур
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRange")]
pub struct FloatRange {
    lower: f32,
    upper: f32,
}

/// Границы как записаны в конфиге (порядок любой)
#[derive(Deserialize)]
struct RawRange {
    lower: f32,
    upper: f32,
}

impl From<RawRange> for FloatRange {
    fn from(raw: RawRange) -> Self {
        Self::new(raw.lower, raw.upper)
    }
}

impl FloatRange {
    /// Границы в любом порядке
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn lower(&self) -> f32 {
        self.lower
    }

    pub fn upper(&self) -> f32 {
        self.upper
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        random_in(rng, self.lower, self.upper)
    }
}

impl Default for FloatRange {
    fn default() -> Self {
        Self::new(0.25, 0.8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureKind {
    Triangle,
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiguresConfig {
    pub max_figures: u32,
    pub size: FloatRange,
    pub equal_size: bool,
    pub equal_colors: bool,
    pub circles: bool,
    pub triangles: bool,
    pub rectangles: bool,
    /// Цвет при `equal_colors`
    pub color: Color,
    /// Смещение точки появления от левого верхнего края выборки
    pub spawn_offset: [f32; 2],
    pub density: f32,
    pub restitution: f32,
    pub angular_damping: f32,
}

impl Default for FiguresConfig {
    fn default() -> Self {
        Self {
            max_figures: 300,
            size: FloatRange::default(),
            equal_size: false,
            equal_colors: true,
            circles: false,
            triangles: false,
            rectangles: true,
            color: Color::CYAN,
            spawn_offset: [5.0, 0.0],
            density: 1.0,
            restitution: 0.4,
            angular_damping: 0.01,
        }
    }
}

pub struct Figures {
    base: PhysicsEmitter,
    config: FiguresConfig,
    count: u32,
    warned_no_kinds: bool,
}

impl Figures {
    pub fn new(name: &str, config: FiguresConfig, seed: u64) -> Self {
        let mut base = PhysicsEmitter::new(name, seed);

        let ground = base.ground();
        let edge = FixtureDef::new(Shape::edge(Vec2::new(50.0, 0.0), Vec2::new(-50.0, 0.0)));
        base.world_mut().create_fixture(ground, &edge);

        let mut figures = Self {
            base,
            config,
            count: 0,
            warned_no_kinds: false,
        };
        figures.apply_colors();
        figures
    }

    pub fn config(&self) -> &FiguresConfig {
        &self.config
    }

    /// Сколько фигур создано (удалённые бомбой не вычитаются)
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn set_circles(&mut self, enabled: bool) {
        self.config.circles = enabled;
        self.warned_no_kinds = false;
    }

    pub fn set_triangles(&mut self, enabled: bool) {
        self.config.triangles = enabled;
        self.warned_no_kinds = false;
    }

    pub fn set_rectangles(&mut self, enabled: bool) {
        self.config.rectangles = enabled;
        self.warned_no_kinds = false;
    }

    pub fn set_equal_size(&mut self, enabled: bool) {
        self.config.equal_size = enabled;
    }

    pub fn set_equal_colors(&mut self, enabled: bool) {
        self.config.equal_colors = enabled;
        self.apply_colors();
    }

    fn apply_colors(&mut self) {
        let color = self.config.equal_colors.then_some(self.config.color);
        self.base.set_shape_color(color);
    }

    /// Включённые типы в порядке выбора
    pub fn enabled_kinds(&self) -> Vec<FigureKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.config.triangles {
            kinds.push(FigureKind::Triangle);
        }
        if self.config.rectangles {
            kinds.push(FigureKind::Rectangle);
        }
        if self.config.circles {
            kinds.push(FigureKind::Circle);
        }
        kinds
    }

    fn shape_size(&mut self) -> f32 {
        if self.config.equal_size {
            self.config.size.lower()
        } else {
            self.config.size.sample(self.base.rng_mut())
        }
    }

    pub fn create_triangle(&mut self) -> Shape {
        let size = self.shape_size();
        let turn = Vec2::from_angle(TRIANGLE_TURN * PI);
        let xf = Pose::new(turn, TRIANGLE_TURN * PI);
        Shape::Polygon {
            vertices: vec![
                xf.apply(Vec2::new(-size, 0.0)),
                xf.apply(Vec2::new(size, 0.0)),
                xf.apply(Vec2::new(0.0, size)),
            ],
        }
    }

    pub fn create_circle(&mut self) -> Shape {
        let radius = self.shape_size();
        Shape::Circle {
            radius,
            center: Vec2::new(-radius, radius),
        }
    }

    pub fn create_rectangle(&mut self) -> Shape {
        let size = self.shape_size();
        Shape::Box {
            half_extents: Vec2::splat(size),
            center: Vec2::new(-size, 0.0),
            angle: 0.0,
        }
    }

    fn create_shape(&mut self, kind: FigureKind) -> Shape {
        match kind {
            FigureKind::Triangle => self.create_triangle(),
            FigureKind::Rectangle => self.create_rectangle(),
            FigureKind::Circle => self.create_circle(),
        }
    }

    fn pick_kind(&mut self) -> Option<FigureKind> {
        let kinds = self.enabled_kinds();
        if kinds.is_empty() {
            return None;
        }
        let index = self.base.rng_mut().gen_range(0..kinds.len());
        Some(kinds[index])
    }

    /// Одна фигура у верхнего края камеры. `false` если все типы выключены.
    pub fn spawn_figure(&mut self, camera: &Camera) -> bool {
        let Some(kind) = self.pick_kind() else {
            if !self.warned_no_kinds {
                log_warning(&format!("{}: no figure kinds enabled, spawning paused", self.base_name()));
                self.warned_no_kinds = true;
            }
            return false;
        };

        let shape = self.create_shape(kind);
        let fixture = FixtureDef::new(shape)
            .with_density(self.config.density)
            .with_restitution(self.config.restitution);

        let top_left = camera.screen_to_world(Vec2::ZERO);
        let top_right = camera.screen_to_world(Vec2::new(camera.width as f32, 0.0));

        let rng = self.base.rng_mut();
        let x = random_in(rng, top_left.x, top_right.x);
        let angle = random_in(rng, -PI, PI);

        let offset = Vec2::from(self.config.spawn_offset);
        let def = BodyDef {
            angle,
            linear_damping: 0.0,
            angular_damping: self.config.angular_damping,
            ..BodyDef::dynamic(Vec2::new(x, top_left.y) + offset)
        };
        self.base.create_body(&def, &fixture);
        self.count += 1;
        true
    }

    fn base_name(&self) -> String {
        crate::emitter::Emitter::name(self).to_string()
    }

    fn toggle(&mut self, key: char) {
        match key {
            'c' => self.set_circles(!self.config.circles),
            't' => self.set_triangles(!self.config.triangles),
            'r' => self.set_rectangles(!self.config.rectangles),
            'e' => self.set_equal_size(!self.config.equal_size),
            'g' => self.set_equal_colors(!self.config.equal_colors),
            _ => return,
        }
        log(&format!(
            "Figures: circles={} triangles={} rectangles={} equal_size={} equal_colors={}",
            self.config.circles,
            self.config.triangles,
            self.config.rectangles,
            self.config.equal_size,
            self.config.equal_colors
        ));
    }
}

impl PhysicsScene for Figures {
    fn base(&self) -> &PhysicsEmitter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PhysicsEmitter {
        &mut self.base
    }

    fn keyboard(&mut self, key: char) {
        self.toggle(key.to_ascii_lowercase());
    }

    fn after_step(&mut self, ctx: &mut StepContext<'_>) {
        if self.count < self.config.max_figures {
            self.spawn_figure(ctx.camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use crate::physics::{defs::polygon_area, Settings};
    use crate::render::NullDraw;

    fn run(figures: &mut Figures, settings: &mut Settings, steps: usize) {
        let camera = Camera::default();
        let mut draw = NullDraw;
        for _ in 0..steps {
            let mut ctx = StepContext {
                settings: &mut *settings,
                camera: &camera,
                draw: &mut draw,
            };
            Emitter::step(figures, &mut ctx);
        }
    }

    #[test]
    fn test_defaults() {
        let figures = Figures::new("figures", FiguresConfig::default(), 1);
        let config = figures.config();
        assert_eq!(config.max_figures, 300);
        assert_eq!(config.size, FloatRange::new(0.25, 0.8));
        assert!(!config.equal_size && config.equal_colors);
        assert_eq!(figures.enabled_kinds(), vec![FigureKind::Rectangle]);
        assert_eq!(figures.base.shape_color(), Some(Color::CYAN));
    }

    #[test]
    fn test_float_range_orders_bounds() {
        let range = FloatRange::new(0.8, 0.25);
        assert_eq!(range.lower(), 0.25);
        assert_eq!(range.upper(), 0.8);
        assert!(range.contains(0.5));
        assert!(!range.contains(0.9));
    }

    #[test]
    fn test_shape_geometry() {
        let mut figures = Figures::new(
            "figures",
            FiguresConfig {
                equal_size: true,
                ..Default::default()
            },
            1,
        );

        match figures.create_circle() {
            Shape::Circle { radius, center } => {
                assert_eq!(radius, 0.25);
                assert_eq!(center, Vec2::new(-0.25, 0.25));
            }
            other => panic!("unexpected {:?}", other),
        }

        match figures.create_rectangle() {
            Shape::Box {
                half_extents,
                center,
                ..
            } => {
                assert_eq!(half_extents, Vec2::splat(0.25));
                assert_eq!(center, Vec2::new(-0.25, 0.0));
            }
            other => panic!("unexpected {:?}", other),
        }

        match figures.create_triangle() {
            Shape::Polygon { vertices } => {
                assert_eq!(vertices.len(), 3);
                // Площадь (2s × s) / 2 не меняется от поворота
                assert!((polygon_area(&vertices) - 0.0625).abs() < 1e-5);
                let offset = Vec2::from_angle(TRIANGLE_TURN * PI);
                let centroid = (vertices[0] + vertices[1]) * 0.5;
                assert!((centroid - offset).length() < 1e-5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_random_sizes_stay_in_range() {
        let mut figures = Figures::new("figures", FiguresConfig::default(), 9);
        for _ in 0..200 {
            if let Shape::Circle { radius, .. } = figures.create_circle() {
                assert!(figures.config().size.contains(radius));
            }
        }
    }

    #[test]
    fn test_spawn_respects_max_figures() {
        let config = FiguresConfig {
            max_figures: 5,
            ..Default::default()
        };
        let mut figures = Figures::new("figures", config, 3);
        let mut settings = Settings::default();
        run(&mut figures, &mut settings, 20);

        assert_eq!(figures.count(), 5);
        // ground + 5 фигур
        assert_eq!(figures.bodies().len(), 6);
    }

    #[test]
    fn test_spawn_position_at_camera_top() {
        let mut figures = Figures::new("figures", FiguresConfig::default(), 3);
        let camera = Camera::default();
        assert!(figures.spawn_figure(&camera));

        let (lower, upper) = camera.bounds();
        let spawned = figures
            .bodies()
            .into_iter()
            .find(|b| b.dynamic)
            .expect("figure");
        assert_eq!(spawned.position.y, upper.y);
        assert!(spawned.position.x >= lower.x + 5.0 && spawned.position.x <= upper.x + 5.0);
        assert!((-PI..=PI).contains(&spawned.angle));
    }

    #[test]
    fn test_no_kinds_no_spawn() {
        let config = FiguresConfig {
            rectangles: false,
            ..Default::default()
        };
        let mut figures = Figures::new("figures", config, 3);
        let mut settings = Settings::default();
        run(&mut figures, &mut settings, 5);
        assert_eq!(figures.count(), 0);
        assert!(figures.warned_no_kinds);

        Emitter::keyboard(&mut figures, 'c');
        assert!(!figures.warned_no_kinds);
        run(&mut figures, &mut settings, 1);
        assert_eq!(figures.count(), 1);
    }

    #[test]
    fn test_keyboard_toggles() {
        let mut figures = Figures::new("figures", FiguresConfig::default(), 3);
        Emitter::keyboard(&mut figures, 't');
        Emitter::keyboard(&mut figures, 'C');
        assert_eq!(
            figures.enabled_kinds(),
            vec![FigureKind::Triangle, FigureKind::Rectangle, FigureKind::Circle]
        );

        Emitter::keyboard(&mut figures, 'r');
        assert_eq!(figures.enabled_kinds(), vec![FigureKind::Triangle, FigureKind::Circle]);

        Emitter::keyboard(&mut figures, 'e');
        assert!(figures.config().equal_size);

        Emitter::keyboard(&mut figures, 'g');
        assert_eq!(figures.base.shape_color(), None);

        // Неизвестная клавиша ничего не меняет
        let before = figures.config().clone();
        Emitter::keyboard(&mut figures, 'q');
        assert_eq!(figures.config(), &before);
    }

    #[test]
    fn test_all_kinds_get_picked() {
        let config = FiguresConfig {
            circles: true,
            triangles: true,
            rectangles: true,
            ..Default::default()
        };
        let mut figures = Figures::new("figures", config, 11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            if let Some(kind) = figures.pick_kind() {
                seen.insert(kind);
            }
        }
        assert_eq!(seen.len(), 3);
    }
}
