//! Debug draw мост: примитивы физического мира → треугольники для GPU
//!
//! - `DebugDraw` — callback интерфейс (polygon/circle/segment/point/transform)
//! - `TriangleDebugDraw` — реализация, копит треугольники в `RenderTriangles`
//! - `Camera` — screen ↔ world конверсия и ортографическая проекция

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

pub mod camera;
pub mod debug_draw;
pub mod triangles;

#[cfg(test)]
mod debug_draw_tests;

pub use camera::{Camera, CameraConfig};
pub use debug_draw::TriangleDebugDraw;
pub use triangles::{RenderTriangles, TriangleBatch, MAX_VERTICES};

/// RGBA цвет в диапазоне 0..1 (как у физического debug renderer'а)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Заливка solid-фигур: половинная яркость, полупрозрачная
    pub fn fill(self) -> Self {
        Self::rgba(0.5 * self.r, 0.5 * self.g, 0.5 * self.b, 0.5)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}

/// Позиция + поворот тела (для `draw_transform`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    pub fn x_axis(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    pub fn y_axis(&self) -> Vec2 {
        self.x_axis().perp()
    }

    /// Локальная точка → мировая
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + self.x_axis().rotate(local)
    }
}

/// Callback интерфейс debug renderer'а физического мира
///
/// Все координаты — мировые (метры). `size` у точек — в пикселях экрана.
pub trait DebugDraw {
    /// Замкнутый контур полигона
    fn draw_polygon(&mut self, vertices: &[Vec2], color: Color);

    /// Залитый выпуклый полигон
    fn draw_solid_polygon(&mut self, vertices: &[Vec2], color: Color);

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Залитый круг, `axis` — направление поворота тела
    fn draw_solid_circle(&mut self, center: Vec2, radius: f32, axis: Vec2, color: Color);

    fn draw_segment(&mut self, p1: Vec2, p2: Vec2, color: Color);

    fn draw_transform(&mut self, pose: Pose);

    fn draw_point(&mut self, p: Vec2, size: f32, color: Color);
}

/// DebugDraw, который ничего не рисует (headless прогон без рендера)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDraw;

impl DebugDraw for NullDraw {
    fn draw_polygon(&mut self, _vertices: &[Vec2], _color: Color) {}
    fn draw_solid_polygon(&mut self, _vertices: &[Vec2], _color: Color) {}
    fn draw_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {}
    fn draw_solid_circle(&mut self, _center: Vec2, _radius: f32, _axis: Vec2, _color: Color) {}
    fn draw_segment(&mut self, _p1: Vec2, _p2: Vec2, _color: Color) {}
    fn draw_transform(&mut self, _pose: Pose) {}
    fn draw_point(&mut self, _p: Vec2, _size: f32, _color: Color) {}
}
