//! TriangleDebugDraw — DebugDraw, который триангулирует всё в `RenderTriangles`
//!
//! Полигоны → fan, круги → fan из 16 сегментов, линии → quad шириной в пиксель.

use bevy::math::Vec2;

use super::{Camera, Color, DebugDraw, Pose, RenderTriangles, TriangleBatch};

/// Сегментов на окружность
pub const CIRCLE_SEGMENTS: usize = 16;

/// Длина осей в `draw_transform` (метры)
pub const AXIS_SCALE: f32 = 0.4;

/// Толщина линий в пикселях
const LINE_WIDTH_PX: f32 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct TriangleDebugDraw {
    camera: Camera,
    triangles: RenderTriangles,
}

impl TriangleDebugDraw {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            triangles: RenderTriangles::default(),
        }
    }

    /// Камера нужна только для перевода пикселей (толщина линий, точки) в метры
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn triangles(&self) -> &RenderTriangles {
        &self.triangles
    }

    pub fn flush(&mut self) -> Vec<TriangleBatch> {
        self.triangles.flush()
    }

    pub fn clear(&mut self) {
        self.triangles.clear();
    }

    fn pixels(&self, px: f32) -> f32 {
        px * self.camera.world_per_pixel()
    }

    fn fill_fan(&mut self, vertices: &[Vec2], color: Color) {
        if vertices.len() < 3 {
            return;
        }
        for pair in vertices[1..].windows(2) {
            self.triangles.push_triangle(vertices[0], pair[0], pair[1], color);
        }
    }

    fn quad(&mut self, corners: [Vec2; 4], color: Color) {
        self.triangles.push_triangle(corners[0], corners[1], corners[2], color);
        self.triangles.push_triangle(corners[0], corners[2], corners[3], color);
    }

    fn circle_vertices(center: Vec2, radius: f32) -> Vec<Vec2> {
        let increment = std::f32::consts::TAU / CIRCLE_SEGMENTS as f32;
        (0..CIRCLE_SEGMENTS)
            .map(|i| center + Vec2::from_angle(i as f32 * increment) * radius)
            .collect()
    }
}

impl DebugDraw for TriangleDebugDraw {
    fn draw_polygon(&mut self, vertices: &[Vec2], color: Color) {
        let count = vertices.len();
        if count < 2 {
            return;
        }
        for i in 0..count {
            self.draw_segment(vertices[i], vertices[(i + 1) % count], color);
        }
    }

    fn draw_solid_polygon(&mut self, vertices: &[Vec2], color: Color) {
        self.fill_fan(vertices, color.fill());
        self.draw_polygon(vertices, color);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let outline = Self::circle_vertices(center, radius);
        self.draw_polygon(&outline, color);
    }

    fn draw_solid_circle(&mut self, center: Vec2, radius: f32, axis: Vec2, color: Color) {
        let outline = Self::circle_vertices(center, radius);
        let fill = color.fill();
        for i in 0..outline.len() {
            let next = outline[(i + 1) % outline.len()];
            self.triangles.push_triangle(center, outline[i], next, fill);
        }
        self.draw_polygon(&outline, color);

        // Линия поворота
        self.draw_segment(center, center + radius * axis, color);
    }

    fn draw_segment(&mut self, p1: Vec2, p2: Vec2, color: Color) {
        let direction = (p2 - p1).normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }

        let half = 0.5 * self.pixels(LINE_WIDTH_PX);
        let offset = direction.perp() * half;
        self.quad([p1 - offset, p2 - offset, p2 + offset, p1 + offset], color);
    }

    fn draw_transform(&mut self, pose: Pose) {
        let origin = pose.position;
        self.draw_segment(origin, origin + AXIS_SCALE * pose.x_axis(), Color::RED);
        self.draw_segment(origin, origin + AXIS_SCALE * pose.y_axis(), Color::GREEN);
    }

    fn draw_point(&mut self, p: Vec2, size: f32, color: Color) {
        let half = 0.5 * self.pixels(size.max(LINE_WIDTH_PX));
        self.quad(
            [
                p + Vec2::new(-half, -half),
                p + Vec2::new(half, -half),
                p + Vec2::new(half, half),
                p + Vec2::new(-half, half),
            ],
            color,
        );
    }
}
