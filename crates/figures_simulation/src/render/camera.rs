//! Scene camera: screen ↔ world конверсия
//!
//! Экранные координаты: origin в левом верхнем углу, Y вниз (как у окна).
//! Видимая область: центр ± (aspect × 25, 25) × zoom.

use bevy::math::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

/// Половина видимой высоты при zoom = 1 (метры)
pub const VIEW_EXTENT: f32 = 25.0;

pub const MIN_ZOOM: f32 = 0.02;
pub const MAX_ZOOM: f32 = 20.0;

const DEFAULT_CENTER: Vec2 = Vec2::new(0.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
    /// Размер viewport в логических пикселях
    pub width: u32,
    pub height: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: 1.0,
            width: 1280,
            height: 800,
        }
    }
}

impl Camera {
    pub fn reset_view(&mut self) {
        self.center = DEFAULT_CENTER;
        self.zoom = 1.0;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        // Свёрнутое окно приходит с нулевым размером
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Половина видимой области в мировых единицах
    pub fn extents(&self) -> Vec2 {
        Vec2::new(self.aspect_ratio() * VIEW_EXTENT, VIEW_EXTENT) * self.zoom
    }

    /// (lower, upper) углы видимой области
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let extents = self.extents();
        (self.center - extents, self.center + extents)
    }

    /// Сколько метров в одном пикселе экрана
    pub fn world_per_pixel(&self) -> f32 {
        2.0 * VIEW_EXTENT * self.zoom / self.height.max(1) as f32
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        let u = screen.x / w;
        let v = (h - screen.y) / h;

        let (lower, upper) = self.bounds();
        Vec2::new(
            (1.0 - u) * lower.x + u * upper.x,
            (1.0 - v) * lower.y + v * upper.y,
        )
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;

        let (lower, upper) = self.bounds();
        let u = (world.x - lower.x) / (upper.x - lower.x);
        let v = (world.y - lower.y) / (upper.y - lower.y);

        Vec2::new(u * w, (1.0 - v) * h)
    }

    /// Ортографическая проекция world → clip space
    pub fn projection_matrix(&self, z_bias: f32) -> Mat4 {
        let (lower, upper) = self.bounds();
        let width = upper.x - lower.x;
        let height = upper.y - lower.y;

        Mat4::from_cols_array(&[
            2.0 / width,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / height,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
            -(upper.x + lower.x) / width,
            -(upper.y + lower.y) / height,
            z_bias,
            1.0,
        ])
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom / 1.1).max(MIN_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom * 1.1).min(MAX_ZOOM);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta;
    }
}

/// Конфиг камеры (JSON)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub center: [f32; 2],
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            center: DEFAULT_CENTER.to_array(),
            zoom: 1.0,
        }
    }
}

impl From<CameraConfig> for Camera {
    fn from(config: CameraConfig) -> Self {
        let mut camera = Camera {
            center: Vec2::from_array(config.center),
            zoom: config.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Camera::default()
        };
        camera.resize(config.width, config.height);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_default_view_bounds() {
        let camera = Camera::default();
        let (lower, upper) = camera.bounds();

        // 1280/800 = 1.6 → 40m по X
        assert!(approx(lower, Vec2::new(-40.0, -5.0)));
        assert!(approx(upper, Vec2::new(40.0, 45.0)));
    }

    #[test]
    fn test_screen_corners() {
        let camera = Camera::default();

        assert!(approx(camera.screen_to_world(Vec2::ZERO), Vec2::new(-40.0, 45.0)));
        assert!(approx(
            camera.screen_to_world(Vec2::new(1280.0, 800.0)),
            Vec2::new(40.0, -5.0)
        ));
        assert!(approx(
            camera.screen_to_world(Vec2::new(640.0, 400.0)),
            camera.center
        ));
    }

    #[test]
    fn test_round_trip_with_zoom_and_pan() {
        let mut camera = Camera::default();
        camera.zoom_out();
        camera.pan(Vec2::new(3.0, -2.0));
        camera.resize(1024, 768);

        let screen = Vec2::new(100.0, 650.0);
        let world = camera.screen_to_world(screen);
        assert!(approx(camera.world_to_screen(world), screen));
    }

    #[test]
    fn test_projection_maps_bounds_to_clip() {
        let camera = Camera::default();
        let (lower, upper) = camera.bounds();
        let m = camera.projection_matrix(0.0);

        let lo = m.project_point3(lower.extend(0.0));
        let hi = m.project_point3(upper.extend(0.0));
        assert!((lo.x + 1.0).abs() < 1e-5 && (lo.y + 1.0).abs() < 1e-5);
        assert!((hi.x - 1.0).abs() < 1e-5 && (hi.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::default();
        for _ in 0..200 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom, MAX_ZOOM);

        for _ in 0..200 {
            camera.zoom_in();
        }
        assert_eq!(camera.zoom, MIN_ZOOM);

        camera.reset_view();
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_zero_size_viewport() {
        let mut camera = Camera::default();
        camera.resize(0, 0);
        assert_eq!((camera.width, camera.height), (1, 1));
        assert!(camera.world_per_pixel().is_finite());
    }
}
