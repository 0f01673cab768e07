//! Tests for TriangleDebugDraw.

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;

    use crate::render::debug_draw::CIRCLE_SEGMENTS;
    use crate::render::{Camera, Color, DebugDraw, Pose, TriangleDebugDraw};

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]
    }

    #[test]
    fn test_solid_polygon_fan_and_outline() {
        let mut draw = TriangleDebugDraw::new(Camera::default());
        draw.draw_solid_polygon(&square(), Color::CYAN);

        // 2 треугольника заливки + 4 ребра × 2 треугольника
        assert_eq!(draw.triangles().vertex_count(), (2 + 8) * 3);

        let batch = draw.flush().remove(0);
        // Заливка: половина яркости, alpha 0.5
        assert_eq!(batch.colors[0], Color::CYAN.fill().to_rgba8());
        assert_eq!(batch.colors[0], [0, 128, 128, 128]);
        // Контур: исходный цвет
        assert_eq!(*batch.colors.last().unwrap(), [0, 255, 255, 255]);
    }

    #[test]
    fn test_solid_circle_triangle_count() {
        let mut draw = TriangleDebugDraw::new(Camera::default());
        draw.draw_solid_circle(Vec2::new(0.0, 5.0), 0.5, Vec2::X, Color::WHITE);

        // fan + контур (2 на сегмент) + ось поворота
        let expected = CIRCLE_SEGMENTS + CIRCLE_SEGMENTS * 2 + 2;
        assert_eq!(draw.triangles().vertex_count(), expected * 3);
    }

    #[test]
    fn test_fill_vertices_inside_circle() {
        let mut draw = TriangleDebugDraw::new(Camera::default());
        let center = Vec2::new(2.0, 3.0);
        draw.draw_solid_circle(center, 1.5, Vec2::Y, Color::WHITE);

        let batch = draw.flush().remove(0);
        let fill = &batch.vertices[..CIRCLE_SEGMENTS * 3];
        assert!(fill.iter().all(|v| v.distance(center) <= 1.5 + 1e-4));
    }

    #[test]
    fn test_degenerate_primitives_ignored() {
        let mut draw = TriangleDebugDraw::new(Camera::default());
        draw.draw_segment(Vec2::ONE, Vec2::ONE, Color::WHITE);
        draw.draw_solid_polygon(&[Vec2::ZERO], Color::WHITE);
        draw.draw_polygon(&[], Color::WHITE);

        assert_eq!(draw.triangles().vertex_count(), 0);
    }

    #[test]
    fn test_segment_width_is_one_pixel() {
        let camera = Camera::default();
        let mut draw = TriangleDebugDraw::new(camera);
        draw.draw_segment(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE);

        let batch = draw.flush().remove(0);
        let min_y = batch.vertices.iter().map(|v| v.y).fold(f32::MAX, f32::min);
        let max_y = batch.vertices.iter().map(|v| v.y).fold(f32::MIN, f32::max);
        assert!(((max_y - min_y) - camera.world_per_pixel()).abs() < 1e-5);
    }

    #[test]
    fn test_transform_draws_two_axes() {
        let mut draw = TriangleDebugDraw::new(Camera::default());
        draw.draw_transform(Pose::new(Vec2::ZERO, 0.0));

        let batch = draw.flush().remove(0);
        assert_eq!(batch.triangle_count(), 4);
        assert_eq!(batch.colors[0], [255, 0, 0, 255]);
        assert_eq!(batch.colors[6], [0, 255, 0, 255]);
    }

    #[test]
    fn test_point_square_scales_with_zoom() {
        let mut camera = Camera::default();
        let mut draw = TriangleDebugDraw::new(camera);
        draw.draw_point(Vec2::ZERO, 10.0, Color::WHITE);
        let near = draw.flush().remove(0);

        camera.zoom = 2.0;
        draw.set_camera(camera);
        draw.draw_point(Vec2::ZERO, 10.0, Color::WHITE);
        let far = draw.flush().remove(0);

        let width = |batch: &crate::render::TriangleBatch| {
            batch.vertices.iter().map(|v| v.x).fold(f32::MIN, f32::max) * 2.0
        };
        assert!((width(&far) - 2.0 * width(&near)).abs() < 1e-5);
    }
}
