//! Определения тел и фикстур (body def / fixture def / shape)
//!
//! Описывают тело до создания в мире; `PhysicsWorld` переводит их в
//! rapier builders.

use bevy::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    #[default]
    Static,
    Kinematic,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    /// Радианы
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// CCD сразу при создании; дальше CCD определяет `enable_continuous`
    pub bullet: bool,
    pub allow_sleep: bool,
    pub awake: bool,
    pub gravity_scale: f32,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            bullet: false,
            allow_sleep: true,
            awake: true,
            gravity_scale: 1.0,
        }
    }
}

impl BodyDef {
    pub fn dynamic(position: Vec2) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position,
            ..Default::default()
        }
    }
}

/// Геометрия фикстуры в локальных координатах тела
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32, center: Vec2 },
    /// Выпуклый полигон (строится convex hull)
    Polygon { vertices: Vec<Vec2> },
    Box { half_extents: Vec2, center: Vec2, angle: f32 },
    Edge { v1: Vec2, v2: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle {
            radius,
            center: Vec2::ZERO,
        }
    }

    pub fn edge(v1: Vec2, v2: Vec2) -> Self {
        Shape::Edge { v1, v2 }
    }

    /// Полигон без площади (коллинеарные точки, < 3 вершин)
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Circle { radius, .. } => *radius <= 0.0,
            Shape::Polygon { vertices } => polygon_area(vertices).abs() <= f32::EPSILON,
            Shape::Box { half_extents, .. } => half_extents.x <= 0.0 || half_extents.y <= 0.0,
            Shape::Edge { v1, v2 } => v1 == v2,
        }
    }
}

/// Знаковая площадь (CCW > 0)
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f32 = (0..vertices.len())
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % vertices.len()]))
        .sum();
    0.5 * twice
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDef {
    pub shape: Shape,
    /// kg/m²
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,
}

impl FixtureDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}
