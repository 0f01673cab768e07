//! Контакты: точки для debug визуализации + события begin/end/impulse

use bevy::math::Vec2;
use rapier2d::prelude::ColliderHandle;

/// Ёмкость буфера контактных точек
pub const MAX_CONTACT_POINTS: usize = 2048;

/// Состояние точки относительно прошлого шага
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    /// Пара начала касаться на этом шаге
    Add,
    /// Пара касалась и на прошлом шаге
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    /// World-space нормаль (от collider1 к collider2)
    pub normal: Vec2,
    pub position: Vec2,
    pub state: PointState,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    /// Отрицательная — проникновение
    pub separation: f32,
}

/// Буфер фиксированной ёмкости, перезаполняется каждый шаг
#[derive(Debug, Clone)]
pub struct ContactBuffer {
    points: Vec<ContactPoint>,
    capacity: usize,
}

impl Default for ContactBuffer {
    fn default() -> Self {
        Self::with_capacity(MAX_CONTACT_POINTS)
    }
}

impl ContactBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// `false` если буфер полон (точка отброшена)
    pub fn push(&mut self, point: ContactPoint) -> bool {
        if self.points.len() >= self.capacity {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.points
    }

    pub fn shift(&mut self, offset: Vec2) {
        for point in &mut self.points {
            point.position -= offset;
        }
    }
}

/// Begin/End касания пары коллайдеров
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Begin {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
    },
    End {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
    },
}

/// Суммарный импульс солвера по паре (после решения контактов)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactImpulse {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub normal_impulse: f32,
}

/// Что произошло за один шаг мира
#[derive(Debug, Clone, Default)]
pub struct StepEvents {
    pub contacts: Vec<ContactEvent>,
    pub impulses: Vec<ContactImpulse>,
}
