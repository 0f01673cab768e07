//! Emitter — то, что можно шагать и рисовать
//!
//! Варианты:
//! - `Physics`: сцены поверх `PhysicsEmitter` (rapier2d мир)
//! - `Particles`: фонтан частиц (`ParticleEmitter`)
//!
//! Ввод (мышь/клавиатура) получает только активный emitter из `EmitterList`.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::{BodyState, Settings};
use crate::render::{Camera, DebugDraw};

pub mod list;
pub mod particles;

pub use list::EmitterList;
pub use particles::{ParticleConfig, ParticleEmitter};

pub type EmitterId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmitterKind {
    Physics,
    Particles,
}

impl EmitterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitterKind::Physics => "physics",
            EmitterKind::Particles => "particles",
        }
    }
}

/// Параметры частиц (проценты / условные единицы UI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    pub speed: u32,
    pub size: u32,
    /// 0..=100
    pub saturation: u32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            speed: 12,
            size: 15,
            saturation: 80,
        }
    }
}

/// Сводка для заголовка окна / профайлинга
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmitterStats {
    pub bodies: usize,
    pub contacts: usize,
    pub joints: usize,
    pub steps: u32,
    /// Среднее время шага (мс)
    pub average_step_ms: f32,
}

/// Всё, что нужно emitter'у на один кадр
pub struct StepContext<'a> {
    pub settings: &'a mut Settings,
    pub camera: &'a Camera,
    pub draw: &'a mut dyn DebugDraw,
}

pub trait Emitter: Send + Sync {
    fn id(&self) -> EmitterId;
    fn set_id(&mut self, id: EmitterId);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn kind(&self) -> EmitterKind;

    /// Один кадр: шаг симуляции + debug draw
    fn step(&mut self, ctx: &mut StepContext<'_>);

    fn keyboard(&mut self, _key: char) {}
    fn keyboard_up(&mut self, _key: char) {}
    fn mouse_down(&mut self, _p: Vec2) {}
    fn shift_mouse_down(&mut self, _p: Vec2) {}
    fn mouse_up(&mut self, _p: Vec2) {}
    fn mouse_move(&mut self, _p: Vec2) {}
    fn launch_bomb(&mut self) {}
    fn shift_origin(&mut self, _origin: Vec2) {}

    /// Текущие состояния тел (для snapshot'ов)
    fn bodies(&self) -> Vec<BodyState>;

    fn stats(&self) -> EmitterStats {
        EmitterStats {
            bodies: self.bodies().len(),
            ..Default::default()
        }
    }

    fn particles(&self) -> Option<&ParticleParams> {
        None
    }

    fn particles_mut(&mut self) -> Option<&mut ParticleParams> {
        None
    }
}
