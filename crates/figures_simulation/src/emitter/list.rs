//! EmitterList — упорядоченный набор emitter'ов + активный для ввода

use bevy::math::Vec2;
use bevy::prelude::Resource;

use super::{Emitter, EmitterId, StepContext};
use crate::logger::log;

#[derive(Resource, Default)]
pub struct EmitterList {
    emitters: Vec<Box<dyn Emitter>>,
    next_id: EmitterId,
    active: Option<EmitterId>,
}

impl EmitterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет emitter, назначает id и делает его активным
    pub fn add(&mut self, mut emitter: Box<dyn Emitter>) -> EmitterId {
        let id = self.next_id;
        self.next_id += 1;

        emitter.set_id(id);
        log(&format!(
            "Emitter added: #{} '{}' ({})",
            id,
            emitter.name(),
            emitter.kind().as_str()
        ));

        self.emitters.push(emitter);
        self.active = Some(id);
        id
    }

    /// Удаляет emitter. Если он был активным — активным становится последний.
    pub fn remove(&mut self, id: EmitterId) -> Option<Box<dyn Emitter>> {
        let index = self.emitters.iter().position(|e| e.id() == id)?;
        let removed = self.emitters.remove(index);

        if self.active == Some(id) {
            self.active = self.emitters.last().map(|e| e.id());
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.emitters.clear();
        self.active = None;
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn ids(&self) -> Vec<EmitterId> {
        self.emitters.iter().map(|e| e.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Emitter> {
        self.emitters.iter().map(|e| e.as_ref())
    }

    pub fn get(&self, id: EmitterId) -> Option<&dyn Emitter> {
        self.emitters
            .iter()
            .find(|e| e.id() == id)
            .map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, id: EmitterId) -> Option<&mut Box<dyn Emitter>> {
        self.emitters.iter_mut().find(|e| e.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&dyn Emitter> {
        self.emitters
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.as_ref())
    }

    pub fn active_id(&self) -> Option<EmitterId> {
        self.active
    }

    /// `false` если такого emitter'а нет
    pub fn set_active(&mut self, id: EmitterId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn active(&self) -> Option<&dyn Emitter> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Box<dyn Emitter>> {
        let id = self.active?;
        self.get_mut(id)
    }

    /// Шагает все emitter'ы с одной копией settings.
    ///
    /// `single_step` потребляется один раз за кадр, а не первым emitter'ом.
    pub fn step_all(&mut self, ctx: &mut StepContext<'_>) {
        let snapshot = *ctx.settings;

        for emitter in &mut self.emitters {
            let mut settings = snapshot;
            let mut emitter_ctx = StepContext {
                settings: &mut settings,
                camera: ctx.camera,
                draw: &mut *ctx.draw,
            };
            emitter.step(&mut emitter_ctx);
        }

        if ctx.settings.pause {
            ctx.settings.single_step = false;
        }
    }

    // ========================================================================
    // Ввод → активный emitter
    // ========================================================================

    pub fn keyboard(&mut self, key: char) {
        if let Some(emitter) = self.active_mut() {
            emitter.keyboard(key);
        }
    }

    pub fn keyboard_up(&mut self, key: char) {
        if let Some(emitter) = self.active_mut() {
            emitter.keyboard_up(key);
        }
    }

    pub fn mouse_down(&mut self, p: Vec2) {
        if let Some(emitter) = self.active_mut() {
            emitter.mouse_down(p);
        }
    }

    pub fn shift_mouse_down(&mut self, p: Vec2) {
        if let Some(emitter) = self.active_mut() {
            emitter.shift_mouse_down(p);
        }
    }

    pub fn mouse_up(&mut self, p: Vec2) {
        if let Some(emitter) = self.active_mut() {
            emitter.mouse_up(p);
        }
    }

    pub fn mouse_move(&mut self, p: Vec2) {
        if let Some(emitter) = self.active_mut() {
            emitter.mouse_move(p);
        }
    }

    pub fn launch_bomb(&mut self) {
        if let Some(emitter) = self.active_mut() {
            emitter.launch_bomb();
        }
    }
}
