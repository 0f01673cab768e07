//! PhysicsEmitter — физическая сцена: мир + мышь + бомбы + debug draw
//!
//! Сцена (`PhysicsScene`) встраивает `PhysicsEmitter` и переопределяет хуки
//! (contacts, keyboard, after_step). Любая сцена автоматически `Emitter`.
//!
//! Хуки вызываются после шага мира из собранных событий, в порядке:
//! begin_contact → pre_solve → post_solve → end_contact → joint_destroyed →
//! after_step.

use std::time::Instant;

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};

use super::contact::{ContactBuffer, ContactEvent, ContactImpulse, ContactPoint, PointState, StepEvents};
use super::defs::{BodyDef, FixtureDef, Shape};
use super::profile::{ProfileStats, StepProfile};
use super::world::{BodyState, DrawStyle, PhysicsWorld};
use crate::emitter::{Emitter, EmitterId, EmitterKind, EmitterStats, StepContext};
use crate::logger::{log, log_warning};
use crate::random::random_in;
use crate::render::Color;

/// Скорость бомбы = multiplier × (точка спавна − курсор)
pub const BOMB_SPAWN_MULTIPLIER: f32 = 30.0;

const BOMB_RADIUS: f32 = 0.3;
const BOMB_DENSITY: f32 = 20.0;
const BOMB_LAUNCH_HEIGHT: f32 = 30.0;
const BOMB_LAUNCH_SPREAD: f32 = 15.0;

// Масштабы визуализации контактов
const IMPULSE_SCALE: f32 = 0.1;
const AXIS_SCALE: f32 = 0.3;

const COLOR_MOUSE_POINT: Color = Color::GREEN;
const COLOR_GUIDE: Color = Color::rgb(0.8, 0.8, 0.8);
const COLOR_SPAWN_POINT: Color = Color::rgb(0.0, 0.0, 1.0);
const COLOR_ADD_POINT: Color = Color::rgb(0.3, 0.95, 0.3);
const COLOR_PERSIST_POINT: Color = Color::rgb(0.3, 0.3, 0.95);
const COLOR_NORMAL: Color = Color::rgb(0.9, 0.9, 0.9);
const COLOR_IMPULSE: Color = Color::rgb(0.9, 0.9, 0.3);

/// Что произошло за `PhysicsEmitter::step`
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Реальный шаг (0 на паузе)
    pub time_step: f32,
    pub events: StepEvents,
    /// Джоинты, уничтоженные вместе с телами (кроме mouse joint)
    pub destroyed_joints: Vec<ImpulseJointHandle>,
}

pub struct PhysicsEmitter {
    id: EmitterId,
    name: String,
    world: PhysicsWorld,
    ground: RigidBodyHandle,
    points: ContactBuffer,
    mouse_joint: Option<ImpulseJointHandle>,
    bomb: Option<RigidBodyHandle>,
    bomb_spawn_point: Vec2,
    bomb_spawning: bool,
    mouse_world: Vec2,
    step_count: u32,
    profile: ProfileStats,
    shape_color: Option<Color>,
    rng: ChaCha8Rng,
    destroyed_joints: Vec<ImpulseJointHandle>,
}

impl PhysicsEmitter {
    /// Пустой мир с гравитацией по умолчанию и статическим ground телом
    pub fn new(name: &str, seed: u64) -> Self {
        let mut world = PhysicsWorld::default();
        let ground = world.create_body(&BodyDef::default());

        Self {
            id: 0,
            name: name.to_string(),
            world,
            ground,
            points: ContactBuffer::default(),
            mouse_joint: None,
            bomb: None,
            bomb_spawn_point: Vec2::ZERO,
            bomb_spawning: false,
            mouse_world: Vec2::ZERO,
            step_count: 0,
            profile: ProfileStats::default(),
            shape_color: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            destroyed_joints: Vec::new(),
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Для создания тел сценой. Тела удалять через `destroy_body`.
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn ground(&self) -> RigidBodyHandle {
        self.ground
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn contact_points(&self) -> &[ContactPoint] {
        self.points.points()
    }

    pub fn mouse_joint(&self) -> Option<ImpulseJointHandle> {
        self.mouse_joint
    }

    pub fn bomb(&self) -> Option<RigidBodyHandle> {
        self.bomb
    }

    pub fn is_spawning_bomb(&self) -> bool {
        self.bomb_spawning
    }

    pub fn bomb_spawn_point(&self) -> Vec2 {
        self.bomb_spawn_point
    }

    pub fn mouse_world(&self) -> Vec2 {
        self.mouse_world
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn profile(&self) -> &ProfileStats {
        &self.profile
    }

    pub fn shape_color(&self) -> Option<Color> {
        self.shape_color
    }

    /// Единый цвет динамических тел (`None` — цвета по состоянию тела)
    pub fn set_shape_color(&mut self, color: Option<Color>) {
        self.shape_color = color;
    }

    /// Тело + одна фикстура. Вырожденная геометрия — тело без фикстуры.
    pub fn create_body(&mut self, def: &BodyDef, fixture: &FixtureDef) -> RigidBodyHandle {
        let body = self.world.create_body(def);
        if self.world.create_fixture(body, fixture).is_none() {
            log_warning(&format!(
                "{}: degenerate shape skipped ({:?})",
                self.name, fixture.shape
            ));
        }
        body
    }

    /// Удаляет тело. Mouse joint на нём просто забывается, остальные
    /// уничтоженные джоинты уходят в `joint_destroyed` на следующем шаге.
    pub fn destroy_body(&mut self, body: RigidBodyHandle) {
        for joint in self.world.remove_body(body) {
            if Some(joint) == self.mouse_joint {
                self.mouse_joint = None;
            } else {
                self.destroyed_joints.push(joint);
            }
        }
        if Some(body) == self.bomb {
            self.bomb = None;
        }
    }

    // ========================================================================
    // Step
    // ========================================================================

    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> StepReport {
        let time_step = ctx.settings.take_frame_step();

        // Джоинт мог уйти вместе с телом, удалённым напрямую через world_mut
        if let Some(joint) = self.mouse_joint {
            if !self.world.contains_joint(joint) {
                self.mouse_joint = None;
            }
        }

        let started = Instant::now();
        self.points.clear();
        let events = self.world.step(time_step, ctx.settings);
        self.world.collect_contact_points(&mut self.points);
        let step_time = started.elapsed();

        let started = Instant::now();
        self.world.draw_debug(
            ctx.draw,
            ctx.settings.draw_flags(),
            DrawStyle {
                shape_color: self.shape_color,
                hidden_joint: self.mouse_joint,
            },
        );
        self.draw_overlays(ctx);
        let draw_time = started.elapsed();

        if time_step > 0.0 {
            self.step_count += 1;
        }
        self.profile.record(StepProfile::new(step_time, draw_time));

        StepReport {
            time_step,
            events,
            destroyed_joints: std::mem::take(&mut self.destroyed_joints),
        }
    }

    fn draw_overlays(&self, ctx: &mut StepContext<'_>) {
        if let Some((_, anchor)) = self.mouse_joint.and_then(|j| self.world.joint_anchors(j)) {
            let target = self.mouse_world;
            ctx.draw.draw_point(anchor, 4.0, COLOR_MOUSE_POINT);
            ctx.draw.draw_point(target, 4.0, COLOR_MOUSE_POINT);
            ctx.draw.draw_segment(anchor, target, COLOR_GUIDE);
        }

        if self.is_spawning_bomb() {
            ctx.draw.draw_point(self.bomb_spawn_point, 4.0, COLOR_SPAWN_POINT);
            ctx.draw.draw_segment(self.mouse_world, self.bomb_spawn_point, COLOR_GUIDE);
        }

        if !ctx.settings.draw_contact_points {
            return;
        }
        for point in self.points.points() {
            match point.state {
                PointState::Add => ctx.draw.draw_point(point.position, 10.0, COLOR_ADD_POINT),
                PointState::Persist => ctx.draw.draw_point(point.position, 5.0, COLOR_PERSIST_POINT),
            }

            if ctx.settings.draw_contact_normals {
                let tip = point.position + AXIS_SCALE * point.normal;
                ctx.draw.draw_segment(point.position, tip, COLOR_NORMAL);
            } else if ctx.settings.draw_contact_impulse {
                let tip = point.position + IMPULSE_SCALE * point.normal_impulse * point.normal;
                ctx.draw.draw_segment(point.position, tip, COLOR_IMPULSE);
            }

            if ctx.settings.draw_friction_impulse {
                let tangent = Vec2::new(point.normal.y, -point.normal.x);
                let tip = point.position + IMPULSE_SCALE * point.tangent_impulse * tangent;
                ctx.draw.draw_segment(point.position, tip, COLOR_IMPULSE);
            }
        }
    }

    // ========================================================================
    // Мышь
    // ========================================================================

    pub fn mouse_down(&mut self, p: Vec2) {
        self.mouse_world = p;
        if self.mouse_joint.is_some() {
            return;
        }

        let Some(body) = self.world.query_dynamic_body_at(p) else {
            return;
        };
        self.mouse_joint = self.world.create_mouse_joint(self.ground, body, p);
    }

    pub fn shift_mouse_down(&mut self, p: Vec2) {
        self.mouse_world = p;
        if self.mouse_joint.is_some() {
            return;
        }
        self.spawn_bomb(p);
    }

    pub fn mouse_up(&mut self, p: Vec2) {
        if let Some(joint) = self.mouse_joint.take() {
            self.world.remove_joint(joint);
        }
        if self.bomb_spawning {
            self.complete_bomb_spawn(p);
        }
    }

    pub fn mouse_move(&mut self, p: Vec2) {
        self.mouse_world = p;
        if let Some(joint) = self.mouse_joint {
            self.world.set_mouse_target(joint, p);
        }
    }

    // ========================================================================
    // Бомбы
    // ========================================================================

    pub fn spawn_bomb(&mut self, world_pt: Vec2) {
        self.bomb_spawn_point = world_pt;
        self.bomb_spawning = true;
    }

    pub fn complete_bomb_spawn(&mut self, p: Vec2) {
        if !self.bomb_spawning {
            return;
        }
        let velocity = BOMB_SPAWN_MULTIPLIER * (self.bomb_spawn_point - p);
        self.launch_bomb_at(self.bomb_spawn_point, velocity);
        self.bomb_spawning = false;
    }

    /// Бомба сверху со случайным x, летит к origin
    pub fn launch_bomb(&mut self) {
        let x = random_in(&mut self.rng, -BOMB_LAUNCH_SPREAD, BOMB_LAUNCH_SPREAD);
        let position = Vec2::new(x, BOMB_LAUNCH_HEIGHT);
        self.launch_bomb_at(position, -5.0 * position);
    }

    pub fn launch_bomb_at(&mut self, position: Vec2, velocity: Vec2) {
        if let Some(old) = self.bomb.take() {
            self.destroy_body(old);
        }

        let def = BodyDef {
            linear_velocity: velocity,
            bullet: true,
            ..BodyDef::dynamic(position)
        };
        let fixture = FixtureDef::new(Shape::circle(BOMB_RADIUS)).with_density(BOMB_DENSITY);
        let bomb = self.create_body(&def, &fixture);
        self.bomb = Some(bomb);
        log(&format!(
            "{}: bomb launched at ({:.2}, {:.2}), mass {:.2}",
            self.name,
            position.x,
            position.y,
            self.world.body_mass(bomb).unwrap_or_default()
        ));
    }

    pub fn shift_origin(&mut self, origin: Vec2) {
        self.world.shift_origin(origin);
        self.points.shift(origin);
        self.bomb_spawn_point -= origin;
        self.mouse_world -= origin;
    }

    pub fn stats(&self) -> EmitterStats {
        let world = self.world.stats();
        EmitterStats {
            bodies: world.bodies,
            contacts: world.contacts,
            joints: world.joints,
            steps: self.step_count,
            average_step_ms: self.profile.average(self.step_count).step_ms,
        }
    }
}

/// Сцена поверх `PhysicsEmitter`: хуки по умолчанию ничего не делают
pub trait PhysicsScene: Send + Sync {
    fn base(&self) -> &PhysicsEmitter;
    fn base_mut(&mut self) -> &mut PhysicsEmitter;

    fn begin_contact(&mut self, _collider1: ColliderHandle, _collider2: ColliderHandle) {}
    fn end_contact(&mut self, _collider1: ColliderHandle, _collider2: ColliderHandle) {}
    fn pre_solve(&mut self, _point: &ContactPoint) {}
    fn post_solve(&mut self, _impulse: &ContactImpulse) {}

    /// Джоинт уничтожен неявно (вместе с телом)
    fn joint_destroyed(&mut self, _joint: ImpulseJointHandle) {}

    fn keyboard(&mut self, _key: char) {}
    fn keyboard_up(&mut self, _key: char) {}

    /// После шага мира и debug draw
    fn after_step(&mut self, _ctx: &mut StepContext<'_>) {}
}

impl PhysicsScene for PhysicsEmitter {
    fn base(&self) -> &PhysicsEmitter {
        self
    }

    fn base_mut(&mut self) -> &mut PhysicsEmitter {
        self
    }
}

impl<T: PhysicsScene> Emitter for T {
    fn id(&self) -> EmitterId {
        self.base().id
    }

    fn set_id(&mut self, id: EmitterId) {
        self.base_mut().id = id;
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn set_name(&mut self, name: String) {
        self.base_mut().name = name;
    }

    fn kind(&self) -> EmitterKind {
        EmitterKind::Physics
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) {
        let report = self.base_mut().step(ctx);

        for event in &report.events.contacts {
            if let ContactEvent::Begin {
                collider1,
                collider2,
            } = *event
            {
                self.begin_contact(collider1, collider2);
            }
        }

        for index in 0..self.base().contact_points().len() {
            let point = self.base().contact_points()[index];
            self.pre_solve(&point);
        }

        for impulse in &report.events.impulses {
            self.post_solve(impulse);
        }

        for event in &report.events.contacts {
            if let ContactEvent::End {
                collider1,
                collider2,
            } = *event
            {
                self.end_contact(collider1, collider2);
            }
        }

        for joint in report.destroyed_joints {
            self.joint_destroyed(joint);
        }

        self.after_step(ctx);
    }

    fn keyboard(&mut self, key: char) {
        PhysicsScene::keyboard(self, key);
    }

    fn keyboard_up(&mut self, key: char) {
        PhysicsScene::keyboard_up(self, key);
    }

    fn mouse_down(&mut self, p: Vec2) {
        self.base_mut().mouse_down(p);
    }

    fn shift_mouse_down(&mut self, p: Vec2) {
        self.base_mut().shift_mouse_down(p);
    }

    fn mouse_up(&mut self, p: Vec2) {
        self.base_mut().mouse_up(p);
    }

    fn mouse_move(&mut self, p: Vec2) {
        self.base_mut().mouse_move(p);
    }

    fn launch_bomb(&mut self) {
        self.base_mut().launch_bomb();
    }

    fn shift_origin(&mut self, origin: Vec2) {
        self.base_mut().shift_origin(origin);
    }

    fn bodies(&self) -> Vec<BodyState> {
        self.base().world().body_states()
    }

    fn stats(&self) -> EmitterStats {
        self.base().stats()
    }
}
